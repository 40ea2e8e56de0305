//! Per-call conversion inputs and parameter resolution.

use crate::error::{ConvertError, ConvertResult};
use sr_core::{positional_key, python_string, ConsumptionMode, EntityName, ParamMap, ParamValue};
use sr_sql::ir::{Literal, SqlExpr, TableRef};
use sr_sql::placeholder::contains_sentinel;
use sr_sql::{NormalizedSql, PlaceholderKind};

/// Everything a generator needs besides the parsed query.
#[derive(Debug, Clone, Copy)]
pub struct ConversionContext<'a> {
    pub normalized: &'a NormalizedSql,
    pub params: Option<&'a ParamMap>,
    pub kwargs: Option<&'a ParamMap>,
    pub consumption: &'a ConsumptionMode,
    pub table_prefix: &'a str,
}

impl<'a> ConversionContext<'a> {
    pub fn entity(&self, table: &TableRef) -> EntityName {
        EntityName::from_table(&table.name, self.table_prefix)
    }

    pub fn kwarg(&self, name: &str) -> Option<&'a ParamValue> {
        self.kwargs.and_then(|k| k.get(name))
    }

    /// Python expression bound to a sentinel.
    ///
    /// Literal bindings are quoted, expression references are emitted
    /// verbatim, interpolation blocks resolve to their inner expression.
    pub fn resolve(&self, token: &str) -> ConvertResult<String> {
        let sub = self
            .normalized
            .lookup(token)
            .ok_or_else(|| ConvertError::UnresolvedParameter(token.to_string()))?;
        let binding = match &sub.kind {
            PlaceholderKind::Named(name) => self.params.and_then(|p| p.get(name)),
            PlaceholderKind::Positional(index) => {
                self.params.and_then(|p| p.get(&positional_key(*index)))
            }
            PlaceholderKind::Interpolation(inner) => return Ok(inner.clone()),
        };
        binding
            .map(ParamValue::to_python)
            .ok_or_else(|| ConvertError::UnresolvedParameter(sub.original.clone()))
    }

    /// Python literal for a SQL literal.
    ///
    /// With bound parameters the driver collapses `%%` to `%`, so the
    /// generated string does the same. A string holding a placeholder
    /// cannot be rendered as a constant.
    pub fn literal(&self, literal: &Literal) -> ConvertResult<String> {
        Ok(match literal {
            Literal::Str(s) if contains_sentinel(s) => {
                let shown = self
                    .normalized
                    .substitutions
                    .iter()
                    .find(|sub| s.contains(&sub.token))
                    .map_or(s.as_str(), |sub| sub.original.as_str());
                return Err(ConvertError::unsupported(format!(
                    "Placeholder {shown} inside a quoted string - needs manual conversion"
                )));
            }
            Literal::Str(s) if self.params.is_some() => python_string(&s.replace("%%", "%")),
            Literal::Str(s) => python_string(s),
            Literal::Number(n) => n.clone(),
            Literal::Bool(true) => "True".to_string(),
            Literal::Bool(false) => "False".to_string(),
            Literal::Null => "None".to_string(),
        })
    }

    /// Python value for a constant operand: a literal, a bound placeholder
    /// or a negated number. `None` for anything else.
    pub fn constant(&self, expr: &SqlExpr) -> Option<ConvertResult<String>> {
        match expr.unnested() {
            SqlExpr::Literal(lit) => Some(self.literal(lit)),
            SqlExpr::Placeholder(token) => Some(self.resolve(token)),
            SqlExpr::Negate(inner) => match inner.unnested() {
                SqlExpr::Literal(Literal::Number(n)) => Some(Ok(format!("-{n}"))),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_list_placeholder(&self, expr: &SqlExpr) -> bool {
        matches!(expr.unnested(), SqlExpr::Placeholder(token) if self.normalized.is_list(token))
    }

    /// Keyword arguments forwarded to a terminal `.run(...)`.
    pub fn run_kwargs(&self) -> String {
        ["as_dict", "as_list", "pluck"]
            .iter()
            .filter_map(|name| {
                self.kwarg(name)
                    .map(|value| format!("{name}={}", value.to_python()))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
