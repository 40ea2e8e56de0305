//! SELECT → `frappe.qb.from_(...)` chain.

use super::imports::is_constant;
use super::{all_selects, block, Imports, Scope, Writer};
use crate::context::ConversionContext;
use crate::error::{ConvertError, ConvertResult};
use sr_core::python_string;
use sr_sql::ir::{JoinKind, SetOpKind};
use sr_sql::{SelectQuery, SqlExpr};

/// Full Query Builder program for a SELECT: preamble lines, then the chain
/// ending in `.run(...)` behind the call's result prefix.
pub fn generate_select(select: &SelectQuery, ctx: &ConversionContext<'_>) -> ConvertResult<String> {
    let mut selects = Vec::new();
    all_selects(select, &mut selects);
    let writer = Writer::new(ctx, selects.iter().copied().flat_map(SelectQuery::tables));
    let imports = Imports::for_select(select);

    let mut segments = writer.select_segments(select, None)?;
    segments.push(format!(".run({})", ctx.run_kwargs()));

    let mut lines = writer.preamble(&imports);
    lines.push(block(&ctx.consumption.result_prefix(), &segments));
    Ok(lines.join("\n"))
}

impl Writer<'_> {
    /// Chain segments for one query level: the base `frappe.qb.from_(...)`
    /// followed by one `.method(...)` per clause.
    pub(super) fn select_segments(
        &self,
        select: &SelectQuery,
        parent: Option<&Scope<'_>>,
    ) -> ConvertResult<Vec<String>> {
        if let Some(from) = select.unsupported_from.first() {
            return Err(ConvertError::unsupported(format!(
                "Derived table or CTE in FROM ({from}) - needs manual conversion"
            )));
        }
        let Some((base, rest)) = select.from.split_first() else {
            return Err(ConvertError::unsupported(
                "SELECT without FROM - needs manual conversion",
            ));
        };

        let scope = self.scope(select.tables(), Vec::new(), parent)?;
        let aliases = select
            .projection
            .iter()
            .filter_map(|p| p.alias.clone())
            .collect();
        let clause_scope = Scope {
            aliases,
            ..scope.clone()
        };

        let mut segments = vec![format!("frappe.qb.from_({})", self.decls.binding(base)?)];
        for table in rest {
            segments.push(format!(".from_({})", self.decls.binding(table)?));
        }

        for join in &select.joins {
            let binding = self.decls.binding(&join.table)?;
            let method = match join.kind {
                JoinKind::Inner => "join",
                JoinKind::Left => "left_join",
                JoinKind::Right => "right_join",
                JoinKind::Full => "outer_join",
                JoinKind::Cross => "cross_join",
            };
            let on = match (&join.on, join.kind) {
                (Some(on), kind) if kind != JoinKind::Cross => {
                    format!(".on({})", self.condition(on, &scope)?)
                }
                _ => ".cross()".to_string(),
            };
            segments.push(format!(".{method}({binding}){on}"));
        }

        let items = select
            .projection
            .iter()
            .map(|p| {
                let rendered = if is_constant(&p.expr) {
                    self.wrapped(&p.expr, &scope)?
                } else {
                    self.expr(&p.expr, &scope)?
                };
                Ok(match &p.alias {
                    Some(alias) => format!("{rendered}.as_({})", python_string(alias)),
                    None => rendered,
                })
            })
            .collect::<ConvertResult<Vec<_>>>()?;
        segments.push(format!(".select({})", items.join(", ")));

        if select.distinct {
            segments.push(".distinct()".to_string());
        }
        if let Some(selection) = &select.selection {
            segments.push(format!(".where({})", self.condition(selection, &scope)?));
        }
        if !select.group_by.is_empty() {
            let groups = select
                .group_by
                .iter()
                .map(|g| self.expr(g, &clause_scope))
                .collect::<ConvertResult<Vec<_>>>()?;
            segments.push(format!(".groupby({})", groups.join(", ")));
        }
        if let Some(having) = &select.having {
            segments.push(format!(".having({})", self.condition(having, &clause_scope)?));
        }

        for branch in &select.set_ops {
            let method = match (branch.kind, branch.all) {
                (SetOpKind::Union, false) => "union",
                (SetOpKind::Union, true) => "union_all",
                (SetOpKind::Intersect, _) => "intersect",
                (SetOpKind::Except, _) => "except_of",
            };
            let chain = self.select_segments(&branch.query, None)?.join("");
            segments.push(format!(".{method}({chain})"));
        }

        for item in &select.order_by {
            let rendered = self.expr(&item.expr, &clause_scope)?;
            segments.push(if item.descending {
                format!(".orderby({rendered}, order=frappe.qb.desc)")
            } else {
                format!(".orderby({rendered})")
            });
        }
        if let Some(limit) = &select.limit {
            segments.push(format!(".limit({})", self.bound(limit)?));
        }
        if let Some(offset) = &select.offset {
            segments.push(format!(".offset({})", self.bound(offset)?));
        }
        Ok(segments)
    }

    fn bound(&self, expr: &SqlExpr) -> ConvertResult<String> {
        self.ctx.constant(expr).unwrap_or_else(|| {
            Err(ConvertError::unsupported(
                "LIMIT/OFFSET is not a constant - needs manual conversion",
            ))
        })
    }
}
