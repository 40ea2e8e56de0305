//! Expression rendering: one match arm per IR variant.

use super::imports::{is_constant, wraps_left};
use super::{attribute, builder_function, paren, strip_outer_parens, Scope, Writer, DATEDIFF};
use crate::error::{ConvertError, ConvertResult};
use sr_core::python_string;
use sr_sql::ir::{BinaryOp, Literal, SqlExpr};
use sr_sql::placeholder::contains_sentinel;
use sr_sql::SelectQuery;

const TUPLE_IN: &str = "(col1, col2) IN list_of_tuples - pypika lacks native support for tuple membership, needs manual conversion";
const NON_BOOLEAN: &str = "Non-boolean expression in WHERE clause - needs manual conversion";

impl Writer<'_> {
    /// A predicate for `.where`/`.having`/`.on`, without outer parentheses.
    pub(super) fn condition(&self, expr: &SqlExpr, scope: &Scope<'_>) -> ConvertResult<String> {
        if !is_predicate(expr) {
            return Err(ConvertError::unsupported(NON_BOOLEAN));
        }
        let rendered = self.expr(expr, scope)?;
        Ok(strip_outer_parens(&rendered).to_string())
    }

    pub(super) fn expr(&self, expr: &SqlExpr, scope: &Scope<'_>) -> ConvertResult<String> {
        match expr {
            SqlExpr::Column { qualifier, name } => {
                if contains_sentinel(name) {
                    return Err(ConvertError::unsupported(format!(
                        "Dynamic column name: {name} - needs manual conversion"
                    )));
                }
                match qualifier {
                    Some(q) => Ok(attribute(scope.binding(q)?, name)),
                    None => Ok(match scope.unqualified(name) {
                        Some(binding) => attribute(binding, name),
                        None => format!("Field({})", python_string(name)),
                    }),
                }
            }
            SqlExpr::Wildcard { qualifier: None } => Ok(python_string("*")),
            SqlExpr::Wildcard { qualifier: Some(q) } => Ok(format!("{}.star", scope.binding(q)?)),
            SqlExpr::Placeholder(token) => self.ctx.resolve(token),
            SqlExpr::Literal(lit) => self.ctx.literal(lit),
            SqlExpr::Binary { op, .. } if matches!(op, BinaryOp::And | BinaryOp::Or) => {
                let mut terms = Vec::new();
                connected(expr, *op, &mut terms);
                let rendered = terms
                    .into_iter()
                    .map(|term| Ok(paren(&self.condition(term, scope)?)))
                    .collect::<ConvertResult<Vec<_>>>()?;
                Ok(format!("({})", rendered.join(&format!(" {} ", op.python()))))
            }
            SqlExpr::Binary { left, op, right } => {
                let l = if op.is_comparison() && wraps_left(left, right) {
                    self.wrapped(left, scope)?
                } else {
                    self.expr(left, scope)?
                };
                let r = self.expr(right, scope)?;
                Ok(format!("({l} {} {r})", op.python()))
            }
            SqlExpr::Not(inner) => Ok(format!("~{}", paren(&self.condition(inner, scope)?))),
            SqlExpr::Negate(inner) => match inner.unnested() {
                SqlExpr::Literal(Literal::Number(n)) => Ok(format!("-{n}")),
                other => Ok(format!("-{}", paren(&self.expr(other, scope)?))),
            },
            SqlExpr::IsNull { expr, negated } => {
                let method = if *negated { "isnotnull" } else { "isnull" };
                Ok(format!("{}.{method}()", self.receiver(expr, scope)?))
            }
            SqlExpr::InList {
                expr,
                list,
                negated,
            } => {
                if matches!(expr.unnested(), SqlExpr::Tuple(_)) {
                    return Err(ConvertError::unsupported(TUPLE_IN));
                }
                let method = if *negated { "notin" } else { "isin" };
                let values = match list.as_slice() {
                    [single] if self.ctx.is_list_placeholder(single) => self.expr(single, scope)?,
                    items => {
                        let rendered = items
                            .iter()
                            .map(|item| self.expr(item, scope))
                            .collect::<ConvertResult<Vec<_>>>()?;
                        format!("[{}]", rendered.join(", "))
                    }
                };
                Ok(format!("{}.{method}({values})", self.receiver(expr, scope)?))
            }
            SqlExpr::InSubquery {
                expr,
                subquery,
                negated,
            } => {
                if matches!(expr.unnested(), SqlExpr::Tuple(_)) {
                    return Err(ConvertError::unsupported(TUPLE_IN));
                }
                let method = if *negated { "notin" } else { "isin" };
                Ok(format!(
                    "{}.{method}(SubQuery({}))",
                    self.receiver(expr, scope)?,
                    self.subquery(subquery, scope)?
                ))
            }
            SqlExpr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let range = format!(
                    "{}[{}:{}]",
                    self.receiver(expr, scope)?,
                    self.expr(low, scope)?,
                    self.expr(high, scope)?
                );
                Ok(if *negated { format!("~({range})") } else { range })
            }
            SqlExpr::Like {
                expr,
                pattern,
                negated,
            } => {
                let method = if *negated { "not_like" } else { "like" };
                Ok(format!(
                    "{}.{method}({})",
                    self.receiver(expr, scope)?,
                    self.expr(pattern, scope)?
                ))
            }
            SqlExpr::Exists { subquery, negated } => {
                let exists = format!("ExistsCriterion({})", self.subquery(subquery, scope)?);
                Ok(if *negated {
                    format!("{exists}.negate()")
                } else {
                    exists
                })
            }
            SqlExpr::Subquery(subquery) => {
                Ok(format!("SubQuery({})", self.subquery(subquery, scope)?))
            }
            SqlExpr::Function {
                name,
                args,
                distinct,
            } => self.function(name, args, *distinct, scope),
            SqlExpr::Case {
                operand,
                branches,
                else_result,
            } => {
                let mut out = "Case()".to_string();
                for branch in branches {
                    let condition = match operand {
                        Some(op) => format!(
                            "({} == {})",
                            self.expr(op, scope)?,
                            self.expr(&branch.condition, scope)?
                        ),
                        None => self.expr(&branch.condition, scope)?,
                    };
                    out.push_str(&format!(
                        ".when({}, {})",
                        strip_outer_parens(&condition),
                        self.expr(&branch.result, scope)?
                    ));
                }
                if let Some(e) = else_result {
                    out.push_str(&format!(".else_({})", self.expr(e, scope)?));
                }
                Ok(out)
            }
            SqlExpr::Cast { expr, data_type } => Ok(format!(
                "fn.Cast({}, {})",
                self.expr(expr, scope)?,
                python_string(data_type)
            )),
            SqlExpr::Tuple(_) => Err(ConvertError::unsupported(
                "Row value expression - needs manual conversion",
            )),
            SqlExpr::Nested(inner) => self.expr(inner, scope),
            SqlExpr::Unsupported(sql) => Err(ConvertError::unsupported(format!(
                "Unsupported SQL expression: {sql}"
            ))),
        }
    }

    /// Left side of a method call: constants need a term wrapper.
    fn receiver(&self, expr: &SqlExpr, scope: &Scope<'_>) -> ConvertResult<String> {
        if is_constant(expr) {
            self.wrapped(expr, scope)
        } else {
            self.expr(expr, scope)
        }
    }

    pub(super) fn wrapped(&self, expr: &SqlExpr, scope: &Scope<'_>) -> ConvertResult<String> {
        Ok(format!("ValueWrapper({})", self.expr(expr, scope)?))
    }

    fn function(
        &self,
        name: &str,
        args: &[SqlExpr],
        distinct: bool,
        scope: &Scope<'_>,
    ) -> ConvertResult<String> {
        let rendered = args
            .iter()
            .map(|arg| self.expr(arg, scope))
            .collect::<ConvertResult<Vec<_>>>()?
            .join(", ");
        let call = match builder_function(name) {
            Some(builder) => format!("fn.{builder}({rendered})"),
            None if name == DATEDIFF => {
                format!("CustomFunction(\"DATEDIFF\", [\"end\", \"start\"])({rendered})")
            }
            None => {
                let params = (1..=args.len())
                    .map(|i| format!("\"arg{i}\""))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "CustomFunction({}, [{params}])({rendered})",
                    python_string(name)
                )
            }
        };
        Ok(if distinct {
            format!("{call}.distinct()")
        } else {
            call
        })
    }

    fn subquery(&self, select: &SelectQuery, scope: &Scope<'_>) -> ConvertResult<String> {
        Ok(self.select_segments(select, Some(scope))?.join(""))
    }
}

/// Terms of a chain of one boolean connective, in source order.
fn connected<'e>(expr: &'e SqlExpr, op: BinaryOp, out: &mut Vec<&'e SqlExpr>) {
    match expr.unnested() {
        SqlExpr::Binary {
            left,
            op: inner,
            right,
        } if *inner == op => {
            connected(left, op, out);
            connected(right, op, out);
        }
        other => out.push(other),
    }
}

/// Whether `expr` evaluates to a boolean criterion.
fn is_predicate(expr: &SqlExpr) -> bool {
    match expr.unnested() {
        SqlExpr::Binary { op, .. } => op.is_comparison() || matches!(op, BinaryOp::And | BinaryOp::Or),
        SqlExpr::Not(_)
        | SqlExpr::IsNull { .. }
        | SqlExpr::InList { .. }
        | SqlExpr::InSubquery { .. }
        | SqlExpr::Between { .. }
        | SqlExpr::Like { .. }
        | SqlExpr::Exists { .. } => true,
        _ => false,
    }
}
