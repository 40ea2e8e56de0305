//! Minimal-ORM generator: single-table SELECT → `frappe.get_all(...)`.

use crate::context::ConversionContext;
use crate::error::{ConvertError, ConvertResult};
use sr_core::{python_string, ParamValue};
use sr_sql::ir::{BinaryOp, SqlExpr, TableRef};
use sr_sql::placeholder::contains_sentinel;
use sr_sql::SelectQuery;

const WRAP_FIELDS_OVER: usize = 3;

/// One `[field, operator, value]` filter.
#[derive(Debug, Clone, PartialEq)]
struct Condition {
    field: String,
    operator: &'static str,
    value: String,
}

impl Condition {
    fn render(&self) -> String {
        format!(
            "[{}, {}, {}]",
            python_string(&self.field),
            python_string(self.operator),
            self.value
        )
    }
}

pub fn generate_orm(select: &SelectQuery, ctx: &ConversionContext<'_>) -> ConvertResult<String> {
    let table = match select.from.as_slice() {
        [table] if select.joins.is_empty() => table,
        _ => return Err(ConvertError::unsupported("get_all needs exactly one table")),
    };
    let entity = ctx.entity(table);

    let mut args = vec![format!("\t{}", python_string(&entity))];

    if let Some(selection) = &select.selection {
        args.push(format!("\tfilters={}", filters(selection, table, ctx)?));
    }

    let fields = fields(select, table)?;
    args.push(format!("\tfields={}", render_fields(&fields)));

    if !select.order_by.is_empty() {
        let parts = select
            .order_by
            .iter()
            .map(|item| {
                let field = field_name(&item.expr, table).ok_or_else(|| {
                    ConvertError::unsupported("ORDER BY expression is not a plain field")
                })?;
                let direction = if item.descending { "desc" } else { "asc" };
                Ok(format!("{field} {direction}"))
            })
            .collect::<ConvertResult<Vec<_>>>()?;
        args.push(format!("\torder_by={}", python_string(&parts.join(", "))));
    }

    if let Some(limit) = &select.limit {
        args.push(format!("\tlimit={}", constant(limit, ctx)?));
    }
    if let Some(offset) = &select.offset {
        args.push(format!("\tstart={}", constant(offset, ctx)?));
    }
    if select.distinct {
        args.push("\tdistinct=True".to_string());
    }
    if let Some(shape) = result_shape(&fields, ctx)? {
        args.push(format!("\t{shape}"));
    }

    Ok(format!(
        "{}frappe.get_all(\n{}\n)",
        ctx.consumption.result_prefix(),
        args.join(",\n")
    ))
}

/// Column name when `expr` is a column of `table`.
fn field_name<'e>(expr: &'e SqlExpr, table: &TableRef) -> Option<&'e str> {
    match expr.unnested() {
        SqlExpr::Column { qualifier, name } => match qualifier {
            None => Some(name),
            Some(q) if q == table.reference_name() || *q == table.name => Some(name),
            Some(_) => None,
        },
        _ => None,
    }
}

fn constant(expr: &SqlExpr, ctx: &ConversionContext<'_>) -> ConvertResult<String> {
    ctx.constant(expr).unwrap_or_else(|| {
        Err(ConvertError::unsupported(
            "operand is neither a literal nor a bound parameter",
        ))
    })
}

fn fields(select: &SelectQuery, table: &TableRef) -> ConvertResult<Vec<String>> {
    select
        .projection
        .iter()
        .map(|p| {
            let base = if p.is_wildcard() {
                "*".to_string()
            } else if let Some(name) = field_name(&p.expr, table) {
                name.to_string()
            } else if contains_sentinel(&p.sql) {
                return Err(ConvertError::unsupported(
                    "bound parameter inside a selected expression",
                ));
            } else {
                p.sql.clone()
            };
            Ok(match &p.alias {
                Some(alias) => format!("{base} as {alias}"),
                None => base,
            })
        })
        .collect()
}

fn render_fields(fields: &[String]) -> String {
    let quoted: Vec<String> = fields.iter().map(|f| python_string(f)).collect();
    if quoted.len() > WRAP_FIELDS_OVER {
        format!("[\n\t\t{},\n\t]", quoted.join(",\n\t\t"))
    } else {
        format!("[{}]", quoted.join(", "))
    }
}

/// Result-shape keyword matching what the raw call returned.
///
/// Raw SQL returns tuples unless `as_dict` or `pluck` was set.
fn result_shape(fields: &[String], ctx: &ConversionContext<'_>) -> ConvertResult<Option<String>> {
    if let Some(pluck) = ctx.kwarg("pluck") {
        if pluck.is_truthy() != Some(false) {
            return match fields.first() {
                Some(field) if fields.len() == 1 && field != "*" && !field.contains(' ') => {
                    Ok(Some(format!("pluck={}", python_string(field))))
                }
                _ => Err(ConvertError::unsupported(
                    "pluck needs a single plain field",
                )),
            };
        }
    }
    Ok(match ctx.kwarg("as_dict") {
        Some(flag) => match flag.is_truthy() {
            Some(true) => None,
            Some(false) => Some("as_list=True".to_string()),
            None => Some(format!("as_list=not {}", flag.to_python())),
        },
        None => Some("as_list=True".to_string()),
    })
}

/// Render a WHERE clause as a get_all filter structure.
///
/// A pure conjunction of equalities on distinct fields becomes a dict; any
/// other conjunction a list of triples; a disjunction a list led by `"or"`.
fn filters(
    selection: &SqlExpr,
    table: &TableRef,
    ctx: &ConversionContext<'_>,
) -> ConvertResult<String> {
    let mut terms = Vec::new();
    let disjunction = matches!(
        selection.unnested(),
        SqlExpr::Binary { op: BinaryOp::Or, .. }
    );
    let joiner = if disjunction { BinaryOp::Or } else { BinaryOp::And };
    flatten(selection, joiner, &mut terms);

    let conditions = terms
        .into_iter()
        .map(|term| condition(term, table, ctx))
        .collect::<ConvertResult<Vec<_>>>()?;

    let mut seen = Vec::new();
    let dict_form = !disjunction
        && conditions.iter().all(|c| {
            let fresh = !seen.contains(&c.field);
            seen.push(c.field.clone());
            c.operator == "=" && fresh
        });

    if dict_form {
        let items: Vec<String> = conditions
            .iter()
            .map(|c| format!("{}: {}", python_string(&c.field), c.value))
            .collect();
        return Ok(format!("{{{}}}", items.join(", ")));
    }

    let mut items: Vec<String> = Vec::with_capacity(conditions.len() + 1);
    if disjunction {
        items.push(python_string("or"));
    }
    items.extend(conditions.iter().map(Condition::render));
    Ok(format!("[{}]", items.join(", ")))
}

fn flatten<'e>(expr: &'e SqlExpr, joiner: BinaryOp, out: &mut Vec<&'e SqlExpr>) {
    match expr.unnested() {
        SqlExpr::Binary { left, op, right } if *op == joiner => {
            flatten(left, joiner, out);
            flatten(right, joiner, out);
        }
        other => out.push(other),
    }
}

fn condition(
    term: &SqlExpr,
    table: &TableRef,
    ctx: &ConversionContext<'_>,
) -> ConvertResult<Condition> {
    let not_expressible =
        || ConvertError::unsupported("WHERE clause is not expressible as get_all filters");

    match term {
        SqlExpr::Binary { left, op, right } if op.is_comparison() => {
            let (field, value, op) = match (field_name(left, table), field_name(right, table)) {
                (Some(field), None) => (field, right.as_ref(), *op),
                (None, Some(field)) => (field, left.as_ref(), flip(*op)),
                _ => return Err(not_expressible()),
            };
            let operator = op.filter_operator().ok_or_else(not_expressible)?;
            let value = ctx.constant(value).ok_or_else(not_expressible)??;
            Ok(Condition {
                field: field.to_string(),
                operator,
                value,
            })
        }
        SqlExpr::IsNull { expr, negated } => Ok(Condition {
            field: field_name(expr, table).ok_or_else(not_expressible)?.to_string(),
            operator: "is",
            value: python_string(if *negated { "set" } else { "not set" }),
        }),
        SqlExpr::InList {
            expr,
            list,
            negated,
        } => {
            let field = field_name(expr, table).ok_or_else(not_expressible)?;
            let value = match list.as_slice() {
                [single] if ctx.is_list_placeholder(single) => {
                    ctx.constant(single).ok_or_else(not_expressible)??
                }
                items => {
                    let values = items
                        .iter()
                        .map(|item| ctx.constant(item).ok_or_else(not_expressible)?)
                        .collect::<ConvertResult<Vec<_>>>()?;
                    format!("[{}]", values.join(", "))
                }
            };
            Ok(Condition {
                field: field.to_string(),
                operator: if *negated { "not in" } else { "in" },
                value,
            })
        }
        SqlExpr::Like {
            expr,
            pattern,
            negated,
        } => Ok(Condition {
            field: field_name(expr, table).ok_or_else(not_expressible)?.to_string(),
            operator: if *negated { "not like" } else { "like" },
            value: ctx.constant(pattern).ok_or_else(not_expressible)??,
        }),
        SqlExpr::Between {
            expr,
            low,
            high,
            negated: false,
        } => {
            let low = ctx.constant(low).ok_or_else(not_expressible)??;
            let high = ctx.constant(high).ok_or_else(not_expressible)??;
            Ok(Condition {
                field: field_name(expr, table).ok_or_else(not_expressible)?.to_string(),
                operator: "between",
                value: format!("[{low}, {high}]"),
            })
        }
        _ => Err(not_expressible()),
    }
}

fn flip(op: BinaryOp) -> BinaryOp {
    match op {
        BinaryOp::Lt => BinaryOp::Gt,
        BinaryOp::LtEq => BinaryOp::GtEq,
        BinaryOp::Gt => BinaryOp::Lt,
        BinaryOp::GtEq => BinaryOp::LtEq,
        other => other,
    }
}

#[cfg(test)]
#[path = "orm_test.rs"]
mod tests;
