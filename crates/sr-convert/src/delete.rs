//! DELETE → `frappe.db.delete(...)` or a Query Builder delete chain.

use crate::context::ConversionContext;
use crate::error::{ConvertError, ConvertResult};
use crate::qb::delete_chain;
use sr_core::python_string;
use sr_sql::ir::{BinaryOp, DeleteQuery, SqlExpr};

pub fn generate_delete(delete: &DeleteQuery, ctx: &ConversionContext<'_>) -> ConvertResult<String> {
    if delete.multi_table {
        return Err(ConvertError::unsupported(
            "Multi-table DELETE - requires manual conversion",
        ));
    }
    let entity = ctx.entity(&delete.table);
    let doctype = python_string(&entity);
    let Some(selection) = &delete.selection else {
        return Ok(format!("frappe.db.delete({doctype})"));
    };

    if let Some(filters) = filter_dict(selection, ctx) {
        return Ok(format!("frappe.db.delete({doctype}, {})", filters?));
    }

    delete_chain(delete, ctx).map_err(|err| {
        log::debug!("delete chain for {entity} failed: {err}");
        ConvertError::unsupported(format!(
            "DELETE with WHERE on {entity} - convert to frappe.db.delete({doctype}, filters) or Query Builder"
        ))
    })
}

/// `{"field": value, ...}` when the WHERE clause is a conjunction of
/// `column = constant` on distinct columns.
fn filter_dict(selection: &SqlExpr, ctx: &ConversionContext<'_>) -> Option<ConvertResult<String>> {
    let mut terms = Vec::new();
    conjuncts(selection, &mut terms);

    let mut items: Vec<(String, &SqlExpr)> = Vec::with_capacity(terms.len());
    for term in terms {
        let SqlExpr::Binary {
            left,
            op: BinaryOp::Eq,
            right,
        } = term
        else {
            return None;
        };
        let (column, value) = match (left.unnested(), right.unnested()) {
            (SqlExpr::Column { name, .. }, value) | (value, SqlExpr::Column { name, .. }) => {
                (name.clone(), value)
            }
            _ => return None,
        };
        if items.iter().any(|(seen, _)| *seen == column) {
            return None;
        }
        items.push((column, value));
    }

    let mut rendered = Vec::with_capacity(items.len());
    for (column, value) in items {
        match ctx.constant(value)? {
            Ok(value) => rendered.push(format!("{}: {value}", python_string(&column))),
            Err(err) => return Some(Err(err)),
        }
    }
    Some(Ok(format!("{{{}}}", rendered.join(", "))))
}

fn conjuncts<'e>(expr: &'e SqlExpr, out: &mut Vec<&'e SqlExpr>) {
    match expr.unnested() {
        SqlExpr::Binary {
            left,
            op: BinaryOp::And,
            right,
        } => {
            conjuncts(left, out);
            conjuncts(right, out);
        }
        other => out.push(other),
    }
}

#[cfg(test)]
#[path = "delete_test.rs"]
mod tests;
