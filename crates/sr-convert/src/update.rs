//! UPDATE → `frappe.db.set_value(...)` or a Query Builder update chain.

use crate::context::ConversionContext;
use crate::error::{ConvertError, ConvertResult};
use crate::qb::update_chain;
use sr_core::python_string;
use sr_sql::ir::{BinaryOp, SqlExpr, UpdateQuery};

pub fn generate_update(update: &UpdateQuery, ctx: &ConversionContext<'_>) -> ConvertResult<String> {
    if update.multi_table {
        return Err(ConvertError::unsupported(
            "Multi-table UPDATE - requires manual conversion",
        ));
    }
    let entity = ctx.entity(&update.table);
    let Some(selection) = &update.selection else {
        return Err(ConvertError::unsupported(format!(
            "UPDATE without WHERE on {entity} - needs manual review"
        )));
    };
    if update.assignments.is_empty() {
        return Err(ConvertError::unsupported(format!(
            "UPDATE on {entity} without SET fields - needs manual conversion"
        )));
    }

    if let Some(name) = name_filter(selection, ctx) {
        let name = name?;
        if let Some(values) = constant_assignments(update, ctx) {
            let values = values?;
            let fields = match values.as_slice() {
                [(field, value)] => format!("{}, {value}", python_string(field)),
                many => {
                    let items: Vec<String> = many
                        .iter()
                        .map(|(field, value)| format!("{}: {value}", python_string(field)))
                        .collect();
                    format!("{{{}}}", items.join(", "))
                }
            };
            return Ok(format!(
                "frappe.db.set_value({}, {name}, {fields}, update_modified=False)",
                python_string(&entity)
            ));
        }
    }

    update_chain(update, ctx).map_err(|err| match err {
        ConvertError::Unsupported(reason) => ConvertError::unsupported(format!(
            "UPDATE with complex WHERE on {entity} ({reason}) - use frappe.db.set_value(\"{entity}\", filters, fields_dict) or Query Builder"
        )),
        other => other,
    })
}

/// The bound value when the WHERE clause is exactly `name = <constant>`.
fn name_filter(selection: &SqlExpr, ctx: &ConversionContext<'_>) -> Option<ConvertResult<String>> {
    let SqlExpr::Binary {
        left,
        op: BinaryOp::Eq,
        right,
    } = selection.unnested()
    else {
        return None;
    };
    let is_name = |e: &SqlExpr| {
        matches!(e.unnested(), SqlExpr::Column { name, .. } if name.eq_ignore_ascii_case("name"))
    };
    if is_name(left) {
        ctx.constant(right)
    } else if is_name(right) {
        ctx.constant(left)
    } else {
        None
    }
}

/// `(column, python value)` pairs when every SET value is a constant.
fn constant_assignments(
    update: &UpdateQuery,
    ctx: &ConversionContext<'_>,
) -> Option<ConvertResult<Vec<(String, String)>>> {
    let mut values = Vec::with_capacity(update.assignments.len());
    for assignment in &update.assignments {
        match ctx.constant(&assignment.value)? {
            Ok(value) => values.push((assignment.column.clone(), value)),
            Err(err) => return Some(Err(err)),
        }
    }
    Some(Ok(values))
}

#[cfg(test)]
#[path = "update_test.rs"]
mod tests;
