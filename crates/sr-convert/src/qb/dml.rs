//! UPDATE and DELETE chains.

use super::{all_selects, attribute, block, subqueries, Imports, Writer};
use crate::context::ConversionContext;
use crate::error::ConvertResult;
use sr_sql::ir::{DeleteQuery, SqlExpr, TableRef, UpdateQuery};
use sr_sql::SelectQuery;

/// `frappe.qb.update(t).set(...).where(...).run()`.
pub fn update_chain(update: &UpdateQuery, ctx: &ConversionContext<'_>) -> ConvertResult<String> {
    let exprs: Vec<&SqlExpr> = update
        .assignments
        .iter()
        .map(|a| &a.value)
        .chain(update.selection.iter())
        .collect();
    let writer = Writer::new(ctx, referenced_tables(&update.table, &exprs));
    let scope = writer.scope([&update.table], Vec::new(), None)?;
    let binding = writer.decls.binding(&update.table)?;
    let imports = Imports::for_exprs(exprs);

    let mut segments = vec![format!("frappe.qb.update({binding})")];
    for assignment in &update.assignments {
        segments.push(format!(
            ".set({}, {})",
            attribute(binding, &assignment.column),
            writer.expr(&assignment.value, &scope)?
        ));
    }
    if let Some(selection) = &update.selection {
        segments.push(format!(".where({})", writer.condition(selection, &scope)?));
    }
    segments.push(".run()".to_string());

    let mut lines = writer.preamble(&imports);
    lines.push(block("", &segments));
    Ok(lines.join("\n"))
}

/// `frappe.qb.from_(t).delete().where(...).run()`.
pub fn delete_chain(delete: &DeleteQuery, ctx: &ConversionContext<'_>) -> ConvertResult<String> {
    let exprs: Vec<&SqlExpr> = delete.selection.iter().collect();
    let writer = Writer::new(ctx, referenced_tables(&delete.table, &exprs));
    let scope = writer.scope([&delete.table], Vec::new(), None)?;
    let binding = writer.decls.binding(&delete.table)?;
    let imports = Imports::for_exprs(exprs);

    let mut segments = vec![format!("frappe.qb.from_({binding})"), ".delete()".to_string()];
    if let Some(selection) = &delete.selection {
        segments.push(format!(".where({})", writer.condition(selection, &scope)?));
    }
    segments.push(".run()".to_string());

    let mut lines = writer.preamble(&imports);
    lines.push(block("", &segments));
    Ok(lines.join("\n"))
}

/// The target table followed by every table a subquery reads.
fn referenced_tables<'q>(target: &'q TableRef, exprs: &[&'q SqlExpr]) -> Vec<&'q TableRef> {
    let mut selects: Vec<&SelectQuery> = Vec::new();
    for sub in subqueries(exprs.iter().copied()) {
        all_selects(sub, &mut selects);
    }
    std::iter::once(target)
        .chain(selects.into_iter().flat_map(SelectQuery::tables))
        .collect()
}
