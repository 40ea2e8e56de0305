//! INSERT is never converted automatically; emit a commented template.

use crate::context::ConversionContext;
use sr_core::marker::{comment_out, manual};
use sr_core::python_string;
use sr_sql::ir::InsertQuery;

pub fn generate_insert(insert: &InsertQuery, ctx: &ConversionContext<'_>) -> String {
    let entity = ctx.entity(&insert.table);
    let mut template = vec![
        "frappe.get_doc({".to_string(),
        format!("\t\"doctype\": {},", python_string(&entity)),
    ];
    if insert.columns.is_empty() {
        template.push("\t# field mappings".to_string());
    }
    for column in &insert.columns {
        template.push(format!("\t{}: ...,", python_string(column)));
    }
    template.push("}).insert()".to_string());

    format!(
        "{}\n{}",
        manual(&format!(
            "INSERT into {entity} - use frappe.get_doc(...).insert() instead"
        )),
        comment_out(&template.join("\n"))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sr_core::ConsumptionMode;
    use sr_sql::normalize;
    use sr_sql::ir::TableRef;

    #[test]
    fn test_insert_emits_commented_template() {
        let normalized = normalize("INSERT INTO tabNote (title, owner) VALUES (%s, %s)");
        let ctx = ConversionContext {
            normalized: &normalized,
            params: None,
            kwargs: None,
            consumption: &ConsumptionMode::Expression,
            table_prefix: "tab",
        };
        let insert = InsertQuery {
            table: TableRef::new("tabNote"),
            columns: vec!["title".to_string(), "owner".to_string()],
        };

        let code = generate_insert(&insert, &ctx);
        let mut lines = code.lines();
        assert_eq!(
            lines.next(),
            Some("# MANUAL: INSERT into Note - use frappe.get_doc(...).insert() instead")
        );
        assert!(code.contains("# \t\"doctype\": \"Note\","));
        assert!(code.contains("# \t\"title\": ...,"));
        assert!(code.contains("# }).insert()"));
        assert!(lines.all(|l| l.starts_with('#')));
    }
}
