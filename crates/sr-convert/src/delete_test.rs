use super::*;
use sr_core::{ConsumptionMode, ParamMap, ParamValue};
use sr_sql::{analyze, normalize, ParsedQuery, SqlParser};

fn delete(sql: &str, params: Option<&ParamMap>) -> ConvertResult<String> {
    let normalized = normalize(sql);
    let query = match analyze(&SqlParser::mysql(), &normalized).unwrap().query {
        ParsedQuery::Delete(query) => query,
        other => panic!("expected DELETE, got {other:?}"),
    };
    let ctx = ConversionContext {
        normalized: &normalized,
        params,
        kwargs: None,
        consumption: &ConsumptionMode::Expression,
        table_prefix: "tab",
    };
    generate_delete(&query, &ctx)
}

#[test]
fn test_delete_all_rows() {
    assert_eq!(delete("DELETE FROM tabLog", None).unwrap(), "frappe.db.delete(\"Log\")");
}

#[test]
fn test_equality_filters_become_dict() {
    let params: ParamMap = [("user".to_string(), ParamValue::var("user"))]
        .into_iter()
        .collect();
    let code = delete(
        "DELETE FROM `tabToDo` WHERE owner = %(user)s AND status = 'Closed'",
        Some(&params),
    )
    .unwrap();
    assert_eq!(
        code,
        "frappe.db.delete(\"ToDo\", {\"owner\": user, \"status\": \"Closed\"})"
    );
}

#[test]
fn test_range_filter_uses_builder_chain() {
    let code = delete("DELETE FROM tabLog WHERE creation < '2024-01-01'", None).unwrap();
    assert_eq!(
        code,
        "log = frappe.qb.DocType(\"Log\")\n\
         (\n\
         \tfrappe.qb.from_(log)\n\
         \t.delete()\n\
         \t.where(log.creation < \"2024-01-01\")\n\
         \t.run()\n\
         )"
    );
}

#[test]
fn test_unresolvable_chain_falls_back_to_manual() {
    let err = delete("DELETE FROM tabLog WHERE creation < %s", None).unwrap_err();
    assert_eq!(
        err,
        ConvertError::Unsupported(
            "DELETE with WHERE on Log - convert to frappe.db.delete(\"Log\", filters) or Query Builder"
                .to_string()
        )
    );
}

#[test]
fn test_repeated_column_is_not_a_dict() {
    let code = delete("DELETE FROM tabLog WHERE category = 'a' AND category = 'b'", None).unwrap();
    assert!(code.contains(".where((log.category == \"a\") & (log.category == \"b\"))"));
}
