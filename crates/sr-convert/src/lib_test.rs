use super::*;
use sr_core::{ConsumptionMode, ParamMap, ParamValue};
use sr_sql::{analyze, normalize, SqlParser};

fn convert(
    sql: &str,
    params: Option<&ParamMap>,
    consumption: ConsumptionMode,
) -> Conversion {
    let normalized = normalize(sql);
    let analysis = analyze(&SqlParser::mysql(), &normalized).unwrap();
    let ctx = ConversionContext {
        normalized: &normalized,
        params,
        kwargs: None,
        consumption: &consumption,
        table_prefix: "tab",
    };
    Converter::new("tab").unwrap().convert(&analysis.query, &ctx)
}

#[test]
fn test_returned_lookup_is_orm_and_validated() {
    let params: ParamMap = [("uid".to_string(), ParamValue::str("u1"))]
        .into_iter()
        .collect();
    let conversion = convert(
        "SELECT name FROM tabUser WHERE name = %(uid)s",
        Some(&params),
        ConsumptionMode::Returned,
    );
    assert!(conversion.validated, "{conversion:?}");
    assert!(conversion.code.starts_with("return frappe.get_all("));
    assert!(conversion.code.contains("fields=[\"name\"]"));
    assert!(conversion.code.contains("filters={\"name\": \"u1\"}"));
    assert_eq!(conversion.notes, None);
}

#[test]
fn test_join_group_by_is_builder_and_validated() {
    let conversion = convert(
        "SELECT a.name, COUNT(b.name) FROM tabA a JOIN tabB b ON a.name=b.parent GROUP BY a.name",
        None,
        ConsumptionMode::Assign("rows".to_string()),
    );
    assert!(conversion.validated, "{conversion:?}");
    assert!(conversion.code.contains("a = frappe.qb.DocType(\"A\")"));
    assert!(conversion.code.contains("b = frappe.qb.DocType(\"B\")"));
    assert!(conversion.code.contains(".groupby(a.name)"));
    assert!(conversion.code.contains("rows = (\n"));
}

#[test]
fn test_delete_all_is_validated() {
    let conversion = convert("DELETE FROM tabLog", None, ConsumptionMode::Expression);
    assert_eq!(conversion.code, "frappe.db.delete(\"Log\")");
    assert!(conversion.validated);
}

#[test]
fn test_orm_failure_falls_back_to_builder() {
    let conversion = convert(
        "SELECT name FROM tabNote WHERE a = 1 AND (b = 2 OR c = 3)",
        None,
        ConsumptionMode::Returned,
    );
    assert!(conversion.code.contains(".where((note.a == 1) & ((note.b == 2) | (note.c == 3)))"));
    assert!(conversion.validated);
}

#[test]
fn test_unresolved_parameter_becomes_manual() {
    let conversion = convert(
        "SELECT name FROM tabNote WHERE owner = %s",
        None,
        ConsumptionMode::Returned,
    );
    assert_eq!(
        conversion.code,
        "# MANUAL: Could not resolve parameter %s - needs manual conversion"
    );
    assert!(!conversion.validated);
}

#[test]
fn test_insert_is_manual_template() {
    let conversion = convert(
        "INSERT INTO tabNote (title) VALUES ('x')",
        None,
        ConsumptionMode::Expression,
    );
    assert!(conversion.code.starts_with("# MANUAL: INSERT into Note"));
    assert!(!conversion.validated);
}

#[test]
fn test_generate_never_fails() {
    let normalized = normalize("SELECT t.x FROM (SELECT 1 AS x) t");
    let analysis = analyze(&SqlParser::mysql(), &normalized).unwrap();
    let ctx = ConversionContext {
        normalized: &normalized,
        params: None,
        kwargs: None,
        consumption: &ConsumptionMode::Unknown,
        table_prefix: "tab",
    };
    let code = generate(&analysis.query, &ctx);
    assert!(code.starts_with("# MANUAL: Derived table or CTE in FROM"));
}

#[test]
fn test_brace_block_inside_string_literal_is_manual() {
    let conversion = convert(
        r#"SELECT name FROM tabNote WHERE meta = '{"k": 1}'"#,
        None,
        ConsumptionMode::Returned,
    );
    assert_eq!(
        conversion.code,
        r#"# MANUAL: Placeholder {"k": 1} inside a quoted string - needs manual conversion"#
    );
    assert!(!conversion.validated);
    assert!(!conversion.code.contains("__PH"));
}

#[test]
fn test_named_placeholder_inside_string_literal_is_manual() {
    let params: ParamMap = [("x".to_string(), ParamValue::str("a"))]
        .into_iter()
        .collect();
    let conversion = convert(
        "SELECT name FROM tabNote WHERE title LIKE '%(x)s%%'",
        Some(&params),
        ConsumptionMode::Returned,
    );
    assert!(conversion.code.starts_with("# MANUAL: Placeholder %(x)s inside a quoted string"));
    assert!(!conversion.validated);
}
