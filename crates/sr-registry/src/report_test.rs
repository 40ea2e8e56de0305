use super::*;
use chrono::Utc;
use sr_core::ConsumptionMode;

fn call(id: &str, file: &str, line: usize, sql: &str, code: &str) -> SqlCall {
    let now = Utc::now();
    SqlCall {
        call_id: id.to_string(),
        file_path: file.to_string(),
        line_number: line,
        function_context: "def a_rather_long_function_name(doc, method):".to_string(),
        sql_query: sql.to_string(),
        sql_params: None,
        sql_kwargs: None,
        consumption: ConsumptionMode::Unknown,
        parsed_sql: sql.to_string(),
        semantic_signature: sql.to_lowercase(),
        generated_code: code.to_string(),
        notes: None,
        created_at: now,
        updated_at: now,
        conversion_eligible: true,
        conversion_validated: true,
        ineligibility_reason: None,
    }
}

fn sample() -> RegistryData {
    let mut data = RegistryData::default();
    data.metadata.repository = "acme/app".to_string();
    data.metadata.commit_hash = "abc1234".to_string();
    for c in [
        call("aaaaaaaaaaaa", "app/x.py", 20, "SELECT a FROM tabA", "result = frappe.get_all(\"A\")"),
        call("bbbbbbbbbbbb", "app/x.py", 3, "SELECT b FROM tabB WHERE x = 'a|b'", "result = (\n\tfrappe.qb.from_(b)\n)"),
        call("cccccccccccc", "app/y.py", 7, "DELETE FROM tabC", "# MANUAL: DELETE"),
    ] {
        data.calls.insert(c.call_id.clone(), c);
    }
    data
}

#[test]
fn test_header_and_status_table() {
    let report = generate_report(&sample());
    assert!(report.starts_with("# SQL Operations Registry Report\n"));
    assert!(report.contains("**Repository**: acme/app"));
    assert!(report.contains("**Last Updated**: Never"));
    assert!(report.contains("**Commit**: abc1234"));
    assert!(report.contains("**Total SQL Operations**: 3"));
    assert!(report.contains("| ✅ Query Builder | 1 | 33.3% |"));
    assert!(report.contains("| 💡 ORM-eligible | 1 | 33.3% |"));
    assert!(report.contains("| 🔧 Manual Review | 1 | 33.3% |"));
    assert!(report.contains("| ⚠️ Has TODOs | 0 | 0.0% |"));
}

#[test]
fn test_files_sorted_by_count_and_rows_by_line() {
    let report = generate_report(&sample());
    let x = report.find("### x.py (2 operations)").unwrap();
    let y = report.find("### y.py (1 operations)").unwrap();
    assert!(x < y);
    assert!(report.contains("**Path**: `app/x.py`"));

    let first = report.find("| `bbbbbbbb` |").unwrap();
    let second = report.find("| `aaaaaaaa` |").unwrap();
    assert!(first < second);
    assert!(report.contains("| def a_rather_long_functio |"));
    assert!(report.contains("x = 'a\\|b'"));
}

#[test]
fn test_summary_counts() {
    let report = generate_report(&sample());
    assert!(report.contains("- **Files with SQL Operations**: 2"));
    assert!(report.contains("- **Total Operations Tracked**: 3"));
    assert!(report.contains("- **Unique Query Patterns**: 3"));
}

#[test]
fn test_empty_registry() {
    let report = generate_report(&RegistryData::default());
    assert!(report.contains("**Total SQL Operations**: 0"));
    assert!(report.contains("| ✅ Query Builder | 0 | 0.0% |"));
    assert!(report.contains("- **Unique Query Patterns**: 0"));
}
