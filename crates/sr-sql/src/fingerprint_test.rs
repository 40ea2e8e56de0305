use super::*;
use crate::lower::analyze;
use crate::parser::SqlParser;
use crate::placeholder::normalize;

fn fingerprint(sql: &str) -> StructuralFingerprint {
    let analysis = analyze(&SqlParser::mysql(), &normalize(sql)).unwrap();
    StructuralFingerprint::from_query(&analysis.query, "tab")
}

#[test]
fn test_select_fingerprint() {
    let fp = fingerprint(
        "SELECT a.name, COUNT(b.name) FROM tabA a JOIN tabB b ON a.name = b.parent GROUP BY a.name LIMIT 20",
    );
    assert_eq!(fp.query_type, QueryType::Select);
    assert_eq!(
        fp.tables,
        ["a", "b"].iter().map(|s| s.to_string()).collect()
    );
    assert_eq!(fp.field_count, 2);
    assert_eq!(fp.joins, 1);
    assert!(fp.has_group_by);
    assert!(fp.has_aggregation);
    assert!(!fp.has_where);
    assert_eq!(fp.limit, Some(LimitValue::Fixed(20)));
}

#[test]
fn test_dynamic_limit() {
    let fp = fingerprint("SELECT name FROM tabA LIMIT %(page_len)s");
    assert_eq!(fp.limit, Some(LimitValue::Dynamic));
}

#[test]
fn test_entity_names_are_normalized() {
    let fp = fingerprint("SELECT name FROM `tabSales Invoice`");
    assert!(fp.tables.contains("sales invoice"));
}

#[test]
fn test_compare_equal() {
    let fp = fingerprint("SELECT name FROM tabUser WHERE name = 'x'");
    assert!(compare(&fp, &fp.clone()).is_ok());
}

#[test]
fn test_compare_table_loss() {
    let original = fingerprint("SELECT a.name FROM tabA a JOIN tabB b ON a.name = b.parent");
    let mut generated = original.clone();
    generated.tables.remove("b");
    let err = compare(&original, &generated).unwrap_err();
    assert_eq!(err, "Table mismatch: {'a', 'b'} vs {'a'}");
}

#[test]
fn test_compare_allows_extra_tables() {
    let original = fingerprint("SELECT name FROM tabA");
    let mut generated = original.clone();
    generated.tables.insert("b".to_string());
    assert!(compare(&original, &generated).is_ok());
}

#[test]
fn test_compare_collects_every_mismatch() {
    let original = fingerprint("SELECT name, owner FROM tabA WHERE x = 1 LIMIT 5");
    let mut generated = StructuralFingerprint::empty(QueryType::Select);
    generated.tables.insert("a".to_string());
    generated.field_count = 1;
    let err = compare(&original, &generated).unwrap_err();
    assert_eq!(
        err,
        "Field count mismatch: 2 vs 1; WHERE clause mismatch: original=True, generated=False; LIMIT mismatch: 5 vs None"
    );
}

#[test]
fn test_wildcard_skips_field_count() {
    let original = fingerprint("SELECT * FROM tabA");
    let mut generated = original.clone();
    generated.field_count = 7;
    assert!(compare(&original, &generated).is_ok());
}

#[test]
fn test_dynamic_limit_matches_any_present_limit() {
    let original = fingerprint("SELECT name FROM tabA LIMIT %s");
    let mut generated = original.clone();
    generated.limit = Some(LimitValue::Fixed(10));
    assert!(compare(&original, &generated).is_ok());
    generated.limit = None;
    assert!(compare(&original, &generated).is_err());
}

#[test]
fn test_query_type_mismatch() {
    let original = fingerprint("DELETE FROM tabLog");
    let generated = StructuralFingerprint {
        tables: original.tables.clone(),
        ..StructuralFingerprint::empty(QueryType::Update)
    };
    assert_eq!(
        compare(&original, &generated).unwrap_err(),
        "Query type mismatch: DELETE vs UPDATE"
    );
}
