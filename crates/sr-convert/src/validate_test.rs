use super::*;
use sr_sql::{analyze, normalize, SqlParser};

fn parsed(sql: &str) -> ParsedQuery {
    analyze(&SqlParser::mysql(), &normalize(sql)).unwrap().query
}

fn validate(sql: &str, code: &str) -> Result<(), String> {
    Validator::new("tab").unwrap().validate(&parsed(sql), code)
}

#[test]
fn test_orm_call_matches() {
    let code = "return frappe.get_all(\n\t\"User\",\n\tfilters={\"name\": \"u1\"},\n\tfields=[\"name\"],\n\tas_list=True\n)";
    assert_eq!(validate("SELECT name FROM tabUser WHERE name = %(uid)s", code), Ok(()));
}

#[test]
fn test_builder_chain_matches() {
    let code = "from frappe.query_builder import functions as fn\n\
                a = frappe.qb.DocType(\"A\")\n\
                b = frappe.qb.DocType(\"B\")\n\
                (\n\
                \tfrappe.qb.from_(a)\n\
                \t.join(b).on(a.name == b.parent)\n\
                \t.select(a.name, fn.Count(b.name))\n\
                \t.groupby(a.name)\n\
                \t.run()\n\
                )";
    let sql = "SELECT a.name, COUNT(b.name) FROM tabA a JOIN tabB b ON a.name=b.parent GROUP BY a.name";
    assert_eq!(validate(sql, code), Ok(()));

    let fp = Validator::new("tab").unwrap().fingerprint(code).unwrap();
    assert_eq!(fp.query_type, QueryType::Select);
    assert_eq!(fp.field_count, 2);
    assert_eq!(fp.joins, 1);
    assert!(fp.has_group_by);
    assert!(!fp.has_where);
}

#[test]
fn test_table_loss_is_caught() {
    let code = "a = frappe.qb.DocType(\"A\")\n(\n\tfrappe.qb.from_(a)\n\t.select(a.name, a.title)\n\t.run()\n)";
    let err = validate(
        "SELECT a.name, b.title FROM tabA a JOIN tabB b ON a.name = b.parent",
        code,
    )
    .unwrap_err();
    assert_eq!(err, "Table mismatch: {'a', 'b'} vs {'a'}");
}

#[test]
fn test_every_violation_is_reported() {
    let code = "return frappe.get_all(\"Note\", fields=[\"name\"], limit=10)";
    let err = validate("SELECT name, title FROM tabNote WHERE owner = 'x' LIMIT 5", code).unwrap_err();
    assert_eq!(
        err,
        "Field count mismatch: 2 vs 1; WHERE clause mismatch: original=True, generated=False; LIMIT mismatch: 5 vs 10"
    );
}

#[test]
fn test_wildcard_skips_field_count() {
    let code = "frappe.get_all(\"Note\", fields=[\"*\"])";
    assert_eq!(validate("SELECT * FROM tabNote", code), Ok(()));
}

#[test]
fn test_subquery_calls_are_not_counted() {
    let code = "user = frappe.qb.DocType(\"User\")\n\
                note = frappe.qb.DocType(\"Note\")\n\
                (\n\
                \tfrappe.qb.from_(user)\n\
                \t.select(user.name)\n\
                \t.where(user.name.isin(SubQuery(frappe.qb.from_(note).select(note.owner, note.title).limit(3))))\n\
                \t.run()\n\
                )";
    let sql = "SELECT name FROM tabUser WHERE name IN (SELECT owner FROM tabNote)";
    assert_eq!(validate(sql, code), Ok(()));
}

#[test]
fn test_delete_forms() {
    assert_eq!(validate("DELETE FROM tabLog", "frappe.db.delete(\"Log\")"), Ok(()));
    assert_eq!(
        validate(
            "DELETE FROM tabLog WHERE owner = 'x'",
            "frappe.db.delete(\"Log\", {\"owner\": \"x\"})"
        ),
        Ok(())
    );
    let chain = "log = frappe.qb.DocType(\"Log\")\n(\n\tfrappe.qb.from_(log)\n\t.delete()\n\t.where(log.creation < \"2024\")\n\t.run()\n)";
    assert_eq!(validate("DELETE FROM tabLog WHERE creation < '2024'", chain), Ok(()));
}

#[test]
fn test_update_forms() {
    assert_eq!(
        validate(
            "UPDATE tabTask SET status = 'Closed' WHERE name = 'T-1'",
            "frappe.db.set_value(\"Task\", \"T-1\", \"status\", \"Closed\", update_modified=False)"
        ),
        Ok(())
    );
    let err = validate(
        "UPDATE tabTask SET status = 'Closed' WHERE name = 'T-1'",
        "frappe.db.delete(\"Task\", {\"name\": \"T-1\"})",
    )
    .unwrap_err();
    assert_eq!(err, "Query type mismatch: UPDATE vs DELETE");
}

#[test]
fn test_manual_code_is_skipped() {
    assert_eq!(validate("SELECT name FROM tabUser", "# MANUAL: anything"), Ok(()));
}

#[test]
fn test_unparsable_or_unrecognized_code_fails() {
    assert_eq!(
        validate("SELECT name FROM tabUser", "frappe.get_all(\"User\""),
        Err("Could not parse generated code".to_string())
    );
    assert_eq!(
        validate("SELECT name FROM tabUser", "x = 1"),
        Err("Generated code contains no recognizable query".to_string())
    );
}
