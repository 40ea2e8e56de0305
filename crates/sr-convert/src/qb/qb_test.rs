use super::*;
use sr_core::{ConsumptionMode, ParamMap, ParamValue};
use sr_sql::{analyze, normalize, ParsedQuery, SqlParser};

fn qb_with(sql: &str, params: Option<&ParamMap>, kwargs: Option<&ParamMap>) -> ConvertResult<String> {
    let normalized = normalize(sql);
    let select = match analyze(&SqlParser::mysql(), &normalized).unwrap().query {
        ParsedQuery::Select(select) => select,
        other => panic!("expected SELECT, got {other:?}"),
    };
    let ctx = ConversionContext {
        normalized: &normalized,
        params,
        kwargs,
        consumption: &ConsumptionMode::Returned,
        table_prefix: "tab",
    };
    generate_select(&select, &ctx)
}

fn qb(sql: &str) -> String {
    qb_with(sql, None, None).unwrap()
}

fn unsupported(sql: &str) -> String {
    match qb_with(sql, None, None) {
        Err(ConvertError::Unsupported(msg)) => msg,
        other => panic!("expected unsupported, got {other:?}"),
    }
}

#[test]
fn test_join_aggregate_group_by() {
    let code = qb("SELECT a.name, COUNT(b.name) FROM tabA a JOIN tabB b ON a.name=b.parent GROUP BY a.name");
    assert_eq!(
        code,
        "from frappe.query_builder import functions as fn\n\
         a = frappe.qb.DocType(\"A\")\n\
         b = frappe.qb.DocType(\"B\")\n\
         return (\n\
         \tfrappe.qb.from_(a)\n\
         \t.join(b).on(a.name == b.parent)\n\
         \t.select(a.name, fn.Count(b.name))\n\
         \t.groupby(a.name)\n\
         \t.run()\n\
         )"
    );
}

#[test]
fn test_bindings_follow_entity_without_alias() {
    let code = qb("SELECT COUNT(*) FROM `tabSales Invoice` WHERE docstatus = 1");
    assert!(code.contains("sales_invoice = frappe.qb.DocType(\"Sales Invoice\")"));
    assert!(code.contains(".select(fn.Count(\"*\"))"));
    assert!(code.contains(".where(sales_invoice.docstatus == 1)"));
}

#[test]
fn test_predicates_use_operator_overloads() {
    let code = qb(
        "SELECT COUNT(name) FROM tabTask \
         WHERE (status = 'Open' OR status IS NULL) AND priority IN ('High', 'Urgent') \
         AND subject LIKE 'fix%' AND progress BETWEEN 10 AND 90 AND NOT is_group = 1",
    );
    assert!(code.contains(
        ".where(((task.status == \"Open\") | (task.status.isnull())) & (task.priority.isin([\"High\", \"Urgent\"])) & (task.subject.like(\"fix%\")) & (task.progress[10:90]) & (~(task.is_group == 1)))"
    ), "{code}");
}

#[test]
fn test_unqualified_columns_in_join_become_fields() {
    let code = qb("SELECT a.name, title FROM tabA a, tabB b WHERE a.name = b.parent");
    assert!(code.contains("from frappe.query_builder import Field"));
    assert!(code.contains("frappe.qb.from_(a)\n\t.from_(b)"));
    assert!(code.contains(".select(a.name, Field(\"title\"))"));
}

#[test]
fn test_tuple_membership_is_manual() {
    let msg = unsupported("SELECT a.name FROM tabA a JOIN tabB b ON a.x = b.y WHERE (a.x, a.y) IN ((1, 2))");
    assert!(msg.starts_with("(col1, col2) IN list_of_tuples"));
}

#[test]
fn test_in_subquery_declares_inner_table() {
    let code = qb("SELECT name FROM tabUser WHERE name IN (SELECT owner FROM tabNote WHERE docstatus = 1)");
    assert!(code.contains("from frappe.query_builder.terms import SubQuery"));
    assert!(code.contains("user = frappe.qb.DocType(\"User\")\nnote = frappe.qb.DocType(\"Note\")"));
    assert!(code.contains(
        ".where(user.name.isin(SubQuery(frappe.qb.from_(note).select(note.owner).where(note.docstatus == 1))))"
    ));
}

#[test]
fn test_correlated_exists() {
    let code = qb(
        "SELECT u.name FROM tabUser u WHERE NOT EXISTS (SELECT 1 FROM tabNote n WHERE n.owner = u.name)",
    );
    assert!(code.contains("from pypika.terms import ExistsCriterion"));
    assert!(code.contains("from pypika.terms import ValueWrapper"));
    assert!(code.contains(
        ".where(ExistsCriterion(frappe.qb.from_(n).select(ValueWrapper(1)).where(n.owner == u.name)).negate())"
    ), "{code}");
}

#[test]
fn test_unknown_function_leaves_todo() {
    let code = qb("SELECT SOUNDEX(title), COUNT(name) FROM tabNote GROUP BY title");
    let lines: Vec<&str> = code.lines().collect();
    assert_eq!(lines[0], "# TODO: check CustomFunction signature for SOUNDEX");
    assert!(code.contains("from frappe.query_builder import CustomFunction"));
    assert!(code.contains("CustomFunction(\"SOUNDEX\", [\"arg1\"])(note.title)"));
}

#[test]
fn test_datediff_has_known_signature() {
    let code = qb("SELECT DATEDIFF(to_date, from_date), COUNT(name) FROM tabLeave GROUP BY employee");
    assert!(!code.contains("# TODO"));
    assert!(code.contains("CustomFunction(\"DATEDIFF\", [\"end\", \"start\"])(leave.to_date, leave.from_date)"));
}

#[test]
fn test_case_and_alias_ordering() {
    let code = qb(
        "SELECT owner, SUM(CASE WHEN status = 'Open' THEN 1 ELSE 0 END) AS open_count \
         FROM tabIssue GROUP BY owner ORDER BY open_count DESC LIMIT 5",
    );
    assert!(code.contains("from pypika import Case"));
    assert!(code.contains("from frappe.query_builder import Field"));
    assert!(code.contains(
        ".select(issue.owner, fn.Sum(Case().when(issue.status == \"Open\", 1).else_(0)).as_(\"open_count\"))"
    ));
    assert!(code.contains(".orderby(Field(\"open_count\"), order=frappe.qb.desc)"));
    assert!(code.contains(".limit(5)"));
}

#[test]
fn test_union_all_inlines_branch() {
    let code = qb("SELECT name FROM tabA UNION ALL SELECT name FROM tabB");
    assert!(code.contains(".union_all(frappe.qb.from_(b).select(b.name))"));
}

#[test]
fn test_derived_table_is_manual() {
    let msg = unsupported("SELECT t.name FROM (SELECT name FROM tabUser) t");
    assert!(msg.starts_with("Derived table or CTE in FROM"));
}

#[test]
fn test_run_forwards_result_kwargs() {
    let kwargs: ParamMap = [("as_dict".to_string(), ParamValue::var("as_dict"))]
        .into_iter()
        .collect();
    let params: ParamMap = [("owner".to_string(), ParamValue::var("user"))]
        .into_iter()
        .collect();
    let code = qb_with(
        "SELECT owner, COUNT(name) FROM tabNote WHERE owner = %(owner)s GROUP BY owner",
        Some(&params),
        Some(&kwargs),
    )
    .unwrap();
    assert!(code.contains(".where(note.owner == user)"));
    assert!(code.ends_with("\t.run(as_dict=as_dict)\n)"));
}

#[test]
fn test_unresolved_placeholder_propagates() {
    let result = qb_with("SELECT COUNT(name) FROM tabNote WHERE owner = %s", None, None);
    assert_eq!(result, Err(ConvertError::UnresolvedParameter("%s".to_string())));
}

#[test]
fn test_reserved_names() {
    let code = qb("SELECT COUNT(r.star) FROM tabResult r2, tabResult r");
    assert!(code.contains("r2 = frappe.qb.DocType(\"Result\")"));
    assert!(code.contains("fn.Count(r.field(\"star\"))"));

    let code = qb("SELECT COUNT(name) FROM tabResult");
    assert!(code.contains("result_2 = frappe.qb.DocType(\"Result\")"));
}

#[test]
fn test_strip_outer_parens() {
    assert_eq!(strip_outer_parens("(a == b)"), "a == b");
    assert_eq!(strip_outer_parens("(a) & (b)"), "(a) & (b)");
    assert_eq!(strip_outer_parens("(x == \")\")"), "x == \")\"");
    assert_eq!(paren("(a) | (b)"), "((a) | (b))");
}
