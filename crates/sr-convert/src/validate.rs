//! Structural validation of generated code against the original SQL.
//!
//! The generated Python is parsed with tree-sitter and reduced to the same
//! [`StructuralFingerprint`] the SQL side produces, using recognition rules
//! for ORM calls, `frappe.db` helpers and builder method chains.

use crate::error::{ConvertError, ConvertResult};
use sr_core::marker::is_manual_review;
use sr_sql::{compare, LimitValue, ParsedQuery, QueryType, StructuralFingerprint};
use tree_sitter::{Node, Parser};

const ORM_QUERIES: &[&str] = &["get_all", "get_list", "get_value"];

pub struct Validator {
    parser: Parser,
    table_prefix: String,
}

impl Validator {
    pub fn new(table_prefix: impl Into<String>) -> ConvertResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ConvertError::Grammar(e.to_string()))?;
        Ok(Self {
            parser,
            table_prefix: table_prefix.into(),
        })
    }

    /// `Ok(())` when `code` is structurally equivalent to `original`, else
    /// the mismatch reason. Manual-review placeholders always pass.
    pub fn validate(&mut self, original: &ParsedQuery, code: &str) -> Result<(), String> {
        if is_manual_review(code) {
            return Ok(());
        }
        let expected = StructuralFingerprint::from_query(original, &self.table_prefix);
        let generated = self.fingerprint(code)?;
        compare(&expected, &generated)
    }

    /// Fingerprint of generated Python code.
    pub fn fingerprint(&mut self, code: &str) -> Result<StructuralFingerprint, String> {
        let tree = self
            .parser
            .parse(code, None)
            .ok_or_else(|| "Could not parse generated code".to_string())?;
        let root = tree.root_node();
        if root.has_error() {
            return Err("Could not parse generated code".to_string());
        }

        let mut shape = Shape::default();
        let source = code.as_bytes();
        visit(root, &mut |node| {
            if node.kind() == "call" && !is_nested_argument(node) {
                shape.record(node, source);
            }
        });
        shape.finish()
    }
}

/// Query facts collected from top-level calls.
#[derive(Default)]
struct Shape {
    fingerprint: Option<StructuralFingerprint>,
    select: bool,
    update: bool,
    delete: bool,
}

impl Shape {
    fn fp(&mut self) -> &mut StructuralFingerprint {
        self.fingerprint
            .get_or_insert_with(|| StructuralFingerprint::empty(QueryType::Select))
    }

    fn record(&mut self, call: Node<'_>, source: &[u8]) {
        let Some(function) = call.child_by_field_name("function") else {
            return;
        };
        let Some(args) = call.child_by_field_name("arguments") else {
            return;
        };
        let (object, method) = match function.kind() {
            "attribute" => (
                function
                    .child_by_field_name("object")
                    .map(|o| text(o, source))
                    .unwrap_or_default(),
                function
                    .child_by_field_name("attribute")
                    .map(|a| text(a, source))
                    .unwrap_or_default(),
            ),
            "identifier" => ("", text(function, source)),
            _ => return,
        };
        let positional = positional_args(args);

        match (object, method) {
            (_, "DocType") => {
                if let Some(table) = positional.first().and_then(|n| string(*n, source)) {
                    self.fp().tables.insert(table.to_lowercase());
                }
            }
            ("frappe" | "frappe.db", m) if ORM_QUERIES.contains(&m) => {
                self.select = true;
                if let Some(table) = positional.first().and_then(|n| string(*n, source)) {
                    self.fp().tables.insert(table.to_lowercase());
                }
                for (name, value) in keyword_args(args, source) {
                    match name {
                        "fields" => self.count_fields(value, source),
                        "filters" => self.fp().has_where = true,
                        "limit" | "limit_page_length" => {
                            self.fp().limit = Some(LimitValue::from_source(text(value, source)))
                        }
                        "order_by" => self.fp().has_order_by = true,
                        "group_by" => self.fp().has_group_by = true,
                        _ => {}
                    }
                }
                if let Some(fields) = positional.get(1) {
                    if method == "get_value" {
                        self.count_fields(*fields, source);
                    }
                }
            }
            ("frappe.db", "delete") => {
                self.delete = true;
                if let Some(table) = positional.first().and_then(|n| string(*n, source)) {
                    self.fp().tables.insert(table.to_lowercase());
                }
                if positional.len() >= 2 || keyword_args(args, source).any(|(k, _)| k == "filters")
                {
                    self.fp().has_where = true;
                }
            }
            ("frappe.db", "set_value") => {
                self.update = true;
                if let Some(table) = positional.first().and_then(|n| string(*n, source)) {
                    self.fp().tables.insert(table.to_lowercase());
                }
                if positional.len() >= 2 {
                    self.fp().has_where = true;
                }
                match positional.get(2) {
                    Some(fields) if fields.kind() == "dictionary" => {
                        self.fp().field_count += fields.named_child_count();
                    }
                    Some(_) => self.fp().field_count += 1,
                    None => {}
                }
            }
            ("frappe.qb", "update") => self.update = true,
            ("frappe.qb", "from_") => self.select = true,
            (_, "delete") => self.delete = true,
            (_, "set") => self.fp().field_count += 1,
            (_, "select") => {
                for arg in &positional {
                    let t = text(*arg, source);
                    if t == "\"*\"" || t == "'*'" || t.ends_with(".star") {
                        self.fp().wildcard = true;
                    }
                }
                self.fp().field_count += positional.len();
            }
            (_, "where") => self.fp().has_where = true,
            (_, "groupby") => self.fp().has_group_by = true,
            (_, "orderby") => self.fp().has_order_by = true,
            (_, "limit") => {
                if let Some(limit) = positional.first() {
                    self.fp().limit = Some(LimitValue::from_source(text(*limit, source)));
                }
            }
            (_, "join" | "left_join" | "right_join" | "outer_join" | "cross_join") => {
                self.fp().joins += 1
            }
            _ => {}
        }
    }

    fn count_fields(&mut self, value: Node<'_>, source: &[u8]) {
        match value.kind() {
            "list" | "tuple" => {
                let mut cursor = value.walk();
                let items: Vec<Node<'_>> = value
                    .named_children(&mut cursor)
                    .filter(|n| n.kind() != "comment")
                    .collect();
                if items.iter().any(|n| string(*n, source) == Some("*")) {
                    self.fp().wildcard = true;
                }
                self.fp().field_count += items.len();
            }
            "string" if string(value, source) == Some("*") => self.fp().wildcard = true,
            _ => self.fp().field_count += 1,
        }
    }

    fn finish(mut self) -> Result<StructuralFingerprint, String> {
        let query_type = if self.delete {
            QueryType::Delete
        } else if self.update {
            QueryType::Update
        } else if self.select {
            QueryType::Select
        } else {
            return Err("Generated code contains no recognizable query".to_string());
        };
        let mut fp = self.fp().clone();
        fp.query_type = query_type;
        Ok(fp)
    }
}

/// Calls inside another call's arguments (subqueries, function terms).
fn is_nested_argument(node: Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.kind() == "argument_list" {
            return true;
        }
        current = parent.parent();
    }
    false
}

fn positional_args(args: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = args.walk();
    args.named_children(&mut cursor)
        .filter(|n| !matches!(n.kind(), "keyword_argument" | "comment"))
        .collect()
}

fn keyword_args<'t>(args: Node<'t>, source: &'t [u8]) -> impl Iterator<Item = (&'t str, Node<'t>)> {
    let mut cursor = args.walk();
    let keywords: Vec<Node<'t>> = args
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "keyword_argument")
        .collect();
    keywords.into_iter().filter_map(move |kw| {
        let name = kw.child_by_field_name("name")?;
        let value = kw.child_by_field_name("value")?;
        Some((text(name, source), value))
    })
}

fn text<'s>(node: Node<'_>, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

/// Contents of a plain single-part string literal.
fn string<'s>(node: Node<'_>, source: &'s [u8]) -> Option<&'s str> {
    if node.kind() != "string" {
        return None;
    }
    let t = text(node, source);
    t.strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .or_else(|| t.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')))
}

fn visit<'t>(node: Node<'t>, f: &mut impl FnMut(Node<'t>)) {
    f(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, f);
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
