//! Structural fingerprints and their comparison.
//!
//! The SQL side is built here from the IR. The target-code side is extracted
//! independently by the validator and compared with [`compare`].

use crate::ir::{Literal, ParsedQuery, QueryType, SqlExpr};
use sr_core::EntityName;
use std::collections::BTreeSet;
use std::fmt;

/// A LIMIT as far as it can be known statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitValue {
    Fixed(u64),
    /// Bound at runtime; matches any present limit.
    Dynamic,
}

impl LimitValue {
    pub fn from_expr(expr: &SqlExpr) -> Self {
        match expr.unnested() {
            SqlExpr::Literal(Literal::Number(n)) => {
                n.parse().map(LimitValue::Fixed).unwrap_or(LimitValue::Dynamic)
            }
            _ => LimitValue::Dynamic,
        }
    }

    /// Parse a generated-code limit argument.
    pub fn from_source(text: &str) -> Self {
        text.trim()
            .parse()
            .map(LimitValue::Fixed)
            .unwrap_or(LimitValue::Dynamic)
    }
}

impl fmt::Display for LimitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitValue::Fixed(n) => write!(f, "{n}"),
            LimitValue::Dynamic => f.write_str("<dynamic>"),
        }
    }
}

/// Flattened shape of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralFingerprint {
    pub query_type: QueryType,
    /// Lowercased entity names.
    pub tables: BTreeSet<String>,
    pub field_count: usize,
    pub wildcard: bool,
    pub joins: usize,
    pub has_where: bool,
    pub has_group_by: bool,
    pub has_order_by: bool,
    pub limit: Option<LimitValue>,
    pub has_aggregation: bool,
}

impl StructuralFingerprint {
    pub fn empty(query_type: QueryType) -> Self {
        Self {
            query_type,
            tables: BTreeSet::new(),
            field_count: 0,
            wildcard: false,
            joins: 0,
            has_where: false,
            has_group_by: false,
            has_order_by: false,
            limit: None,
            has_aggregation: false,
        }
    }

    /// Fingerprint of the original statement.
    pub fn from_query(query: &ParsedQuery, table_prefix: &str) -> Self {
        let mut fp = Self::empty(query.query_type());
        fp.tables = query
            .target_tables()
            .into_iter()
            .map(|t| EntityName::from_table(&t.name, table_prefix).normalized())
            .collect();

        match query {
            ParsedQuery::Select(select) => {
                fp.field_count = select.projection.len();
                fp.wildcard = select.has_wildcard();
                fp.joins = select.joins.len();
                fp.has_where = select.selection.is_some();
                fp.has_group_by = !select.group_by.is_empty();
                fp.has_order_by = !select.order_by.is_empty();
                fp.limit = select.limit.as_ref().map(LimitValue::from_expr);
                fp.has_aggregation = select.has_aggregate_projection();
            }
            ParsedQuery::Update(update) => {
                fp.field_count = update.assignments.len();
                fp.has_where = update.selection.is_some();
            }
            ParsedQuery::Delete(delete) => {
                fp.has_where = delete.selection.is_some();
            }
            ParsedQuery::Insert(insert) => {
                fp.field_count = insert.columns.len();
            }
        }
        fp
    }
}

/// Compare an original fingerprint against a generated one.
///
/// Every violated dimension contributes one message; they are joined with
/// `"; "`.
pub fn compare(
    original: &StructuralFingerprint,
    generated: &StructuralFingerprint,
) -> Result<(), String> {
    let mut mismatches = Vec::new();

    if original.query_type != generated.query_type {
        mismatches.push(format!(
            "Query type mismatch: {} vs {}",
            original.query_type, generated.query_type
        ));
    }

    if !original.tables.is_subset(&generated.tables) {
        mismatches.push(format!(
            "Table mismatch: {} vs {}",
            render_set(&original.tables),
            render_set(&generated.tables)
        ));
    }

    if original.query_type == QueryType::Select
        && !original.wildcard
        && !generated.wildcard
        && original.field_count != generated.field_count
    {
        mismatches.push(format!(
            "Field count mismatch: {} vs {}",
            original.field_count, generated.field_count
        ));
    }

    if original.has_where != generated.has_where {
        mismatches.push(format!(
            "WHERE clause mismatch: original={}, generated={}",
            python_bool(original.has_where),
            python_bool(generated.has_where)
        ));
    }

    let limits_match = match (original.limit, generated.limit) {
        (None, None) => true,
        (Some(LimitValue::Dynamic), Some(_)) | (Some(_), Some(LimitValue::Dynamic)) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    if !limits_match {
        mismatches.push(format!(
            "LIMIT mismatch: {} vs {}",
            render_limit(original.limit),
            render_limit(generated.limit)
        ));
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(mismatches.join("; "))
    }
}

fn render_set(set: &BTreeSet<String>) -> String {
    let items: Vec<String> = set.iter().map(|t| format!("'{t}'")).collect();
    format!("{{{}}}", items.join(", "))
}

fn render_limit(limit: Option<LimitValue>) -> String {
    limit.map_or_else(|| "None".to_string(), |l| l.to_string())
}

fn python_bool(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

#[cfg(test)]
#[path = "fingerprint_test.rs"]
mod tests;
