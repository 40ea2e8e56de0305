//! The persisted call-site record.

use crate::marker::{MANUAL_PREFIX, TODO_PREFIX, UNPARSABLE_PREFIX};
use crate::param::ParamMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the value returned by the raw SQL call is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", content = "target", rename_all = "snake_case")]
pub enum ConsumptionMode {
    /// `return frappe.db.sql(...)`
    Returned,
    /// `yield frappe.db.sql(...)`
    Yielded,
    /// Assigned to a name or attribute target.
    Assign(String),
    /// Iterated directly by a `for` loop; the loop variable when simple.
    ForTarget(Option<String>),
    /// Bare expression statement.
    Expression,
    /// Anything else.
    #[default]
    Unknown,
}

impl ConsumptionMode {
    /// Text placed before the generated expression.
    pub fn result_prefix(&self) -> String {
        match self {
            ConsumptionMode::Returned => "return ".to_string(),
            ConsumptionMode::Yielded => "yield ".to_string(),
            ConsumptionMode::Assign(target) => format!("{target} = "),
            ConsumptionMode::Expression => String::new(),
            ConsumptionMode::ForTarget(_) | ConsumptionMode::Unknown => "result = ".to_string(),
        }
    }
}

impl fmt::Display for ConsumptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsumptionMode::Returned => f.write_str("returned"),
            ConsumptionMode::Yielded => f.write_str("yielded"),
            ConsumptionMode::Assign(target) => write!(f, "assign ({target})"),
            ConsumptionMode::ForTarget(Some(var)) => write!(f, "for-target ({var})"),
            ConsumptionMode::ForTarget(None) => f.write_str("for-target"),
            ConsumptionMode::Expression => f.write_str("expression"),
            ConsumptionMode::Unknown => f.write_str("unknown"),
        }
    }
}

/// Report bucket derived from generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConversionStatus {
    QueryBuilder,
    Orm,
    ManualReview,
    HasTodo,
}

impl ConversionStatus {
    pub fn classify(code: &str) -> Self {
        if code.contains(MANUAL_PREFIX)
            || code.starts_with(UNPARSABLE_PREFIX)
            || code.starts_with("# Error")
        {
            ConversionStatus::ManualReview
        } else if code.contains("frappe.get_all(") {
            ConversionStatus::Orm
        } else if code.contains(TODO_PREFIX) {
            ConversionStatus::HasTodo
        } else {
            ConversionStatus::QueryBuilder
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            ConversionStatus::QueryBuilder => "✅",
            ConversionStatus::Orm => "💡",
            ConversionStatus::ManualReview => "🔧",
            ConversionStatus::HasTodo => "⚠️",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConversionStatus::QueryBuilder => "Query Builder",
            ConversionStatus::Orm => "ORM-eligible",
            ConversionStatus::ManualReview => "Manual Review",
            ConversionStatus::HasTodo => "Has TODOs",
        }
    }

    pub const ALL: [ConversionStatus; 4] = [
        ConversionStatus::QueryBuilder,
        ConversionStatus::Orm,
        ConversionStatus::ManualReview,
        ConversionStatus::HasTodo,
    ];
}

/// One discovered raw-SQL call site and its conversion result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlCall {
    pub call_id: String,
    pub file_path: String,
    pub line_number: usize,
    /// `def name():` or `global scope`
    pub function_context: String,
    pub sql_query: String,
    #[serde(default)]
    pub sql_params: Option<ParamMap>,
    #[serde(default)]
    pub sql_kwargs: Option<ParamMap>,
    #[serde(default)]
    pub consumption: ConsumptionMode,
    /// Normalized statement text, or `UNPARSABLE` / `INELIGIBLE`.
    pub parsed_sql: String,
    pub semantic_signature: String,
    pub generated_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_eligible")]
    pub conversion_eligible: bool,
    #[serde(default)]
    pub conversion_validated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ineligibility_reason: Option<String>,
}

fn default_eligible() -> bool {
    true
}

impl SqlCall {
    pub fn status(&self) -> ConversionStatus {
        ConversionStatus::classify(&self.generated_code)
    }

    /// First `max` characters of the SQL with whitespace collapsed.
    pub fn sql_preview(&self, max: usize) -> String {
        let flat = self.sql_query.split_whitespace().collect::<Vec<_>>().join(" ");
        if flat.chars().count() > max {
            let head: String = flat.chars().take(max).collect();
            format!("{head}...")
        } else {
            flat
        }
    }
}

#[cfg(test)]
#[path = "call_test.rs"]
mod tests;
