//! Entity (DocType) names derived from physical table names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Logical entity name, e.g. `Sales Invoice` for table `tabSales Invoice`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityName(String);

impl EntityName {
    /// Strip surrounding quotes and the table-naming prefix.
    pub fn from_table(table: &str, prefix: &str) -> Self {
        let bare = table.trim_matches(|c| c == '`' || c == '"' || c == '\'');
        let bare = bare.rsplit('.').next().unwrap_or(bare);
        let bare = bare.trim_matches(|c| c == '`' || c == '"');
        match bare.strip_prefix(prefix) {
            Some(rest) if !prefix.is_empty() && !rest.is_empty() => Self(rest.to_string()),
            _ => Self(bare.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form used when comparing table sets.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// Python variable name for a builder binding of this entity.
    pub fn binding_name(&self) -> String {
        to_binding(&self.0)
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for EntityName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

/// Turn an alias or entity name into a valid Python identifier.
pub fn to_binding(raw: &str) -> String {
    let mut out: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if is_python_keyword(&out) {
        out.push('_');
    }
    out
}

pub fn is_python_keyword(s: &str) -> bool {
    PYTHON_KEYWORDS.contains(&s)
}

/// Whether `s` can be used after a `.` in Python attribute access.
pub fn is_python_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_') && !is_python_keyword(s)
}
