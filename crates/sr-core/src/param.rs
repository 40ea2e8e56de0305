//! Parameter bindings captured at a call site.
//!
//! A binding is either a literal constant written in the source or a
//! reference to a source-level expression evaluated at runtime. The
//! distinction decides whether generated code quotes the value.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Prefix marking a serialized string as an expression reference.
pub const VAR_REF_TAG: &str = "__varref__:";

/// Placeholder name or positional key mapped to its binding.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// Key used for the `index`th positional `%s` binding.
pub fn positional_key(index: usize) -> String {
    format!("__pos_{index}__")
}

/// A constant written directly in the scanned source.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

impl LiteralValue {
    /// Render as a Python literal.
    pub fn to_python(&self) -> String {
        match self {
            LiteralValue::Str(s) => python_string(s),
            LiteralValue::Int(i) => i.to_string(),
            LiteralValue::Float(f) => {
                let s = f.to_string();
                if s.contains(['.', 'e', 'E']) || !f.is_finite() {
                    s
                } else {
                    format!("{s}.0")
                }
            }
            LiteralValue::Bool(true) => "True".to_string(),
            LiteralValue::Bool(false) => "False".to_string(),
            LiteralValue::None => "None".to_string(),
        }
    }

    /// Python truthiness, used for keyword flags such as `as_dict=1`.
    pub fn is_truthy(&self) -> bool {
        match self {
            LiteralValue::Str(s) => !s.is_empty(),
            LiteralValue::Int(i) => *i != 0,
            LiteralValue::Float(f) => *f != 0.0,
            LiteralValue::Bool(b) => *b,
            LiteralValue::None => false,
        }
    }
}

/// One parameter binding.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Constant value, emitted quoted where needed.
    Literal(LiteralValue),
    /// Source expression such as `filters.owner`, emitted verbatim.
    VarRef(String),
}

impl ParamValue {
    pub fn str(s: impl Into<String>) -> Self {
        ParamValue::Literal(LiteralValue::Str(s.into()))
    }

    pub fn var(expr: impl Into<String>) -> Self {
        ParamValue::VarRef(expr.into())
    }

    /// Python source text for this binding.
    pub fn to_python(&self) -> String {
        match self {
            ParamValue::Literal(lit) => lit.to_python(),
            ParamValue::VarRef(expr) => expr.clone(),
        }
    }

    /// Truthiness when statically known. Expression references are unknown.
    pub fn is_truthy(&self) -> Option<bool> {
        match self {
            ParamValue::Literal(lit) => Some(lit.is_truthy()),
            ParamValue::VarRef(_) => None,
        }
    }
}

/// Double-quoted Python string literal.
pub fn python_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

impl Serialize for ParamValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ParamValue::Literal(LiteralValue::Str(s)) => serializer.serialize_str(s),
            ParamValue::Literal(LiteralValue::Int(i)) => serializer.serialize_i64(*i),
            ParamValue::Literal(LiteralValue::Float(f)) => serializer.serialize_f64(*f),
            ParamValue::Literal(LiteralValue::Bool(b)) => serializer.serialize_bool(*b),
            ParamValue::Literal(LiteralValue::None) => serializer.serialize_none(),
            ParamValue::VarRef(expr) => serializer.serialize_str(&format!("{VAR_REF_TAG}{expr}")),
        }
    }
}

struct ParamValueVisitor;

impl<'de> Visitor<'de> for ParamValueVisitor {
    type Value = ParamValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ParamValue, E> {
        Ok(match v.strip_prefix(VAR_REF_TAG) {
            Some(expr) => ParamValue::VarRef(expr.to_string()),
            None => ParamValue::str(v),
        })
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ParamValue, E> {
        Ok(ParamValue::Literal(LiteralValue::Int(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ParamValue, E> {
        Ok(match i64::try_from(v) {
            Ok(i) => ParamValue::Literal(LiteralValue::Int(i)),
            Err(_) => ParamValue::Literal(LiteralValue::Float(v as f64)),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ParamValue, E> {
        Ok(ParamValue::Literal(LiteralValue::Float(v)))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<ParamValue, E> {
        Ok(ParamValue::Literal(LiteralValue::Bool(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<ParamValue, E> {
        Ok(ParamValue::Literal(LiteralValue::None))
    }

    fn visit_none<E: de::Error>(self) -> Result<ParamValue, E> {
        Ok(ParamValue::Literal(LiteralValue::None))
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ParamValueVisitor)
    }
}

#[cfg(test)]
#[path = "param_test.rs"]
mod tests;
