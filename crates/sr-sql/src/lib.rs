//! sr-sql - SQL layer for sqlreg
//!
//! Turns the raw SQL text of a call site into something the converter can
//! work with: placeholders swapped for sentinels, a dialect-aware parse, an
//! owned IR, static eligibility checks and a structural fingerprint.

pub mod dialect;
pub mod eligibility;
pub mod error;
pub mod fingerprint;
pub mod ir;
pub mod lower;
pub mod parser;
pub mod placeholder;
pub mod signature;

pub use dialect::SqlDialect;
pub use eligibility::check_eligibility;
pub use error::{SqlError, SqlResult};
pub use fingerprint::{compare, LimitValue, StructuralFingerprint};
pub use ir::{ParsedQuery, QueryType, SelectQuery, SqlExpr, TableRef};
pub use lower::{analyze, lower_statement, Analysis};
pub use parser::SqlParser;
pub use placeholder::{normalize, NormalizedSql, PlaceholderKind, Substitution};
pub use signature::semantic_signature;
