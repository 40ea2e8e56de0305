//! sr-convert - code generation for sqlreg
//!
//! Turns a lowered statement into target code: `frappe.get_all(...)` for
//! simple single-table reads, `frappe.qb` chains for everything else the
//! builder can express, and `# MANUAL:` placeholders where neither is safe.
//! [`Validator`] then checks the result against the original statement.

pub mod context;
pub mod delete;
pub mod error;
pub mod insert;
pub mod orm;
pub mod qb;
pub mod router;
pub mod update;
pub mod validate;

pub use context::ConversionContext;
pub use error::{ConvertError, ConvertResult};
pub use router::{route, Route};
pub use validate::Validator;

use sr_core::marker::{comment_out, is_manual_review, manual};
use sr_sql::ParsedQuery;

/// Generated code for one statement. Conversion failures come back as a
/// manual-review placeholder, never as an error.
pub fn generate(query: &ParsedQuery, ctx: &ConversionContext<'_>) -> String {
    let result = match query {
        ParsedQuery::Select(select) => match route(select) {
            Route::Orm => orm::generate_orm(select, ctx).or_else(|err| {
                log::debug!("ORM conversion failed ({err}), falling back to Query Builder");
                qb::generate_select(select, ctx)
            }),
            Route::QueryBuilder => qb::generate_select(select, ctx),
        },
        ParsedQuery::Insert(insert) => Ok(insert::generate_insert(insert, ctx)),
        ParsedQuery::Update(update) => update::generate_update(update, ctx),
        ParsedQuery::Delete(delete) => delete::generate_delete(delete, ctx),
    };
    result.unwrap_or_else(|err| match err {
        ConvertError::UnresolvedParameter(param) => manual(format!(
            "Could not resolve parameter {param} - needs manual conversion"
        )),
        other => manual(other.to_string()),
    })
}

/// Outcome of converting and validating one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub code: String,
    /// Generated code matched the original's structure.
    pub validated: bool,
    pub notes: Option<String>,
}

/// Generation plus validation, holding the Python parser between calls.
pub struct Converter {
    validator: Validator,
}

impl Converter {
    pub fn new(table_prefix: impl Into<String>) -> ConvertResult<Self> {
        Ok(Self {
            validator: Validator::new(table_prefix)?,
        })
    }

    pub fn convert(&mut self, query: &ParsedQuery, ctx: &ConversionContext<'_>) -> Conversion {
        let code = generate(query, ctx);
        if is_manual_review(&code) {
            return Conversion {
                code,
                validated: false,
                notes: None,
            };
        }
        match self.validator.validate(query, &code) {
            Ok(()) => Conversion {
                code,
                validated: true,
                notes: None,
            },
            Err(reason) => {
                log::debug!("validation failed: {reason}");
                Conversion {
                    code: format!(
                        "{}\n# Generated (unvalidated):\n{}",
                        manual(format!("Validation failed - {reason}")),
                        comment_out(&code)
                    ),
                    validated: false,
                    notes: Some(format!("Validation failed: {reason}")),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
