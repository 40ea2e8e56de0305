//! Error types for sr-convert

use thiserror::Error;

/// Conversion errors.
///
/// `UnresolvedParameter` and `Unsupported` are internal signals: the
/// dispatcher turns them into manual-review markers and they never leave
/// [`crate::generate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Unresolved parameter {0}")]
    UnresolvedParameter(String),

    #[error("{0}")]
    Unsupported(String),

    /// Python grammar could not be loaded (V001)
    #[error("[V001] Failed to load Python grammar: {0}")]
    Grammar(String),
}

impl ConvertError {
    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        ConvertError::Unsupported(message.into())
    }
}

/// Result type alias for ConvertError
pub type ConvertResult<T> = Result<T, ConvertError>;
