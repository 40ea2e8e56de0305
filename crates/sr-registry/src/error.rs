//! Error types for sr-registry

use sr_convert::ConvertError;
use sr_scan::ScanError;
use thiserror::Error;

/// Registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    /// R001: IO error with file path context
    #[error("[R001] Failed to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// R002: Registry could not be serialized
    #[error("[R002] Registry serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// R003: Scanner failure that aborts a whole scan
    #[error("[R003] {0}")]
    Scan(#[from] ScanError),

    /// R004: Converter could not be constructed
    #[error("[R004] {0}")]
    Convert(#[from] ConvertError),

    /// R005: No call matches an id prefix
    #[error("[R005] No call found with id starting with '{0}'")]
    NotFound(String),

    /// R006: Several calls match an id prefix
    #[error("[R006] Id prefix '{prefix}' is ambiguous ({count} matches)")]
    Ambiguous { prefix: String, count: usize },
}

/// Result type alias for RegistryError
pub type RegistryResult<T> = Result<T, RegistryError>;
