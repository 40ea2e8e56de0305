//! Error types for sr-scan

use std::path::PathBuf;
use thiserror::Error;

/// Scanner errors
#[derive(Error, Debug)]
pub enum ScanError {
    /// Grammar could not be loaded (P001)
    #[error("[P001] Failed to load Python grammar: {0}")]
    Language(String),

    /// Source does not parse (P002)
    #[error("[P002] Syntax error in {path} at line {line}")]
    Syntax { path: String, line: usize },

    /// File could not be read (P003)
    #[error("[P003] Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid glob pattern (P004)
    #[error("[P004] Invalid scan pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

/// Result type alias for ScanError
pub type ScanResult<T> = Result<T, ScanError>;
