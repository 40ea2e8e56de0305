//! Error types for sr-core

use thiserror::Error;

/// Core error type for sqlreg
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: Config file could not be read
    #[error("[C003] Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// C004: YAML parse error
    #[error("[C004] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
