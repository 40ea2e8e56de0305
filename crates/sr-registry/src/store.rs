//! On-disk registry format.

use crate::error::{RegistryError, RegistryResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sr_core::SqlCall;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Schema version written into new registries.
pub const SCHEMA_VERSION: &str = "1.0";

/// Registry header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub last_scan: Option<DateTime<Utc>>,
    #[serde(default = "default_repository")]
    pub repository: String,
    #[serde(default)]
    pub total_calls: usize,
    #[serde(default = "default_commit")]
    pub commit_hash: String,
}

fn default_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn default_repository() -> String {
    "unknown/repo".to_string()
}

fn default_commit() -> String {
    "unknown".to_string()
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            version: default_version(),
            last_scan: None,
            repository: default_repository(),
            total_calls: 0,
            commit_hash: default_commit(),
        }
    }
}

/// Whole-file registry contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryData {
    #[serde(default)]
    pub metadata: Metadata,
    /// Calls keyed by call id
    #[serde(default)]
    pub calls: BTreeMap<String, SqlCall>,
}

/// Registry path actually used: a legacy `.pkl` path maps to its `.json`
/// sibling.
pub fn resolve_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "pkl") {
        let json = path.with_extension("json");
        if path.exists() && !json.exists() {
            log::warn!(
                "Legacy binary registry {} is not readable, starting fresh at {}",
                path.display(),
                json.display()
            );
        }
        json
    } else {
        path.to_path_buf()
    }
}

impl RegistryData {
    /// Load a registry. A missing or corrupt file yields an empty registry.
    pub fn load(path: &Path) -> RegistryResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match serde_json::from_str(&content) {
            Ok(data) => Ok(data),
            Err(e) => {
                log::warn!(
                    "Registry {} is corrupt ({e}), starting with an empty registry",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Write the registry atomically (temp file, then rename).
    pub fn save(&self, path: &Path) -> RegistryResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RegistryError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let temp_path = path.with_extension(format!("json.{}.tmp", std::process::id()));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&temp_path, &json).map_err(|source| RegistryError::Io {
            path: temp_path.display().to_string(),
            source,
        })?;
        std::fs::rename(&temp_path, path).map_err(|source| {
            let _ = std::fs::remove_file(&temp_path);
            RegistryError::Io {
                path: path.display().to_string(),
                source,
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
