//! Configuration types and parsing for sqlreg.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file names looked up in a scan directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["sqlreg.yml", "sqlreg.yaml"];

/// Project configuration from sqlreg.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Registry file, relative to the scan directory
    #[serde(default = "default_registry")]
    pub registry: String,

    /// Source discovery settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Shape of the call expression that marks a raw SQL call site
    #[serde(default)]
    pub callee: CalleeShape,

    /// SQL dialect used to parse extracted queries
    #[serde(default)]
    pub dialect: Dialect,

    /// Prefix stripped from physical table names to get entity names
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,
}

/// Source discovery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Glob pattern, relative to the scan directory
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Scan files under `patches/` or `patch/` directories
    #[serde(default)]
    pub include_patches: bool,
}

/// `<namespace>.<attribute>.<method>(...)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalleeShape {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_attribute")]
    pub attribute: String,
    #[serde(default = "default_method")]
    pub method: String,
}

/// SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL / MariaDB
    #[default]
    Mysql,
    /// PostgreSQL
    Postgres,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgres => "postgres",
        }
    }
}

fn default_registry() -> String {
    ".sql_registry.json".to_string()
}

fn default_pattern() -> String {
    "**/*.py".to_string()
}

fn default_table_prefix() -> String {
    "tab".to_string()
}

fn default_namespace() -> String {
    "frappe".to_string()
}

fn default_attribute() -> String {
    "db".to_string()
}

fn default_method() -> String {
    "sql".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            scan: ScanConfig::default(),
            callee: CalleeShape::default(),
            dialect: Dialect::default(),
            table_prefix: default_table_prefix(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            include_patches: false,
        }
    }
}

impl Default for CalleeShape {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            attribute: default_attribute(),
            method: default_method(),
        }
    }
}

impl std::fmt::Display for CalleeShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.namespace, self.attribute, self.method)
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load sqlreg.yml (or .yaml) from `dir`, falling back to defaults
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    fn validate(&self) -> CoreResult<()> {
        if self.registry.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "registry path cannot be empty".to_string(),
            });
        }
        if self.scan.pattern.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "scan.pattern cannot be empty".to_string(),
            });
        }
        let parts = [
            ("callee.namespace", &self.callee.namespace),
            ("callee.attribute", &self.callee.attribute),
            ("callee.method", &self.callee.method),
        ];
        for (field, value) in parts {
            if value.is_empty() || !value.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(CoreError::ConfigInvalid {
                    message: format!("{field} must be a plain identifier, got '{value}'"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
