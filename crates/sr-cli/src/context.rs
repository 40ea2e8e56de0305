//! Runtime context for CLI commands

use anyhow::{Context, Result};
use sr_core::Config;
use sr_registry::Registry;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;
use crate::style::Style;

/// Resolved directory, configuration and output style.
pub(crate) struct CommandContext {
    pub root: PathBuf,
    pub config: Config,
    pub registry_path: PathBuf,
    pub style: Style,
}

impl CommandContext {
    pub(crate) fn new(args: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&args.directory);
        if !root.is_dir() {
            anyhow::bail!("Directory not found: {}", root.display());
        }

        let config = match &args.config {
            Some(path) => Config::load(Path::new(path))
                .with_context(|| format!("Failed to load configuration file {path}"))?,
            None => Config::load_from_dir(&root).context("Failed to load configuration")?,
        };

        let registry_path = match &args.registry {
            Some(path) => PathBuf::from(path),
            None => root.join(&config.registry),
        };

        log::debug!(
            "Using registry {} ({} dialect, pattern {})",
            registry_path.display(),
            config.dialect.as_str(),
            config.scan.pattern
        );

        Ok(Self {
            root,
            config,
            registry_path,
            style: Style::new(args.no_color),
        })
    }

    pub(crate) fn open_registry(&self) -> Result<Registry> {
        Registry::open(&self.registry_path, &self.config).with_context(|| {
            format!("Failed to open registry {}", self.registry_path.display())
        })
    }
}
