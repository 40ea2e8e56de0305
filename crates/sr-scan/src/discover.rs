//! Source file discovery.

use crate::error::{ScanError, ScanResult};
use sr_core::ScanConfig;
use std::path::{Component, Path, PathBuf};

/// Files under `root` matching the configured glob, sorted.
///
/// Paths with a `patches` or `patch` directory component are excluded
/// unless `include_patches` is set.
pub fn discover_files(root: &Path, scan: &ScanConfig) -> ScanResult<Vec<PathBuf>> {
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        scan.pattern
    );
    let entries = glob::glob(&pattern).map_err(|e| ScanError::Pattern {
        pattern: scan.pattern.clone(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Skipping unreadable path: {e}");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        if !scan.include_patches && is_patch_path(&relative_path(root, &path)) {
            log::debug!("Skipping patch file {}", path.display());
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// `path` relative to `root` with `/` separators.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::CurDir => None,
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_patch_path(rel: &str) -> bool {
    rel.split('/')
        .any(|part| part == "patches" || part == "patch")
}
