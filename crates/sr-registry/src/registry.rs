//! The registry: persisted call sites plus the analysis pipeline.

use crate::error::{RegistryError, RegistryResult};
use crate::git;
use crate::pipeline::Analyzer;
use crate::store::{resolve_path, RegistryData};
use chrono::Utc;
use sr_core::{call_id, Config, ConversionStatus, SqlCall};
use sr_scan::{discover_files, relative_path, CallScanner, CallSite};
use sr_sql::SqlParser;
use std::path::{Path, PathBuf};

/// Totals from one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub calls_found: usize,
    pub new_calls: usize,
}

pub struct Registry {
    path: PathBuf,
    data: RegistryData,
    analyzer: Analyzer,
}

impl Registry {
    /// Open (or start) the registry at `path`.
    pub fn open(path: &Path, config: &Config) -> RegistryResult<Self> {
        let path = resolve_path(path);
        let data = RegistryData::load(&path)?;
        log::debug!(
            "Loaded {} calls from {}",
            data.calls.len(),
            path.display()
        );
        Ok(Self {
            path,
            data,
            analyzer: Analyzer::new(SqlParser::for_dialect(config.dialect), &config.table_prefix)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &RegistryData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.calls.is_empty()
    }

    pub fn calls(&self) -> impl Iterator<Item = &SqlCall> {
        self.data.calls.values()
    }

    pub fn get(&self, call_id: &str) -> Option<&SqlCall> {
        self.data.calls.get(call_id)
    }

    /// Calls in a given report bucket.
    pub fn with_status(&self, status: ConversionStatus) -> impl Iterator<Item = &SqlCall> {
        self.calls().filter(move |c| c.status() == status)
    }

    /// The single call whose id starts with `prefix`.
    pub fn find_by_prefix(&self, prefix: &str) -> RegistryResult<&SqlCall> {
        let mut matches = self
            .data
            .calls
            .range(prefix.to_string()..)
            .take_while(|(id, _)| id.starts_with(prefix))
            .map(|(_, call)| call);
        match (matches.next(), matches.next()) {
            (Some(call), None) => Ok(call),
            (None, _) => Err(RegistryError::NotFound(prefix.to_string())),
            (Some(_), Some(_)) => Err(RegistryError::Ambiguous {
                prefix: prefix.to_string(),
                count: 2 + matches.count(),
            }),
        }
    }

    /// Record a call site and return its id.
    ///
    /// A known id only refreshes the SQL text, bindings, consumption mode and
    /// timestamp; analysis runs once per id.
    pub fn register(&mut self, site: CallSite) -> String {
        let id = call_id(&site.file_path, site.line_number, &site.sql);
        let now = Utc::now();

        if let Some(existing) = self.data.calls.get_mut(&id) {
            existing.updated_at = now;
            existing.sql_query = site.sql;
            existing.sql_params = site.params;
            existing.sql_kwargs = site.kwargs;
            existing.consumption = site.consumption;
            return id;
        }

        let outcome = self.analyzer.analyze(
            &site.sql,
            site.params.as_ref(),
            site.kwargs.as_ref(),
            &site.consumption,
        );
        log::debug!(
            "{}:{} registered as {id} ({})",
            site.file_path,
            site.line_number,
            ConversionStatus::classify(&outcome.generated_code).label()
        );
        self.data.calls.insert(
            id.clone(),
            SqlCall {
                call_id: id.clone(),
                file_path: site.file_path,
                line_number: site.line_number,
                function_context: site.function_context,
                sql_query: site.sql,
                sql_params: site.params,
                sql_kwargs: site.kwargs,
                consumption: site.consumption,
                parsed_sql: outcome.parsed_sql,
                semantic_signature: outcome.semantic_signature,
                generated_code: outcome.generated_code,
                notes: outcome.notes,
                created_at: now,
                updated_at: now,
                conversion_eligible: outcome.eligible,
                conversion_validated: outcome.validated,
                ineligibility_reason: outcome.ineligibility_reason,
            },
        );
        id
    }

    /// Scan `files` (all under `root`) and register every call found.
    ///
    /// Files that fail to read or parse are logged and skipped. `on_file`
    /// runs after each file, for progress reporting.
    pub fn scan_files(
        &mut self,
        root: &Path,
        files: &[PathBuf],
        scanner: &mut CallScanner,
        mut on_file: impl FnMut(&Path),
    ) -> ScanSummary {
        let mut summary = ScanSummary::default();
        for file in files {
            let display = relative_path(root, file);
            match scanner.scan_file(file, &display) {
                Ok(sites) => {
                    summary.files_scanned += 1;
                    for site in sites {
                        let before = self.len();
                        self.register(site);
                        summary.calls_found += 1;
                        summary.new_calls += self.len() - before;
                    }
                }
                Err(e) => {
                    log::warn!("Skipping {display}: {e}");
                    summary.files_skipped += 1;
                }
            }
            on_file(file);
        }
        self.data.metadata.last_scan = Some(Utc::now());
        self.data.metadata.repository = git::repository_name(root);
        log::info!(
            "Scanned {} files ({} skipped): {} calls, {} new",
            summary.files_scanned,
            summary.files_skipped,
            summary.calls_found,
            summary.new_calls
        );
        summary
    }

    /// Discover files under `root` with the configured pattern and scan them.
    ///
    /// `on_file` receives each scanned path and the number of files found.
    pub fn scan_directory(
        &mut self,
        root: &Path,
        config: &Config,
        mut on_file: impl FnMut(&Path, usize),
    ) -> RegistryResult<ScanSummary> {
        let files = discover_files(root, &config.scan)?;
        log::debug!("Discovered {} files under {}", files.len(), root.display());
        let mut scanner = CallScanner::new(config.callee.clone())?;
        let total = files.len();
        Ok(self.scan_files(root, &files, &mut scanner, |path| on_file(path, total)))
    }

    /// Drop calls whose source file no longer exists under `root`.
    pub fn prune_missing_files(&mut self, root: &Path) -> Vec<String> {
        let missing: Vec<String> = self
            .data
            .calls
            .values()
            .filter(|call| !root.join(&call.file_path).exists())
            .map(|call| call.call_id.clone())
            .collect();
        for id in &missing {
            if let Some(call) = self.data.calls.remove(id) {
                log::info!("Pruned {id} ({}:{})", call.file_path, call.line_number);
            }
        }
        missing
    }

    /// Persist to the registry path, refreshing the header.
    pub fn save(&mut self) -> RegistryResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        self.data.metadata.total_calls = self.data.calls.len();
        self.data.metadata.commit_hash = git::commit_hash(dir);
        self.data.save(&self.path)
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
