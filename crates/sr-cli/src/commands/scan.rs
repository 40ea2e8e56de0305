//! Scan command implementation

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sr_scan::relative_path;

use crate::context::CommandContext;

/// Execute the scan command
pub(crate) fn execute(ctx: &CommandContext) -> Result<()> {
    let style = ctx.style;
    let mut registry = ctx.open_registry()?;

    println!("{}", style.dim("Scanning for SQL operations..."));

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    let summary = registry
        .scan_directory(&ctx.root, &ctx.config, |path, total| {
            pb.set_length(total as u64);
            pb.set_message(relative_path(&ctx.root, path));
            pb.inc(1);
        })
        .context("Failed to scan directory")?;
    pb.finish_and_clear();

    registry.save().context("Failed to save registry")?;

    println!(
        "{}",
        style.success(&format!(
            "Found and registered {} SQL operations ({} new)",
            summary.calls_found, summary.new_calls
        ))
    );
    if summary.files_skipped > 0 {
        println!(
            "{}",
            style.warning(&format!(
                "Skipped {} file(s) that could not be parsed",
                summary.files_skipped
            ))
        );
    }
    println!(
        "{} {}",
        style.dim("Registry:"),
        registry.path().display()
    );
    Ok(())
}
