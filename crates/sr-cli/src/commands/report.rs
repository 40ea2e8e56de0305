//! Report command implementation

use anyhow::{Context, Result};
use sr_registry::generate_report;

use crate::cli::ReportArgs;
use crate::context::CommandContext;

/// Execute the report command
pub(crate) fn execute(args: &ReportArgs, ctx: &CommandContext) -> Result<()> {
    let registry = ctx.open_registry()?;
    let report = generate_report(registry.data());

    match &args.output {
        Some(path) => {
            std::fs::write(path, &report)
                .with_context(|| format!("Failed to write report to {path}"))?;
            println!("{}", ctx.style.success(&format!("Report saved to {path}")));
        }
        None => print!("{report}"),
    }
    Ok(())
}
