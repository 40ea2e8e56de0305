//! Prune command implementation

use anyhow::{Context, Result};

use crate::context::CommandContext;

/// Execute the prune command
pub(crate) fn execute(ctx: &CommandContext) -> Result<()> {
    let mut registry = ctx.open_registry()?;
    let pruned = registry.prune_missing_files(&ctx.root);

    if pruned.is_empty() {
        println!("{}", ctx.style.success("Nothing to prune"));
        return Ok(());
    }

    registry.save().context("Failed to save registry")?;
    println!(
        "{}",
        ctx.style
            .warning(&format!("Pruned {} call(s) from missing files", pruned.len()))
    );
    for id in &pruned {
        println!("  {}", ctx.style.id(id));
    }
    Ok(())
}
