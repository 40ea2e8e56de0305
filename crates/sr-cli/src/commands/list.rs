//! List, orm, todos and manual command implementations

use anyhow::Result;
use sr_core::marker::TODO_PREFIX;
use sr_core::{ConversionStatus, SqlCall};
use std::path::Path;

use crate::cli::ListArgs;
use crate::context::CommandContext;
use crate::style::Style;

const RULE_WIDTH: usize = 80;
const ID_WIDTH: usize = 8;

/// Execute the list command
pub(crate) fn execute(args: &ListArgs, ctx: &CommandContext) -> Result<()> {
    let registry = ctx.open_registry()?;
    if registry.is_empty() {
        println!("No SQL calls found in registry.");
        return Ok(());
    }

    let calls = sorted(registry.calls().filter(|c| {
        args.file_filter
            .as_deref()
            .is_none_or(|filter| c.file_path.contains(filter))
    }));

    println!("\nFound {} SQL calls:", calls.len());
    println!("{}", "=".repeat(RULE_WIDTH));
    for call in calls {
        print_header(call, ctx.style);
        println!("   Status: {}", ctx.style.status(call.status()));
        println!("   SQL: {}", call.sql_preview(100));
    }
    Ok(())
}

/// Execute the orm command
pub(crate) fn execute_orm(ctx: &CommandContext) -> Result<()> {
    let registry = ctx.open_registry()?;
    let calls = sorted(registry.with_status(ConversionStatus::Orm));
    if calls.is_empty() {
        println!("No ORM-eligible calls found.");
        return Ok(());
    }

    println!(
        "\n{}",
        ctx.style.heading(&format!(
            "💡 Found {} calls that can use simple ORM (frappe.get_all):",
            calls.len()
        ))
    );
    println!("{}", "=".repeat(RULE_WIDTH));
    for call in calls {
        print_header(call, ctx.style);
        println!("   SQL: {}", call.sql_preview(RULE_WIDTH));
    }
    Ok(())
}

/// Execute the todos command
pub(crate) fn execute_todos(ctx: &CommandContext) -> Result<()> {
    let registry = ctx.open_registry()?;
    let calls = sorted(registry.with_status(ConversionStatus::HasTodo));
    if calls.is_empty() {
        println!("{}", ctx.style.success("✅ No TODOs found - all conversions complete!"));
        return Ok(());
    }

    println!(
        "\n{}",
        ctx.style
            .warning(&format!("⚠️  Found {} calls with TODOs:", calls.len()))
    );
    println!("{}", "=".repeat(RULE_WIDTH));
    for call in calls {
        print_header(call, ctx.style);
        for line in call
            .generated_code
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with(TODO_PREFIX))
        {
            println!("   {}", ctx.style.warning(line));
        }
    }
    Ok(())
}

/// Execute the manual command
pub(crate) fn execute_manual(ctx: &CommandContext) -> Result<()> {
    let registry = ctx.open_registry()?;
    let calls = sorted(registry.with_status(ConversionStatus::ManualReview));
    if calls.is_empty() {
        println!("{}", ctx.style.success("No calls need manual conversion."));
        return Ok(());
    }

    println!(
        "\n{}",
        ctx.style
            .error(&format!("🔧 Found {} calls needing manual conversion:", calls.len()))
    );
    println!("{}", "=".repeat(RULE_WIDTH));
    for call in calls {
        print_header(call, ctx.style);
        println!("   Reason: {}", manual_reason(call));
    }
    Ok(())
}

/// Ineligibility reason, else the first line of the placeholder.
pub(crate) fn manual_reason(call: &SqlCall) -> &str {
    call.ineligibility_reason
        .as_deref()
        .or_else(|| call.generated_code.lines().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or("")
}

fn sorted<'a>(calls: impl Iterator<Item = &'a SqlCall>) -> Vec<&'a SqlCall> {
    let mut calls: Vec<&SqlCall> = calls.collect();
    calls.sort_by(|a, b| {
        a.file_path
            .cmp(&b.file_path)
            .then(a.line_number.cmp(&b.line_number))
    });
    calls
}

fn print_header(call: &SqlCall, style: Style) {
    let id: String = call.call_id.chars().take(ID_WIDTH).collect();
    let file_name = Path::new(&call.file_path)
        .file_name()
        .map_or_else(|| call.file_path.clone(), |n| n.to_string_lossy().into_owned());
    println!(
        "\n{}  {}",
        style.id(&id),
        style.dim(&format!("{file_name}:{}", call.line_number))
    );
    println!("   Function: {}", call.function_context);
}
