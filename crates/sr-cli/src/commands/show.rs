//! Show command implementation

use anyhow::Result;
use sr_core::{ConversionStatus, ParamMap, SqlCall};
use sr_registry::RegistryError;

use crate::cli::ShowArgs;
use crate::context::CommandContext;
use crate::style::Style;

const RULE_WIDTH: usize = 60;
const SECTION_WIDTH: usize = 40;

/// Execute the show command
pub(crate) fn execute(args: &ShowArgs, ctx: &CommandContext) -> Result<()> {
    let registry = ctx.open_registry()?;
    let call = match registry.find_by_prefix(&args.call_id) {
        Ok(call) => call,
        Err(RegistryError::Ambiguous { .. }) => {
            eprintln!(
                "Multiple calls match '{}'. Please be more specific:",
                args.call_id
            );
            for call in registry.calls().filter(|c| c.call_id.starts_with(&args.call_id)) {
                eprintln!("  {} - {}:{}", call.call_id, call.file_path, call.line_number);
            }
            anyhow::bail!("Ambiguous call id prefix '{}'", args.call_id);
        }
        Err(e) => return Err(e.into()),
    };

    print_call(call, ctx.style);
    Ok(())
}

fn print_call(call: &SqlCall, style: Style) {
    println!("\n{}", style.heading(&format!("SQL Call Details: {}", call.call_id)));
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("File: {}", call.file_path);
    println!("Line: {}", call.line_number);
    println!("Function: {}", call.function_context);
    println!("Consumption: {}", call.consumption);
    println!("Status: {}", style.status(call.status()));
    println!("Eligible: {}", call.conversion_eligible);
    println!("Validated: {}", call.conversion_validated);
    println!("Created: {}", call.created_at.to_rfc3339());
    println!("Updated: {}", call.updated_at.to_rfc3339());

    if let Some(params) = &call.sql_params {
        print_bindings("SQL Parameters", params, style);
    }
    if let Some(kwargs) = &call.sql_kwargs {
        print_bindings("SQL Kwargs", kwargs, style);
    }

    section("Original SQL", style);
    println!("{}", call.sql_query);

    section("Parsed SQL", style);
    println!("{}", call.parsed_sql);

    section("Query Builder Equivalent", style);
    match call.status() {
        ConversionStatus::ManualReview => println!(
            "{}",
            style.error("🔧 [MANUAL REVIEW REQUIRED] needs manual conversion")
        ),
        ConversionStatus::Orm => println!(
            "{}",
            style.success("💡 [ORM-ELIGIBLE] Can use frappe.get_all instead of frappe.db.sql")
        ),
        ConversionStatus::HasTodo => {
            println!("{}", style.warning("⚠️  [HAS TODO] Needs manual review"))
        }
        ConversionStatus::QueryBuilder => {}
    }
    println!("{}", call.generated_code);

    if let Some(reason) = &call.ineligibility_reason {
        section("Ineligible", style);
        println!("{reason}");
    }
    if let Some(notes) = &call.notes {
        section("Notes", style);
        println!("{notes}");
    }
}

fn print_bindings(title: &str, bindings: &ParamMap, style: Style) {
    section(title, style);
    for (key, value) in bindings {
        println!("  {key}: {}", value.to_python());
    }
}

fn section(title: &str, style: Style) {
    println!("\n{}", style.heading(&format!("{title}:")));
    println!("{}", "-".repeat(SECTION_WIDTH));
}
