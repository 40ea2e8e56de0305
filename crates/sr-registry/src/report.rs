//! Markdown report over the registry contents.

use crate::store::RegistryData;
use sr_core::{ConversionStatus, SqlCall};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

const ID_PREFIX: usize = 8;
const FUNCTION_WIDTH: usize = 25;
const SQL_PREVIEW: usize = 50;

/// Render the status report for every registered call.
pub fn generate_report(data: &RegistryData) -> String {
    let calls: Vec<&SqlCall> = data.calls.values().collect();
    let total = calls.len();
    let metadata = &data.metadata;
    let last_scan = metadata
        .last_scan
        .map_or_else(|| "Never".to_string(), |t| t.to_rfc3339());

    let mut md = String::new();
    md.push_str("# SQL Operations Registry Report\n\n");
    md.push_str(&format!("**Repository**: {}\n", metadata.repository));
    md.push_str(&format!("**Last Updated**: {last_scan}\n"));
    md.push_str(&format!("**Commit**: {}\n", metadata.commit_hash));
    md.push_str(&format!("**Total SQL Operations**: {total}\n\n"));

    md.push_str(&status_section(&calls));
    for (path, file_calls) in by_file(&calls) {
        md.push_str(&file_section(path, file_calls));
    }

    let signatures: BTreeSet<&str> = calls.iter().map(|c| c.semantic_signature.as_str()).collect();
    let files: BTreeSet<&str> = calls.iter().map(|c| c.file_path.as_str()).collect();
    md.push_str("\n## Summary\n");
    md.push_str(&format!("- **Files with SQL Operations**: {}\n", files.len()));
    md.push_str(&format!("- **Total Operations Tracked**: {total}\n"));
    md.push_str(&format!("- **Unique Query Patterns**: {}\n", signatures.len()));
    md
}

fn status_section(calls: &[&SqlCall]) -> String {
    let mut counts: BTreeMap<ConversionStatus, usize> = BTreeMap::new();
    for call in calls {
        *counts.entry(call.status()).or_default() += 1;
    }

    let mut md = String::from("## Conversion Status\n");
    md.push_str("| Status | Count | Percentage |\n");
    md.push_str("|--------|-------|------------|\n");
    for status in ConversionStatus::ALL {
        let count = counts.get(&status).copied().unwrap_or(0);
        md.push_str(&format!(
            "| {} {} | {count} | {:.1}% |\n",
            status.glyph(),
            status.label(),
            percentage(count, calls.len())
        ));
    }
    md.push_str("\n**Legend:**\n");
    md.push_str("- ✅ Validated Query Builder conversion ready to apply\n");
    md.push_str("- 💡 Simple query that can use `frappe.get_all()` instead of Query Builder\n");
    md.push_str("- 🔧 Needs manual conversion\n");
    md.push_str("- ⚠️ Conversion has TODO comments requiring attention\n");
    md.push_str("\n## Operations by File\n");
    md
}

/// Calls grouped by file, largest group first.
fn by_file<'a>(calls: &[&'a SqlCall]) -> Vec<(&'a str, Vec<&'a SqlCall>)> {
    let mut groups: BTreeMap<&str, Vec<&SqlCall>> = BTreeMap::new();
    for call in calls {
        groups.entry(call.file_path.as_str()).or_default().push(*call);
    }
    let mut files: Vec<(&str, Vec<&SqlCall>)> = groups.into_iter().collect();
    files.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(b.0)));
    for (_, file_calls) in &mut files {
        file_calls.sort_by_key(|c| c.line_number);
    }
    files
}

fn file_section(path: &str, calls: Vec<&SqlCall>) -> String {
    let name = Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |n| n.to_string_lossy().into_owned());

    let mut md = format!("\n### {name} ({} operations)\n", calls.len());
    md.push_str(&format!("**Path**: `{path}`\n\n"));
    md.push_str("| Call ID | Status | Line | Function | SQL Preview |\n");
    md.push_str("|---------|--------|------|----------|-------------|\n");
    for call in calls {
        let id: String = call.call_id.chars().take(ID_PREFIX).collect();
        let function: String = call.function_context.chars().take(FUNCTION_WIDTH).collect();
        md.push_str(&format!(
            "| `{id}` | {} | {} | {function} | {} |\n",
            call.status().glyph(),
            call.line_number,
            call.sql_preview(SQL_PREVIEW).replace('|', "\\|")
        ));
    }
    md
}

fn percentage(count: usize, total: usize) -> f64 {
    count as f64 * 100.0 / total.max(1) as f64
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
