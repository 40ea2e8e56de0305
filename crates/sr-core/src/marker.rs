//! Comment markers written into generated code.

/// Leading marker of every manual-review placeholder.
pub const MANUAL_PREFIX: &str = "# MANUAL:";

/// Marker for generated code that still carries a follow-up note.
pub const TODO_PREFIX: &str = "# TODO";

/// Generated code stored when the SQL text could not be parsed.
pub const UNPARSABLE_PREFIX: &str = "# Could not parse SQL";

/// Build a manual-review placeholder.
pub fn manual(reason: impl AsRef<str>) -> String {
    format!("{MANUAL_PREFIX} {}", reason.as_ref())
}

/// Build the placeholder stored for unparsable SQL.
pub fn unparsable(detail: impl AsRef<str>) -> String {
    let detail = detail.as_ref();
    if detail.is_empty() {
        UNPARSABLE_PREFIX.to_string()
    } else {
        format!("{UNPARSABLE_PREFIX}: {detail}")
    }
}

/// Whether the code is a placeholder rather than something executable.
pub fn is_manual_review(code: &str) -> bool {
    let first = code.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    first.starts_with(MANUAL_PREFIX) || first.starts_with(UNPARSABLE_PREFIX)
}

/// Prefix every line with `# ` so a failed attempt stays visible but inert.
pub fn comment_out(code: &str) -> String {
    code.lines()
        .map(|line| {
            if line.is_empty() {
                "#".to_string()
            } else {
                format!("# {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
