//! Cheap static preconditions checked before any conversion work.

use crate::ir::ParsedQuery;
use crate::placeholder::{contains_sentinel, NormalizedSql, PlaceholderKind};
use regex::Regex;
use sr_core::{positional_key, ParamMap};
use std::sync::OnceLock;

fn call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w\s*\(").expect("valid regex"))
}

fn operator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\[\]()+=\-*/]").expect("valid regex"))
}

/// Decide whether a call can be converted at all.
///
/// The error string is stored verbatim as the ineligibility reason.
/// `query` is `None` when the SQL did not parse; the dynamic-table check is
/// then skipped and the parse failure is reported separately.
pub fn check_eligibility(
    normalized: &NormalizedSql,
    query: Option<&ParsedQuery>,
    params: Option<&ParamMap>,
) -> Result<(), String> {
    for sub in normalized.interpolations() {
        if let PlaceholderKind::Interpolation(inner) = &sub.kind {
            if call_re().is_match(inner) {
                return Err(format!("Function call in f-string block: {}", sub.original));
            }
            if operator_re().is_match(inner) {
                return Err(format!(
                    "Complex expression in f-string block: {}",
                    sub.original
                ));
            }
        }
    }

    let named = normalized.named();
    if !named.is_empty() {
        let Some(params) = params else {
            return Err(format!(
                "Named parameters {} used but no params dict provided",
                python_list(&named)
            ));
        };
        let missing: Vec<&str> = named
            .iter()
            .copied()
            .filter(|name| !params.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(format!(
                "Named parameters {} not found in params dict",
                python_list(&missing)
            ));
        }
    }

    let positional = normalized.positional_count();
    if positional > 0 {
        let Some(params) = params else {
            return Err(format!(
                "{positional} positional parameter(s) used but no params provided"
            ));
        };
        let provided = (0..positional)
            .filter(|i| params.contains_key(&positional_key(*i)))
            .count();
        if provided < positional {
            return Err(format!(
                "{positional} positional parameter(s) needed but only {provided} provided"
            ));
        }
    }

    if let Some(query) = query {
        if let Some(table) = query
            .target_tables()
            .into_iter()
            .find(|t| contains_sentinel(&t.name))
        {
            let shown = normalized
                .substitutions
                .iter()
                .find(|s| table.name.contains(&s.token))
                .map(|s| s.original.as_str())
                .unwrap_or(table.name.as_str());
            return Err(format!("Dynamic table name: {shown}"));
        }
    }

    Ok(())
}

fn python_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{s}'")).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
#[path = "eligibility_test.rs"]
mod tests;
