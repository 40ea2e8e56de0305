//! Placeholder normalization.
//!
//! Driver-style placeholders are not SQL tokens, so each one is swapped for a
//! sentinel identifier (`__PH0__`, `__PH1__`, ...) before parsing. The
//! substitution list lets generators map every sentinel back to its binding.

use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::OnceLock;

/// Prefix shared by every sentinel token.
pub const SENTINEL_PREFIX: &str = "__PH";

fn named_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%\(([^)]+)\)s").expect("valid regex"))
}

fn brace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("valid regex"))
}

fn sentinel_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^__PH\d+__$").expect("valid regex"))
}

fn bare_in_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bIN\s+(__PH\d+__)").expect("valid regex"))
}

/// What a sentinel stood for in the raw SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// `%(name)s`
    Named(String),
    /// `{expr}` with its inner text
    Interpolation(String),
    /// `%s`, numbered from zero in order of appearance
    Positional(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub token: String,
    pub original: String,
    pub kind: PlaceholderKind,
}

/// SQL text with every placeholder replaced by a sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedSql {
    pub sql: String,
    pub substitutions: Vec<Substitution>,
    /// Sentinels used as a whole `IN` list (`IN %(names)s`).
    pub list_tokens: BTreeSet<String>,
}

impl NormalizedSql {
    pub fn lookup(&self, token: &str) -> Option<&Substitution> {
        self.substitutions.iter().find(|s| s.token == token)
    }

    /// Distinct named placeholders, in order of first appearance.
    pub fn named(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for sub in &self.substitutions {
            if let PlaceholderKind::Named(name) = &sub.kind {
                if !seen.contains(&name.as_str()) {
                    seen.push(name.as_str());
                }
            }
        }
        seen
    }

    pub fn positional_count(&self) -> usize {
        self.substitutions
            .iter()
            .filter(|s| matches!(s.kind, PlaceholderKind::Positional(_)))
            .count()
    }

    pub fn interpolations(&self) -> impl Iterator<Item = &Substitution> {
        self.substitutions
            .iter()
            .filter(|s| matches!(s.kind, PlaceholderKind::Interpolation(_)))
    }

    pub fn is_list(&self, token: &str) -> bool {
        self.list_tokens.contains(token)
    }
}

/// Replace named, brace and positional placeholders, in that order.
pub fn normalize(sql: &str) -> NormalizedSql {
    let mut substitutions = Vec::new();
    let mut counter = 0usize;

    let mut next_token = |original: &str, kind: PlaceholderKind, subs: &mut Vec<Substitution>| {
        let token = format!("{SENTINEL_PREFIX}{counter}__");
        counter += 1;
        subs.push(Substitution {
            token: token.clone(),
            original: original.to_string(),
            kind,
        });
        token
    };

    let text = named_re()
        .replace_all(sql, |caps: &Captures| {
            next_token(
                &caps[0],
                PlaceholderKind::Named(caps[1].to_string()),
                &mut substitutions,
            )
        })
        .into_owned();

    let text = brace_re()
        .replace_all(&text, |caps: &Captures| {
            next_token(
                &caps[0],
                PlaceholderKind::Interpolation(caps[1].trim().to_string()),
                &mut substitutions,
            )
        })
        .into_owned();

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (index, span) in positional_spans(&text).into_iter().enumerate() {
        out.push_str(&text[last..span.start]);
        out.push_str(&next_token(
            "%s",
            PlaceholderKind::Positional(index),
            &mut substitutions,
        ));
        last = span.end;
    }
    out.push_str(&text[last..]);

    let mut list_tokens = BTreeSet::new();
    let sql = bare_in_re()
        .replace_all(&out, |caps: &Captures| {
            list_tokens.insert(caps[1].to_string());
            let keyword = &caps[0][..2];
            format!("{keyword} ({})", &caps[1])
        })
        .into_owned();

    NormalizedSql {
        sql,
        substitutions,
        list_tokens,
    }
}

/// Byte ranges of `%s` markers outside quoted literals and not escaped as `%%s`.
pub fn positional_spans(sql: &str) -> Vec<Range<usize>> {
    let bytes = sql.as_bytes();
    let mut spans = Vec::new();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 2;
                    continue;
                }
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'%' if bytes.get(i + 1) == Some(&b'%') => {
                    i += 2;
                    continue;
                }
                b'%' if bytes.get(i + 1) == Some(&b's') => {
                    spans.push(i..i + 2);
                    i += 2;
                    continue;
                }
                _ => {}
            },
        }
        i += 1;
    }
    spans
}

/// Number of positional `%s` markers in raw SQL.
pub fn positional_count(sql: &str) -> usize {
    positional_spans(sql).len()
}

/// Distinct `%(name)s` placeholders in raw SQL, in order of first appearance.
pub fn named_placeholders(sql: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in named_re().captures_iter(sql) {
        let name = caps[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

pub fn is_sentinel(s: &str) -> bool {
    sentinel_re().is_match(s)
}

pub fn contains_sentinel(s: &str) -> bool {
    s.contains(SENTINEL_PREFIX)
}

#[cfg(test)]
#[path = "placeholder_test.rs"]
mod tests;
