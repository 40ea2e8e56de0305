//! Python literal decoding on tree-sitter nodes.

use sr_core::{LiteralValue, ParamValue};
use tree_sitter::Node;

/// Source text of a node; empty for non-UTF-8 slices.
pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Value of a plain string literal.
///
/// Returns `None` for f-strings, byte strings and anything that is not a
/// `string` or `concatenated_string` node.
pub fn string_value(node: Node<'_>, source: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => decode_python_string(node_text(node, source)),
        "concatenated_string" => {
            let mut cursor = node.walk();
            let mut out = String::new();
            for part in node.named_children(&mut cursor) {
                if part.kind() == "comment" {
                    continue;
                }
                out.push_str(&string_value(part, source)?);
            }
            Some(out)
        }
        _ => None,
    }
}

/// Decode the source text of a single string literal.
pub fn decode_python_string(text: &str) -> Option<String> {
    let quote_start = text.find(['"', '\''])?;
    let prefix = text[..quote_start].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }
    let raw = prefix.contains('r');

    let rest = &text[quote_start..];
    let quote = if rest.starts_with("\"\"\"") || rest.starts_with("'''") {
        &rest[..3]
    } else {
        &rest[..1]
    };
    if rest.len() < 2 * quote.len() {
        return None;
    }
    let body = rest.strip_prefix(quote)?.strip_suffix(quote)?;
    Some(if raw { body.to_string() } else { unescape(body) })
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Typed value of an argument expression.
///
/// Constants become literals; everything else is captured as a variable
/// reference holding its source text.
pub fn value_from_node(node: Node<'_>, source: &[u8]) -> ParamValue {
    let text = node_text(node, source);
    let literal = match node.kind() {
        "string" | "concatenated_string" => string_value(node, source).map(LiteralValue::Str),
        "integer" => parse_int(text).map(LiteralValue::Int),
        "float" => text.replace('_', "").parse().ok().map(LiteralValue::Float),
        "true" => Some(LiteralValue::Bool(true)),
        "false" => Some(LiteralValue::Bool(false)),
        "none" => Some(LiteralValue::None),
        "unary_operator" => negative_number(node, source),
        _ => None,
    };
    match literal {
        Some(value) => ParamValue::Literal(value),
        None => ParamValue::VarRef(text.to_string()),
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let cleaned = text.replace('_', "");
    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok();
    }
    cleaned.parse().ok()
}

fn negative_number(node: Node<'_>, source: &[u8]) -> Option<LiteralValue> {
    let operator = node.child_by_field_name("operator")?;
    let argument = node.child_by_field_name("argument")?;
    if node_text(operator, source) != "-" {
        return None;
    }
    let text = node_text(argument, source);
    match argument.kind() {
        "integer" => parse_int(text).map(|n| LiteralValue::Int(-n)),
        "float" => text
            .replace('_', "")
            .parse::<f64>()
            .ok()
            .map(|f| LiteralValue::Float(-f)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "literal_test.rs"]
mod tests;
