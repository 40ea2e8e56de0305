//! Parameter and keyword-argument extraction.

use crate::literal::{node_text, string_value, value_from_node};
use sr_core::{positional_key, python_string, ParamMap, ParamValue};
use sr_sql::placeholder::{named_placeholders, positional_count};
use tree_sitter::Node;

/// Key used when a whole variable is passed and the SQL has no placeholders.
pub const VAR_REF_KEY: &str = "__var_ref__";

/// Bindings for the second positional argument of a matched call.
pub fn extract_params(node: Node<'_>, source: &[u8], sql: &str) -> Option<ParamMap> {
    match node.kind() {
        "parenthesized_expression" => {
            let inner = node.named_child(0)?;
            extract_params(inner, source, sql)
        }
        "dictionary" => Some(dictionary_params(node, source)),
        "identifier" | "attribute" | "subscript" => {
            Some(variable_params(node_text(node, source), sql))
        }
        "tuple" | "list" => sequence_params(node, source, sql),
        "call" => call_params(node, source, sql),
        "string" | "concatenated_string" | "integer" | "float" | "true" | "false" | "none"
            if positional_count(sql) > 0 =>
        {
            let mut params = ParamMap::new();
            params.insert(positional_key(0), value_from_node(node, source));
            Some(params)
        }
        other => {
            log::debug!("Unhandled params node kind '{other}'");
            None
        }
    }
}

fn dictionary_params(node: Node<'_>, source: &[u8]) -> ParamMap {
    let mut params = ParamMap::new();
    let mut cursor = node.walk();
    for pair in node.named_children(&mut cursor) {
        if pair.kind() != "pair" {
            continue;
        }
        let (Some(key), Some(value)) = (
            pair.child_by_field_name("key"),
            pair.child_by_field_name("value"),
        ) else {
            continue;
        };
        if let Some(key) = string_value(key, source) {
            params.insert(key, value_from_node(value, source));
        }
    }
    params
}

/// A runtime mapping or sequence passed by name.
///
/// Named placeholders resolve through subscripts of that variable. A single
/// positional marker binds the variable itself; several bind its items.
fn variable_params(var: &str, sql: &str) -> ParamMap {
    let mut params = ParamMap::new();
    let named = named_placeholders(sql);
    if !named.is_empty() {
        for name in named {
            let lookup = format!("{var}[{}]", python_string(&name));
            params.insert(name, ParamValue::VarRef(lookup));
        }
        return params;
    }

    match positional_count(sql) {
        0 => {
            params.insert(VAR_REF_KEY.to_string(), ParamValue::var(var));
        }
        1 => {
            params.insert(positional_key(0), ParamValue::var(var));
        }
        n => {
            for i in 0..n {
                params.insert(positional_key(i), ParamValue::VarRef(format!("{var}[{i}]")));
            }
        }
    }
    params
}

fn sequence_params(node: Node<'_>, source: &[u8], sql: &str) -> Option<ParamMap> {
    let mut cursor = node.walk();
    let params: ParamMap = node
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .take(positional_count(sql))
        .enumerate()
        .map(|(i, elem)| (positional_key(i), value_from_node(elem, source)))
        .collect();
    (!params.is_empty()).then_some(params)
}

fn call_params(node: Node<'_>, source: &[u8], sql: &str) -> Option<ParamMap> {
    let function = node.child_by_field_name("function")?;
    let name = match function.kind() {
        "identifier" => node_text(function, source),
        "attribute" => node_text(function.child_by_field_name("attribute")?, source),
        _ => "",
    };

    if matches!(name, "dict" | "_dict") {
        let args = node.child_by_field_name("arguments")?;
        let params = keyword_arguments(args, source);
        return (!params.is_empty()).then_some(params);
    }

    if named_placeholders(sql).is_empty() && positional_count(sql) == 1 {
        let mut params = ParamMap::new();
        params.insert(positional_key(0), ParamValue::var(node_text(node, source)));
        return Some(params);
    }
    None
}

/// `name=value` arguments of an argument list.
pub fn keyword_arguments(args: Node<'_>, source: &[u8]) -> ParamMap {
    let mut params = ParamMap::new();
    let mut cursor = args.walk();
    for arg in args.named_children(&mut cursor) {
        if arg.kind() != "keyword_argument" {
            continue;
        }
        if let (Some(name), Some(value)) = (
            arg.child_by_field_name("name"),
            arg.child_by_field_name("value"),
        ) {
            params.insert(
                node_text(name, source).to_string(),
                value_from_node(value, source),
            );
        }
    }
    params
}
