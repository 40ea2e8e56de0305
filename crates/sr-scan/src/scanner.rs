//! Call-site detection on Python syntax trees.

use crate::context::{consumption_mode, function_context};
use crate::error::{ScanError, ScanResult};
use crate::literal::{node_text, string_value};
use crate::params::{extract_params, keyword_arguments};
use sr_core::{CalleeShape, ConsumptionMode, ParamMap};
use std::path::Path;
use tree_sitter::{Node, Parser};

/// One literal-SQL call found in a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    pub file_path: String,
    /// 1-based line of the call expression.
    pub line_number: usize,
    pub function_context: String,
    pub sql: String,
    pub params: Option<ParamMap>,
    pub kwargs: Option<ParamMap>,
    pub consumption: ConsumptionMode,
}

/// Finds `<namespace>.<attribute>.<method>("...")` calls.
pub struct CallScanner {
    parser: Parser,
    callee: CalleeShape,
}

impl CallScanner {
    pub fn new(callee: CalleeShape) -> ScanResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ScanError::Language(e.to_string()))?;
        Ok(Self { parser, callee })
    }

    pub fn callee(&self) -> &CalleeShape {
        &self.callee
    }

    /// Read and scan one file. `display_path` is what gets recorded.
    pub fn scan_file(&mut self, path: &Path, display_path: &str) -> ScanResult<Vec<CallSite>> {
        let source = std::fs::read_to_string(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.scan_source(display_path, &source)
    }

    /// Scan source text. A file with syntax errors yields `ScanError::Syntax`.
    pub fn scan_source(&mut self, file_path: &str, source: &str) -> ScanResult<Vec<CallSite>> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ScanError::Syntax {
                path: file_path.to_string(),
                line: 0,
            })?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ScanError::Syntax {
                path: file_path.to_string(),
                line: first_error_line(root),
            });
        }

        let bytes = source.as_bytes();
        let mut calls = Vec::new();
        for_each_node(root, |node| {
            if !self.is_target_call(node, bytes) {
                return;
            }
            match extract_call(node, bytes, file_path) {
                Some(call) => calls.push(call),
                None => log::debug!(
                    "{}:{}: call has no literal SQL argument, skipping",
                    file_path,
                    node.start_position().row + 1
                ),
            }
        });
        Ok(calls)
    }

    fn is_target_call(&self, node: Node<'_>, source: &[u8]) -> bool {
        if node.kind() != "call" {
            return false;
        }
        let Some(function) = node.child_by_field_name("function") else {
            return false;
        };
        matches_attribute(function, source, &self.callee.method).is_some_and(|object| {
            matches_attribute(object, source, &self.callee.attribute).is_some_and(|base| {
                base.kind() == "identifier" && node_text(base, source) == self.callee.namespace
            })
        })
    }
}

/// If `node` is `<object>.<name>`, return `<object>`.
fn matches_attribute<'t>(node: Node<'t>, source: &[u8], name: &str) -> Option<Node<'t>> {
    if node.kind() != "attribute" {
        return None;
    }
    let attribute = node.child_by_field_name("attribute")?;
    if node_text(attribute, source) != name {
        return None;
    }
    node.child_by_field_name("object")
}

fn extract_call(node: Node<'_>, source: &[u8], file_path: &str) -> Option<CallSite> {
    let args = node.child_by_field_name("arguments")?;
    if args.kind() != "argument_list" {
        return None;
    }

    let mut cursor = args.walk();
    let positional: Vec<Node<'_>> = args
        .named_children(&mut cursor)
        .filter(|n| !matches!(n.kind(), "keyword_argument" | "comment" | "dictionary_splat"))
        .collect();

    let sql = string_value(*positional.first()?, source)?;
    let params = positional
        .get(1)
        .and_then(|p| extract_params(*p, source, &sql));
    let kwargs = keyword_arguments(args, source);

    Some(CallSite {
        file_path: file_path.to_string(),
        line_number: node.start_position().row + 1,
        function_context: function_context(node, source),
        sql,
        params,
        kwargs: (!kwargs.is_empty()).then_some(kwargs),
        consumption: consumption_mode(node, source),
    })
}

/// Pre-order traversal without recursion.
fn for_each_node<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>)) {
    let mut cursor = root.walk();
    loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

fn first_error_line(root: Node<'_>) -> usize {
    let mut line = None;
    for_each_node(root, |node| {
        if line.is_none() && (node.is_error() || node.is_missing()) {
            line = Some(node.start_position().row + 1);
        }
    });
    line.unwrap_or(1)
}

#[cfg(test)]
#[path = "scanner_test.rs"]
mod tests;
