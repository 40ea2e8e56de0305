//! Where a matched call sits: how its result is consumed and which function
//! encloses it.

use crate::literal::node_text;
use sr_core::ConsumptionMode;
use tree_sitter::Node;

const GLOBAL_SCOPE: &str = "global scope";

/// Classify how the value of `call` is used by its direct syntactic parent.
///
/// Parentheses and `await` are looked through. A call nested deeper inside
/// another expression is `Unknown`.
pub fn consumption_mode(call: Node<'_>, source: &[u8]) -> ConsumptionMode {
    let mut child = call;
    while let Some(parent) = child.parent() {
        match parent.kind() {
            "parenthesized_expression" | "await" => {
                child = parent;
            }
            "return_statement" => return ConsumptionMode::Returned,
            "yield" => return ConsumptionMode::Yielded,
            "assignment" => {
                let is_value = parent
                    .child_by_field_name("right")
                    .is_some_and(|right| right.id() == child.id());
                let target = parent
                    .child_by_field_name("left")
                    .filter(|left| matches!(left.kind(), "identifier" | "attribute"));
                return match target {
                    Some(left) if is_value => {
                        ConsumptionMode::Assign(node_text(left, source).to_string())
                    }
                    _ => ConsumptionMode::Unknown,
                };
            }
            "for_statement" => {
                let is_iterable = parent
                    .child_by_field_name("right")
                    .is_some_and(|right| right.id() == child.id());
                if !is_iterable {
                    return ConsumptionMode::Unknown;
                }
                let target = parent
                    .child_by_field_name("left")
                    .filter(|left| left.kind() == "identifier")
                    .map(|left| node_text(left, source).to_string());
                return ConsumptionMode::ForTarget(target);
            }
            "expression_statement" => return ConsumptionMode::Expression,
            _ => return ConsumptionMode::Unknown,
        }
    }
    ConsumptionMode::Unknown
}

/// `def name():` of the innermost enclosing function, or `global scope`.
pub fn function_context(node: Node<'_>, source: &[u8]) -> String {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind() == "function_definition" {
            if let Some(name) = n.child_by_field_name("name") {
                return format!("def {}():", node_text(name, source));
            }
        }
        current = n.parent();
    }
    GLOBAL_SCOPE.to_string()
}
