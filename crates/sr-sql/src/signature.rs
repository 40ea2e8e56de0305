//! Semantic signature: statement shape with values and parameters erased.

use crate::placeholder::is_sentinel;
use sqlparser::ast::{visit_expressions_mut, Expr, Ident, Statement};
use std::ops::ControlFlow;

const SIGNATURE_LEN: usize = 80;

/// Two calls differing only in literal values or bound parameters share a
/// signature.
pub fn semantic_signature(statement: &Statement) -> String {
    let mut stmt = statement.clone();
    let _ = visit_expressions_mut(&mut stmt, |expr| {
        match expr {
            Expr::Value(_) => *expr = Expr::Identifier(Ident::new("VALUE")),
            Expr::Identifier(ident) if is_sentinel(&ident.value) => {
                *expr = Expr::Identifier(Ident::new("PARAM"))
            }
            _ => {}
        }
        ControlFlow::<()>::Continue(())
    });

    stmt.to_string()
        .replace(' ', "_")
        .replace(['(', ')'], "")
        .chars()
        .take(SIGNATURE_LEN)
        .collect()
}
