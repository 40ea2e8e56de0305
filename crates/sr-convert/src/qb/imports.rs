//! Auxiliary imports a generated chain needs, found before generation.

use super::{all_selects, builder_function, subqueries, DATEDIFF};
use sr_sql::ir::SqlExpr;
use sr_sql::SelectQuery;
use std::collections::BTreeSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Imports {
    pub functions: bool,
    pub field: bool,
    pub custom_function: bool,
    pub subquery: bool,
    pub case: bool,
    pub exists: bool,
    pub value_wrapper: bool,
    /// Functions without a known builder counterpart.
    pub unknown_functions: BTreeSet<String>,
}

/// Whether `expr` is a bare constant the builder cannot overload operators on.
pub(super) fn is_constant(expr: &SqlExpr) -> bool {
    match expr.unnested() {
        SqlExpr::Literal(_) | SqlExpr::Placeholder(_) => true,
        SqlExpr::Negate(inner) => is_constant(inner),
        _ => false,
    }
}

/// Whether a comparison needs its left operand wrapped to stay a criterion.
pub(super) fn wraps_left(left: &SqlExpr, right: &SqlExpr) -> bool {
    is_constant(left) && is_constant(right)
}

impl Imports {
    /// Walk a SELECT with every branch and subquery.
    pub fn for_select(select: &SelectQuery) -> Self {
        let mut imports = Imports::default();
        let mut selects = Vec::new();
        all_selects(select, &mut selects);
        for query in selects {
            let single = query.tables().count() == 1;
            let aliases: Vec<&str> = query
                .projection
                .iter()
                .filter_map(|p| p.alias.as_deref())
                .collect();
            for projection in &query.projection {
                if is_constant(&projection.expr) {
                    imports.value_wrapper = true;
                }
                imports.visit(&projection.expr, single, &[]);
            }
            for expr in query.joins.iter().filter_map(|j| j.on.as_ref()) {
                imports.visit(expr, single, &[]);
            }
            if let Some(selection) = &query.selection {
                imports.visit(selection, single, &[]);
            }
            let clause_exprs = query
                .group_by
                .iter()
                .chain(query.having.iter())
                .chain(query.order_by.iter().map(|o| &o.expr));
            for expr in clause_exprs {
                imports.visit(expr, single, &aliases);
            }
        }
        imports
    }

    /// Walk the expressions of a single-table UPDATE or DELETE.
    pub fn for_exprs<'e>(exprs: impl IntoIterator<Item = &'e SqlExpr>) -> Self {
        let exprs: Vec<&SqlExpr> = exprs.into_iter().collect();
        let mut imports = Imports::default();
        for expr in &exprs {
            imports.visit(expr, true, &[]);
        }
        for sub in subqueries(exprs) {
            imports.merge(Imports::for_select(sub));
        }
        imports
    }

    fn merge(&mut self, other: Imports) {
        self.functions |= other.functions;
        self.field |= other.field;
        self.custom_function |= other.custom_function;
        self.subquery |= other.subquery;
        self.case |= other.case;
        self.exists |= other.exists;
        self.value_wrapper |= other.value_wrapper;
        self.unknown_functions.extend(other.unknown_functions);
    }

    fn visit(&mut self, expr: &SqlExpr, single_table: bool, aliases: &[&str]) {
        expr.walk(
            &mut |e| match e {
                SqlExpr::Column {
                    qualifier: None,
                    name,
                } if !single_table || aliases.contains(&name.as_str()) => self.field = true,
                SqlExpr::Function { name, .. } => match builder_function(name) {
                    Some(_) => self.functions = true,
                    None => {
                        self.custom_function = true;
                        if name != DATEDIFF {
                            self.unknown_functions.insert(name.clone());
                        }
                    }
                },
                SqlExpr::Cast { .. } => self.functions = true,
                SqlExpr::Case { .. } => self.case = true,
                SqlExpr::Exists { .. } => self.exists = true,
                SqlExpr::InSubquery { .. } | SqlExpr::Subquery(_) => self.subquery = true,
                SqlExpr::Binary { left, op, right } if op.is_comparison() => {
                    if wraps_left(left, right) {
                        self.value_wrapper = true;
                    }
                }
                SqlExpr::IsNull { expr, .. }
                | SqlExpr::InList { expr, .. }
                | SqlExpr::Between { expr, .. }
                | SqlExpr::Like { expr, .. } => {
                    if is_constant(expr) {
                        self.value_wrapper = true;
                    }
                }
                _ => {}
            },
            &mut |_| {},
        );
    }

    /// Import statements in a fixed order.
    pub fn lines(&self) -> Vec<&'static str> {
        let mut lines = Vec::new();
        if self.functions {
            lines.push("from frappe.query_builder import functions as fn");
        }
        if self.field {
            lines.push("from frappe.query_builder import Field");
        }
        if self.custom_function {
            lines.push("from frappe.query_builder import CustomFunction");
        }
        if self.subquery {
            lines.push("from frappe.query_builder.terms import SubQuery");
        }
        if self.case {
            lines.push("from pypika import Case");
        }
        if self.exists {
            lines.push("from pypika.terms import ExistsCriterion");
        }
        if self.value_wrapper {
            lines.push("from pypika.terms import ValueWrapper");
        }
        lines
    }
}
