//! Query Builder code generation (`frappe.qb` fluent chains).

mod dml;
mod expr;
mod imports;
mod select;

pub use dml::{delete_chain, update_chain};
pub use imports::Imports;
pub use select::generate_select;

use crate::context::ConversionContext;
use crate::error::{ConvertError, ConvertResult};
use sr_core::entity::{is_python_identifier, to_binding};
use sr_core::marker::TODO_PREFIX;
use sr_core::{python_string, EntityName};
use sr_sql::ir::{SqlExpr, TableRef};
use sr_sql::SelectQuery;

/// Names a table binding must not shadow.
const RESERVED_BINDINGS: &[&str] = &["frappe", "fn", "result"];

/// Table attributes that would shadow a column of the same name.
const RESERVED_ATTRIBUTES: &[&str] = &[
    "alias",
    "as_",
    "delete",
    "field",
    "for_",
    "for_portion",
    "get_sql",
    "get_table_name",
    "insert",
    "select",
    "star",
    "update",
];

/// SQL functions with a direct `functions` module counterpart.
const BUILDER_FUNCTIONS: &[(&str, &str)] = &[
    ("COUNT", "Count"),
    ("SUM", "Sum"),
    ("AVG", "Avg"),
    ("MIN", "Min"),
    ("MAX", "Max"),
    ("GROUP_CONCAT", "GroupConcat"),
    ("COALESCE", "Coalesce"),
    ("IFNULL", "IfNull"),
    ("NULLIF", "NullIf"),
    ("ABS", "Abs"),
    ("DATE", "Date"),
    ("TIMESTAMP", "Timestamp"),
    ("NOW", "Now"),
    ("CURDATE", "CurDate"),
    ("CONCAT", "Concat"),
    ("LOWER", "Lower"),
    ("UPPER", "Upper"),
    ("TRIM", "Trim"),
    ("LENGTH", "Length"),
];

/// Function with a known signature emitted through `CustomFunction`.
const DATEDIFF: &str = "DATEDIFF";

fn builder_function(name: &str) -> Option<&'static str> {
    BUILDER_FUNCTIONS
        .iter()
        .find(|(sql, _)| *sql == name)
        .map(|(_, builder)| *builder)
}

/// `binding.column`, or `binding.field("...")` when attribute access won't do.
fn attribute(binding: &str, column: &str) -> String {
    if is_python_identifier(column) && !RESERVED_ATTRIBUTES.contains(&column) {
        format!("{binding}.{column}")
    } else {
        format!("{binding}.field({})", python_string(column))
    }
}

/// Wrap in parentheses unless already fully wrapped.
fn paren(s: &str) -> String {
    if strip_outer_parens(s).len() != s.len() {
        s.to_string()
    } else {
        format!("({s})")
    }
}

/// Drop one pair of parentheses enclosing the whole string.
fn strip_outer_parens(s: &str) -> &str {
    let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) else {
        return s;
    };
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in inner.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return s;
                }
            }
            _ => {}
        }
    }
    if depth == 0 {
        inner
    } else {
        s
    }
}

/// `prefix(` + one chain segment per line + `)`.
fn block(prefix: &str, segments: &[String]) -> String {
    format!("{prefix}(\n\t{}\n)", segments.join("\n\t"))
}

/// Every SELECT reachable from `select`: itself, set-operation branches and
/// subqueries, in source order.
fn all_selects<'q>(select: &'q SelectQuery, out: &mut Vec<&'q SelectQuery>) {
    out.push(select);
    for branch in &select.set_ops {
        all_selects(&branch.query, out);
    }
    for sub in subqueries(select.expressions()) {
        all_selects(sub, out);
    }
}

/// Subqueries directly inside the given expressions.
fn subqueries<'q>(exprs: impl IntoIterator<Item = &'q SqlExpr>) -> Vec<&'q SelectQuery> {
    let mut subs = Vec::new();
    for expr in exprs {
        expr.walk(&mut |_| {}, &mut |sub| subs.push(sub));
    }
    subs
}

#[derive(Debug, Clone)]
struct Declaration {
    binding: String,
    entity: EntityName,
    table: String,
    alias: Option<String>,
}

/// One `frappe.qb.DocType(...)` binding per distinct table reference.
#[derive(Debug, Default)]
struct Declarations {
    entries: Vec<Declaration>,
}

impl Declarations {
    fn declare(&mut self, table: &TableRef, ctx: &ConversionContext<'_>) {
        if self.find(table).is_some() {
            return;
        }
        let entity = ctx.entity(table);
        let base = table
            .alias
            .as_deref()
            .map_or_else(|| entity.binding_name(), to_binding);
        let mut binding = base.clone();
        let mut n = 2;
        while RESERVED_BINDINGS.contains(&binding.as_str())
            || self.entries.iter().any(|d| d.binding == binding)
        {
            binding = format!("{base}_{n}");
            n += 1;
        }
        self.entries.push(Declaration {
            binding,
            entity,
            table: table.name.clone(),
            alias: table.alias.clone(),
        });
    }

    fn find(&self, table: &TableRef) -> Option<&Declaration> {
        self.entries
            .iter()
            .find(|d| d.table == table.name && d.alias == table.alias)
    }

    fn binding(&self, table: &TableRef) -> ConvertResult<&str> {
        self.find(table)
            .map(|d| d.binding.as_str())
            .ok_or_else(|| ConvertError::unsupported(format!("Undeclared table {}", table.name)))
    }

    fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(|d| {
            format!(
                "{} = frappe.qb.DocType({})",
                d.binding,
                python_string(&d.entity)
            )
        })
    }
}

#[derive(Debug, Clone)]
struct ScopeTable {
    reference: String,
    table: String,
    binding: String,
}

/// Tables visible to the expressions of one query level.
#[derive(Debug, Clone)]
struct Scope<'p> {
    tables: Vec<ScopeTable>,
    /// Projection aliases, visible in GROUP BY / HAVING / ORDER BY.
    aliases: Vec<String>,
    parent: Option<&'p Scope<'p>>,
}

impl Scope<'_> {
    fn binding(&self, qualifier: &str) -> ConvertResult<&str> {
        if let Some(t) = self
            .tables
            .iter()
            .find(|t| t.reference == qualifier || t.table == qualifier)
        {
            return Ok(&t.binding);
        }
        match self.parent {
            Some(parent) => parent.binding(qualifier),
            None => Err(ConvertError::unsupported(format!(
                "Unknown table reference {qualifier} - needs manual conversion"
            ))),
        }
    }

    /// Binding for an unqualified column, `None` when it must stay bare.
    fn unqualified(&self, column: &str) -> Option<&str> {
        if self.aliases.iter().any(|a| a == column) {
            return None;
        }
        match self.tables.as_slice() {
            [only] => Some(&only.binding),
            _ => None,
        }
    }
}

/// Shared state while writing one statement.
struct Writer<'w> {
    ctx: &'w ConversionContext<'w>,
    decls: Declarations,
}

impl<'w> Writer<'w> {
    fn new<'t>(ctx: &'w ConversionContext<'w>, tables: impl IntoIterator<Item = &'t TableRef>) -> Self {
        let mut decls = Declarations::default();
        for table in tables {
            decls.declare(table, ctx);
        }
        Self { ctx, decls }
    }

    fn scope<'p, 't>(
        &self,
        tables: impl IntoIterator<Item = &'t TableRef>,
        aliases: Vec<String>,
        parent: Option<&'p Scope<'p>>,
    ) -> ConvertResult<Scope<'p>> {
        let tables = tables
            .into_iter()
            .map(|t| {
                Ok(ScopeTable {
                    reference: t.reference_name().to_string(),
                    table: t.name.clone(),
                    binding: self.decls.binding(t)?.to_string(),
                })
            })
            .collect::<ConvertResult<Vec<_>>>()?;
        Ok(Scope {
            tables,
            aliases,
            parent,
        })
    }

    /// TODO notes, imports and table bindings preceding the chain.
    fn preamble(&self, imports: &Imports) -> Vec<String> {
        let mut lines: Vec<String> = imports
            .unknown_functions
            .iter()
            .map(|name| format!("{TODO_PREFIX}: check CustomFunction signature for {name}"))
            .collect();
        lines.extend(imports.lines().into_iter().map(str::to_string));
        lines.extend(self.decls.lines());
        lines
    }
}

#[cfg(test)]
#[path = "qb_test.rs"]
mod tests;
