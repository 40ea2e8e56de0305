//! Owned relational IR lowered from the sqlparser AST.
//!
//! Generators and fingerprints match on these enums instead of the parser's
//! much larger AST, so one new expression kind is one new variant.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueryType::Select => "SELECT",
            QueryType::Insert => "INSERT",
            QueryType::Update => "UPDATE",
            QueryType::Delete => "DELETE",
        })
    }
}

/// A physical table reference with an optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// The name other clauses use to qualify columns of this table.
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Number(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo
        )
    }

    /// Python operator overloaded by the query builder.
    pub fn python(self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
        }
    }

    /// Operator string in the ORM filter-triple convention.
    pub fn filter_operator(self) -> Option<&'static str> {
        match self {
            BinaryOp::Eq => Some("="),
            BinaryOp::NotEq => Some("!="),
            BinaryOp::Lt => Some("<"),
            BinaryOp::LtEq => Some("<="),
            BinaryOp::Gt => Some(">"),
            BinaryOp::GtEq => Some(">="),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseBranch {
    pub condition: SqlExpr,
    pub result: SqlExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    Column {
        qualifier: Option<String>,
        name: String,
    },
    Wildcard {
        qualifier: Option<String>,
    },
    /// A sentinel token standing for a driver placeholder.
    Placeholder(String),
    Literal(Literal),
    Binary {
        left: Box<SqlExpr>,
        op: BinaryOp,
        right: Box<SqlExpr>,
    },
    Not(Box<SqlExpr>),
    Negate(Box<SqlExpr>),
    IsNull {
        expr: Box<SqlExpr>,
        negated: bool,
    },
    InList {
        expr: Box<SqlExpr>,
        list: Vec<SqlExpr>,
        negated: bool,
    },
    InSubquery {
        expr: Box<SqlExpr>,
        subquery: Box<SelectQuery>,
        negated: bool,
    },
    Between {
        expr: Box<SqlExpr>,
        low: Box<SqlExpr>,
        high: Box<SqlExpr>,
        negated: bool,
    },
    Like {
        expr: Box<SqlExpr>,
        pattern: Box<SqlExpr>,
        negated: bool,
    },
    Exists {
        subquery: Box<SelectQuery>,
        negated: bool,
    },
    Subquery(Box<SelectQuery>),
    Function {
        /// Upper-cased function name.
        name: String,
        args: Vec<SqlExpr>,
        distinct: bool,
    },
    Case {
        operand: Option<Box<SqlExpr>>,
        branches: Vec<CaseBranch>,
        else_result: Option<Box<SqlExpr>>,
    },
    Cast {
        expr: Box<SqlExpr>,
        data_type: String,
    },
    Tuple(Vec<SqlExpr>),
    Nested(Box<SqlExpr>),
    /// Anything the lowering does not model, kept as SQL text.
    Unsupported(String),
}

pub const AGGREGATE_FUNCTIONS: &[&str] = &["COUNT", "SUM", "AVG", "MIN", "MAX", "GROUP_CONCAT"];

impl SqlExpr {
    pub fn column(name: impl Into<String>) -> Self {
        SqlExpr::Column {
            qualifier: None,
            name: name.into(),
        }
    }

    /// Strip redundant parentheses.
    pub fn unnested(&self) -> &SqlExpr {
        match self {
            SqlExpr::Nested(inner) => inner.unnested(),
            other => other,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, SqlExpr::Function { name, .. } if AGGREGATE_FUNCTIONS.contains(&name.as_str()))
    }

    /// Visit this expression and every expression nested inside it.
    ///
    /// Subqueries are reported to `on_subquery` instead of being descended.
    pub fn walk<'a>(
        &'a self,
        on_expr: &mut dyn FnMut(&'a SqlExpr),
        on_subquery: &mut dyn FnMut(&'a SelectQuery),
    ) {
        on_expr(self);
        match self {
            SqlExpr::Binary { left, right, .. } => {
                left.walk(on_expr, on_subquery);
                right.walk(on_expr, on_subquery);
            }
            SqlExpr::Not(inner)
            | SqlExpr::Negate(inner)
            | SqlExpr::Nested(inner)
            | SqlExpr::IsNull { expr: inner, .. }
            | SqlExpr::Cast { expr: inner, .. } => inner.walk(on_expr, on_subquery),
            SqlExpr::InList { expr, list, .. } => {
                expr.walk(on_expr, on_subquery);
                for item in list {
                    item.walk(on_expr, on_subquery);
                }
            }
            SqlExpr::InSubquery { expr, subquery, .. } => {
                expr.walk(on_expr, on_subquery);
                on_subquery(subquery.as_ref());
            }
            SqlExpr::Between {
                expr, low, high, ..
            } => {
                expr.walk(on_expr, on_subquery);
                low.walk(on_expr, on_subquery);
                high.walk(on_expr, on_subquery);
            }
            SqlExpr::Like { expr, pattern, .. } => {
                expr.walk(on_expr, on_subquery);
                pattern.walk(on_expr, on_subquery);
            }
            SqlExpr::Exists { subquery, .. } | SqlExpr::Subquery(subquery) => {
                on_subquery(subquery.as_ref())
            }
            SqlExpr::Function { args, .. } | SqlExpr::Tuple(args) => {
                for arg in args {
                    arg.walk(on_expr, on_subquery);
                }
            }
            SqlExpr::Case {
                operand,
                branches,
                else_result,
            } => {
                if let Some(op) = operand {
                    op.walk(on_expr, on_subquery);
                }
                for branch in branches {
                    branch.condition.walk(on_expr, on_subquery);
                    branch.result.walk(on_expr, on_subquery);
                }
                if let Some(e) = else_result {
                    e.walk(on_expr, on_subquery);
                }
            }
            SqlExpr::Column { .. }
            | SqlExpr::Wildcard { .. }
            | SqlExpr::Placeholder(_)
            | SqlExpr::Literal(_)
            | SqlExpr::Unsupported(_) => {}
        }
    }

    pub fn contains_subquery(&self) -> bool {
        let mut found = false;
        self.walk(&mut |_| {}, &mut |_| found = true);
        found
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub expr: SqlExpr,
    pub alias: Option<String>,
    /// Original SQL text of the expression.
    pub sql: String,
}

impl Projection {
    pub fn is_wildcard(&self) -> bool {
        matches!(self.expr, SqlExpr::Wildcard { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub expr: SqlExpr,
    pub descending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: TableRef,
    pub kind: JoinKind,
    pub on: Option<SqlExpr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOpKind {
    Union,
    Intersect,
    Except,
}

impl fmt::Display for SetOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SetOpKind::Union => "UNION",
            SetOpKind::Intersect => "INTERSECT",
            SetOpKind::Except => "EXCEPT",
        })
    }
}

/// A right-hand branch of `UNION`/`INTERSECT`/`EXCEPT`.
#[derive(Debug, Clone, PartialEq)]
pub struct SetBranch {
    pub kind: SetOpKind,
    pub all: bool,
    pub query: SelectQuery,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub distinct: bool,
    pub projection: Vec<Projection>,
    /// Comma-separated FROM entries.
    pub from: Vec<TableRef>,
    pub joins: Vec<Join>,
    /// FROM entries the IR does not model (derived tables, table functions).
    pub unsupported_from: Vec<String>,
    pub selection: Option<SqlExpr>,
    pub group_by: Vec<SqlExpr>,
    pub having: Option<SqlExpr>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<SqlExpr>,
    pub offset: Option<SqlExpr>,
    pub set_ops: Vec<SetBranch>,
}

impl SelectQuery {
    /// FROM and JOIN tables, in source order.
    pub fn tables(&self) -> impl Iterator<Item = &TableRef> {
        self.from.iter().chain(self.joins.iter().map(|j| &j.table))
    }

    /// Every expression of this query level, excluding nested subqueries.
    pub fn expressions(&self) -> Vec<&SqlExpr> {
        let mut exprs: Vec<&SqlExpr> = self.projection.iter().map(|p| &p.expr).collect();
        exprs.extend(self.joins.iter().filter_map(|j| j.on.as_ref()));
        exprs.extend(self.selection.iter());
        exprs.extend(self.group_by.iter());
        exprs.extend(self.having.iter());
        exprs.extend(self.order_by.iter().map(|o| &o.expr));
        exprs.extend(self.limit.iter());
        exprs.extend(self.offset.iter());
        exprs
    }

    pub fn has_subquery(&self) -> bool {
        !self.unsupported_from.is_empty()
            || self.expressions().iter().any(|e| e.contains_subquery())
            || self.set_ops.iter().any(|b| b.query.has_subquery())
    }

    pub fn has_aggregate_projection(&self) -> bool {
        self.projection.iter().any(|p| {
            let mut found = false;
            p.expr.walk(&mut |e| found |= e.is_aggregate(), &mut |_| {});
            found
        })
    }

    pub fn has_wildcard(&self) -> bool {
        self.projection.iter().any(Projection::is_wildcard)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    pub table: TableRef,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: SqlExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    pub table: TableRef,
    /// `UPDATE a JOIN b ...` or `UPDATE a, b ...` or `UPDATE ... FROM`.
    pub multi_table: bool,
    pub assignments: Vec<Assignment>,
    pub selection: Option<SqlExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    pub table: TableRef,
    pub multi_table: bool,
    pub selection: Option<SqlExpr>,
}

/// A lowered top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedQuery {
    Select(SelectQuery),
    Insert(InsertQuery),
    Update(UpdateQuery),
    Delete(DeleteQuery),
}

impl ParsedQuery {
    pub fn query_type(&self) -> QueryType {
        match self {
            ParsedQuery::Select(_) => QueryType::Select,
            ParsedQuery::Insert(_) => QueryType::Insert,
            ParsedQuery::Update(_) => QueryType::Update,
            ParsedQuery::Delete(_) => QueryType::Delete,
        }
    }

    /// Tables that name the statement's data source or target.
    pub fn target_tables(&self) -> Vec<&TableRef> {
        match self {
            ParsedQuery::Select(q) => {
                let mut tables: Vec<&TableRef> = q.tables().collect();
                for branch in &q.set_ops {
                    tables.extend(branch.query.tables());
                }
                tables
            }
            ParsedQuery::Insert(q) => vec![&q.table],
            ParsedQuery::Update(q) => vec![&q.table],
            ParsedQuery::Delete(q) => vec![&q.table],
        }
    }
}
