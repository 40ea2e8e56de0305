//! AST-to-IR lowering: sqlparser Statement → ParsedQuery

use crate::error::{SqlError, SqlResult};
use crate::ir::{
    Assignment, BinaryOp, CaseBranch, DeleteQuery, InsertQuery, Join, JoinKind, Literal,
    OrderItem, ParsedQuery, Projection, SelectQuery, SetBranch, SetOpKind, SqlExpr, TableRef,
    UpdateQuery,
};
use crate::parser::SqlParser;
use crate::placeholder::{is_sentinel, NormalizedSql};
use sqlparser::ast::{
    BinaryOperator, DuplicateTreatment, Expr, FromTable, FunctionArg, FunctionArgExpr,
    FunctionArguments, GroupByExpr, JoinConstraint, JoinOperator, LimitClause, ObjectName,
    ObjectNamePart, OrderByKind, Query, Select, SelectItem, SelectItemQualifiedWildcardKind,
    SetExpr, SetOperator, SetQuantifier, Statement, TableFactor, TableWithJoins, UnaryOperator,
    Value,
};

/// A parsed statement together with its lowered form.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub statement: Statement,
    pub query: ParsedQuery,
}

/// Parse normalized SQL and lower the first statement.
pub fn analyze(parser: &SqlParser, normalized: &NormalizedSql) -> SqlResult<Analysis> {
    let statement = parser.parse_single(&normalized.sql)?;
    let query = lower_statement(&statement)?;
    Ok(Analysis { statement, query })
}

/// Lower a sqlparser Statement into the IR
pub fn lower_statement(stmt: &Statement) -> SqlResult<ParsedQuery> {
    match stmt {
        Statement::Query(query) => Ok(ParsedQuery::Select(lower_query(query)?)),

        Statement::Insert(insert) => {
            let table = table_from_display(&insert.table.to_string());
            let columns = insert
                .columns
                .iter()
                .map(|c| strip_quotes(&c.to_string()))
                .collect();
            Ok(ParsedQuery::Insert(InsertQuery { table, columns }))
        }

        Statement::Update(update) => {
            let table = lower_table_factor(&update.table.relation).map_err(|what| {
                SqlError::UnsupportedStatement(format!("UPDATE of {what}"))
            })?;
            let multi_table = !update.table.joins.is_empty() || update.from.is_some();
            let assignments = update
                .assignments
                .iter()
                .map(|a| Assignment {
                    column: last_segment(&a.target.to_string()),
                    value: lower_expr(&a.value),
                })
                .collect();
            Ok(ParsedQuery::Update(UpdateQuery {
                table,
                multi_table,
                assignments,
                selection: update.selection.as_ref().map(lower_expr),
            }))
        }

        Statement::Delete(delete) => {
            let from = match &delete.from {
                FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
            };
            let first = from
                .first()
                .ok_or_else(|| SqlError::UnsupportedStatement("DELETE without table".into()))?;
            let table = lower_table_factor(&first.relation).map_err(|what| {
                SqlError::UnsupportedStatement(format!("DELETE from {what}"))
            })?;
            let multi_table = !delete.tables.is_empty()
                || from.len() > 1
                || !first.joins.is_empty()
                || delete.using.is_some();
            Ok(ParsedQuery::Delete(DeleteQuery {
                table,
                multi_table,
                selection: delete.selection.as_ref().map(lower_expr),
            }))
        }

        other => Err(SqlError::UnsupportedStatement(statement_kind(other))),
    }
}

/// Leading keywords of a statement, for diagnostics.
fn statement_kind(stmt: &Statement) -> String {
    stmt.to_string()
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Lower a Query (body, ORDER BY, LIMIT/OFFSET)
pub(crate) fn lower_query(query: &Query) -> SqlResult<SelectQuery> {
    let mut select = lower_set_expr(&query.body)?;

    if query.with.is_some() {
        select.unsupported_from.push("WITH clause".to_string());
    }

    if let Some(ref order_by) = query.order_by {
        if let OrderByKind::Expressions(ref exprs) = order_by.kind {
            select.order_by = exprs
                .iter()
                .map(|obe| OrderItem {
                    expr: lower_expr(&obe.expr),
                    descending: obe.options.asc == Some(false),
                })
                .collect();
        }
    }

    if let Some(ref limit_clause) = query.limit_clause {
        let (limit, offset) = match limit_clause {
            LimitClause::LimitOffset { limit, offset, .. } => {
                (limit.as_ref(), offset.as_ref().map(|o| &o.value))
            }
            LimitClause::OffsetCommaLimit { offset, limit } => (Some(limit), Some(offset)),
        };
        select.limit = limit.map(lower_expr);
        select.offset = offset.map(lower_expr);
    }

    Ok(select)
}

fn lower_set_expr(set_expr: &SetExpr) -> SqlResult<SelectQuery> {
    match set_expr {
        SetExpr::Select(select) => Ok(lower_select(select)),
        SetExpr::Query(q) => lower_query(q),
        SetExpr::SetOperation {
            op,
            set_quantifier,
            left,
            right,
        } => {
            let mut base = lower_set_expr(left)?;
            let mut branch = lower_set_expr(right)?;
            let kind = match op {
                SetOperator::Union => SetOpKind::Union,
                SetOperator::Intersect => SetOpKind::Intersect,
                SetOperator::Except => SetOpKind::Except,
                other => {
                    return Err(SqlError::UnsupportedStatement(format!(
                        "set operator {other}"
                    )))
                }
            };
            let nested = std::mem::take(&mut branch.set_ops);
            base.set_ops.push(SetBranch {
                kind,
                all: matches!(set_quantifier, SetQuantifier::All),
                query: branch,
            });
            base.set_ops.extend(nested);
            Ok(base)
        }
        other => Err(SqlError::UnsupportedStatement(statement_kind_of_body(other))),
    }
}

fn statement_kind_of_body(body: &SetExpr) -> String {
    body.to_string()
        .split_whitespace()
        .next()
        .unwrap_or("query")
        .to_uppercase()
}

fn lower_select(select: &Select) -> SelectQuery {
    let mut out = SelectQuery {
        distinct: select.distinct.is_some(),
        ..SelectQuery::default()
    };

    for item in &select.projection {
        let projection = match item {
            SelectItem::UnnamedExpr(expr) => Projection {
                expr: lower_expr(expr),
                alias: None,
                sql: expr.to_string(),
            },
            SelectItem::ExprWithAlias { expr, alias } => Projection {
                expr: lower_expr(expr),
                alias: Some(alias.value.clone()),
                sql: expr.to_string(),
            },
            SelectItem::QualifiedWildcard(kind, _) => {
                let qualifier = match kind {
                    SelectItemQualifiedWildcardKind::ObjectName(name) => object_name(name),
                    SelectItemQualifiedWildcardKind::Expr(expr) => expr.to_string(),
                };
                Projection {
                    sql: format!("{qualifier}.*"),
                    expr: SqlExpr::Wildcard {
                        qualifier: Some(qualifier),
                    },
                    alias: None,
                }
            }
            SelectItem::Wildcard(_) => Projection {
                expr: SqlExpr::Wildcard { qualifier: None },
                alias: None,
                sql: "*".to_string(),
            },
        };
        out.projection.push(projection);
    }

    for table_with_joins in &select.from {
        lower_from_entry(table_with_joins, &mut out);
    }

    out.selection = select.selection.as_ref().map(lower_expr);
    out.group_by = match &select.group_by {
        GroupByExpr::Expressions(exprs, _) => exprs.iter().map(lower_expr).collect(),
        GroupByExpr::All(_) => vec![SqlExpr::Unsupported("GROUP BY ALL".to_string())],
    };
    out.having = select.having.as_ref().map(lower_expr);
    out
}

fn lower_from_entry(table_with_joins: &TableWithJoins, out: &mut SelectQuery) {
    match lower_table_factor(&table_with_joins.relation) {
        Ok(table) => out.from.push(table),
        Err(what) => out.unsupported_from.push(what),
    }

    for join in &table_with_joins.joins {
        let table = match lower_table_factor(&join.relation) {
            Ok(table) => table,
            Err(what) => {
                out.unsupported_from.push(what);
                continue;
            }
        };
        let (kind, constraint) = match &join.join_operator {
            JoinOperator::Join(c) | JoinOperator::Inner(c) => (JoinKind::Inner, Some(c)),
            JoinOperator::Left(c) | JoinOperator::LeftOuter(c) => (JoinKind::Left, Some(c)),
            JoinOperator::Right(c) | JoinOperator::RightOuter(c) => (JoinKind::Right, Some(c)),
            JoinOperator::FullOuter(c) => (JoinKind::Full, Some(c)),
            JoinOperator::CrossJoin(_) => (JoinKind::Cross, None),
            other => {
                log::warn!("Unrecognized join operator {other:?}, treating as INNER JOIN");
                (JoinKind::Inner, None)
            }
        };
        let on = match constraint {
            Some(JoinConstraint::On(expr)) => Some(lower_expr(expr)),
            Some(JoinConstraint::Using(_)) => {
                Some(SqlExpr::Unsupported("JOIN ... USING".to_string()))
            }
            _ => None,
        };
        out.joins.push(Join { table, kind, on });
    }
}

/// Lower a plain table reference; anything else is described in the error.
fn lower_table_factor(factor: &TableFactor) -> Result<TableRef, String> {
    match factor {
        TableFactor::Table { name, alias, .. } => Ok(TableRef {
            name: object_name(name),
            alias: alias.as_ref().map(|a| a.name.value.clone()),
        }),
        TableFactor::Derived { .. } => Err("derived table".to_string()),
        TableFactor::NestedJoin { .. } => Err("nested join".to_string()),
        other => Err(other.to_string()),
    }
}

/// Lower a sqlparser Expr into SqlExpr
pub(crate) fn lower_expr(expr: &Expr) -> SqlExpr {
    match expr {
        Expr::Identifier(ident) => {
            if is_sentinel(&ident.value) {
                SqlExpr::Placeholder(ident.value.clone())
            } else {
                SqlExpr::column(ident.value.clone())
            }
        }

        Expr::CompoundIdentifier(idents) => match idents.as_slice() {
            [] => SqlExpr::Unsupported(expr.to_string()),
            [single] => SqlExpr::column(single.value.clone()),
            [.., table, column] => SqlExpr::Column {
                qualifier: Some(table.value.clone()),
                name: column.value.clone(),
            },
        },

        Expr::Value(val) => match &val.value {
            Value::Number(n, _) => SqlExpr::Literal(Literal::Number(n.clone())),
            Value::SingleQuotedString(s) | Value::DoubleQuotedString(s) => {
                SqlExpr::Literal(Literal::Str(s.clone()))
            }
            Value::Boolean(b) => SqlExpr::Literal(Literal::Bool(*b)),
            Value::Null => SqlExpr::Literal(Literal::Null),
            _ => SqlExpr::Unsupported(expr.to_string()),
        },

        Expr::BinaryOp { left, op, right } => match lower_binary_op(op) {
            Some(op) => SqlExpr::Binary {
                left: Box::new(lower_expr(left)),
                op,
                right: Box::new(lower_expr(right)),
            },
            None => SqlExpr::Unsupported(expr.to_string()),
        },

        Expr::UnaryOp { op, expr: inner } => match op {
            UnaryOperator::Not => SqlExpr::Not(Box::new(lower_expr(inner))),
            UnaryOperator::Minus => SqlExpr::Negate(Box::new(lower_expr(inner))),
            UnaryOperator::Plus => lower_expr(inner),
            _ => SqlExpr::Unsupported(expr.to_string()),
        },

        Expr::Nested(inner) => SqlExpr::Nested(Box::new(lower_expr(inner))),

        Expr::IsNull(inner) => SqlExpr::IsNull {
            expr: Box::new(lower_expr(inner)),
            negated: false,
        },

        Expr::IsNotNull(inner) => SqlExpr::IsNull {
            expr: Box::new(lower_expr(inner)),
            negated: true,
        },

        Expr::InList {
            expr: lhs,
            list,
            negated,
        } => SqlExpr::InList {
            expr: Box::new(lower_expr(lhs)),
            list: list.iter().map(lower_expr).collect(),
            negated: *negated,
        },

        Expr::InSubquery {
            expr: lhs,
            subquery,
            negated,
        } => match lower_query(subquery) {
            Ok(sub) => SqlExpr::InSubquery {
                expr: Box::new(lower_expr(lhs)),
                subquery: Box::new(sub),
                negated: *negated,
            },
            Err(_) => SqlExpr::Unsupported(expr.to_string()),
        },

        Expr::Between {
            expr: inner,
            negated,
            low,
            high,
        } => SqlExpr::Between {
            expr: Box::new(lower_expr(inner)),
            low: Box::new(lower_expr(low)),
            high: Box::new(lower_expr(high)),
            negated: *negated,
        },

        Expr::Like {
            negated,
            expr: inner,
            pattern,
            ..
        } => SqlExpr::Like {
            expr: Box::new(lower_expr(inner)),
            pattern: Box::new(lower_expr(pattern)),
            negated: *negated,
        },

        Expr::Exists { subquery, negated } => match lower_query(subquery) {
            Ok(sub) => SqlExpr::Exists {
                subquery: Box::new(sub),
                negated: *negated,
            },
            Err(_) => SqlExpr::Unsupported(expr.to_string()),
        },

        Expr::Subquery(query) => match lower_query(query) {
            Ok(sub) => SqlExpr::Subquery(Box::new(sub)),
            Err(_) => SqlExpr::Unsupported(expr.to_string()),
        },

        Expr::Function(func) => {
            let name = object_name(&func.name).to_uppercase();
            let (args, distinct) = match &func.args {
                FunctionArguments::None => (Vec::new(), false),
                FunctionArguments::Subquery(query) => match lower_query(query) {
                    Ok(sub) => (vec![SqlExpr::Subquery(Box::new(sub))], false),
                    Err(_) => return SqlExpr::Unsupported(expr.to_string()),
                },
                FunctionArguments::List(list) => (
                    list.args.iter().map(lower_function_arg).collect(),
                    matches!(list.duplicate_treatment, Some(DuplicateTreatment::Distinct)),
                ),
            };
            SqlExpr::Function {
                name,
                args,
                distinct,
            }
        }

        Expr::Case {
            operand,
            conditions,
            else_result,
            ..
        } => SqlExpr::Case {
            operand: operand.as_ref().map(|o| Box::new(lower_expr(o))),
            branches: conditions
                .iter()
                .map(|cw| CaseBranch {
                    condition: lower_expr(&cw.condition),
                    result: lower_expr(&cw.result),
                })
                .collect(),
            else_result: else_result.as_ref().map(|e| Box::new(lower_expr(e))),
        },

        Expr::Cast {
            expr: inner,
            data_type,
            ..
        } => SqlExpr::Cast {
            expr: Box::new(lower_expr(inner)),
            data_type: data_type.to_string(),
        },

        Expr::Tuple(items) => SqlExpr::Tuple(items.iter().map(lower_expr).collect()),

        other => SqlExpr::Unsupported(other.to_string()),
    }
}

fn lower_function_arg(arg: &FunctionArg) -> SqlExpr {
    let arg_expr = match arg {
        FunctionArg::Unnamed(e)
        | FunctionArg::Named { arg: e, .. }
        | FunctionArg::ExprNamed { arg: e, .. } => e,
    };
    match arg_expr {
        FunctionArgExpr::Expr(e) => lower_expr(e),
        FunctionArgExpr::Wildcard => SqlExpr::Wildcard { qualifier: None },
        FunctionArgExpr::QualifiedWildcard(name) => SqlExpr::Wildcard {
            qualifier: Some(object_name(name)),
        },
    }
}

fn lower_binary_op(op: &BinaryOperator) -> Option<BinaryOp> {
    Some(match op {
        BinaryOperator::Eq => BinaryOp::Eq,
        BinaryOperator::NotEq => BinaryOp::NotEq,
        BinaryOperator::Lt => BinaryOp::Lt,
        BinaryOperator::LtEq => BinaryOp::LtEq,
        BinaryOperator::Gt => BinaryOp::Gt,
        BinaryOperator::GtEq => BinaryOp::GtEq,
        BinaryOperator::And => BinaryOp::And,
        BinaryOperator::Or => BinaryOp::Or,
        BinaryOperator::Plus => BinaryOp::Plus,
        BinaryOperator::Minus => BinaryOp::Minus,
        BinaryOperator::Multiply => BinaryOp::Multiply,
        BinaryOperator::Divide => BinaryOp::Divide,
        BinaryOperator::Modulo => BinaryOp::Modulo,
        _ => return None,
    })
}

/// Dotted object name with identifier quotes removed.
pub(crate) fn object_name(name: &ObjectName) -> String {
    name.0
        .iter()
        .map(|part| match part {
            ObjectNamePart::Identifier(ident) => ident.value.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn strip_quotes(s: &str) -> String {
    s.trim_matches(|c| c == '`' || c == '"').to_string()
}

fn last_segment(s: &str) -> String {
    strip_quotes(s.rsplit('.').next().unwrap_or(s))
}

fn table_from_display(rendered: &str) -> TableRef {
    TableRef::new(
        rendered
            .split('.')
            .map(strip_quotes)
            .collect::<Vec<_>>()
            .join("."),
    )
}

#[cfg(test)]
#[path = "lower_test.rs"]
mod tests;
