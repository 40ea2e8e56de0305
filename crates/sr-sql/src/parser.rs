//! SQL parser wrapper

use crate::dialect::SqlDialect;
use crate::error::{SqlError, SqlResult};
use sqlparser::ast::Statement;
use sr_core::Dialect;

/// SQL parser that wraps sqlparser-rs with dialect support
#[derive(Debug)]
pub struct SqlParser {
    dialect: SqlDialect,
}

impl SqlParser {
    /// Create a parser with the MySQL dialect
    pub fn mysql() -> Self {
        Self::for_dialect(Dialect::Mysql)
    }

    /// Create a parser for a configured dialect
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect: SqlDialect::configured(dialect),
        }
    }

    /// Parse SQL into AST statements
    pub fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptySql);
        }

        self.dialect.parse(sql)
    }

    /// Parse SQL and return the first statement
    pub fn parse_single(&self, sql: &str) -> SqlResult<Statement> {
        let stmts = self.parse(sql)?;
        if stmts.len() > 1 {
            log::debug!(
                "{} statements in one call, only the first is analysed",
                stmts.len()
            );
        }
        stmts.into_iter().next().ok_or(SqlError::EmptySql)
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::mysql()
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
