//! Parser dialects for call-site SQL

use regex::Regex;
use sqlparser::ast::Statement;
use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;
use sr_core::config::Dialect as ConfiguredDialect;
use std::sync::OnceLock;

use crate::error::{SqlError, SqlResult};

fn location_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Line: (\d+), Column: (\d+)").expect("valid regex"))
}

/// The sqlparser dialect matching the configured database backend.
#[derive(Debug)]
pub enum SqlDialect {
    /// MySQL / MariaDB, the framework's default backend
    MySql(MySqlDialect),
    Postgres(PostgreSqlDialect),
}

impl SqlDialect {
    pub fn configured(dialect: ConfiguredDialect) -> Self {
        match dialect {
            ConfiguredDialect::Mysql => SqlDialect::MySql(MySqlDialect {}),
            ConfiguredDialect::Postgres => SqlDialect::Postgres(PostgreSqlDialect {}),
        }
    }

    fn inner(&self) -> &dyn Dialect {
        match self {
            SqlDialect::MySql(d) => d as &dyn Dialect,
            SqlDialect::Postgres(d) => d,
        }
    }

    /// Parse SQL into AST statements
    pub fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        Parser::parse_sql(self.inner(), sql).map_err(|e| {
            let message = e.to_string();
            let (line, column) = error_location(&message);
            SqlError::ParseError {
                message,
                line,
                column,
            }
        })
    }
}

/// `(line, column)` from a rendered sqlparser error, `(0, 0)` when absent.
///
/// `ParserError` carries no structured location.
fn error_location(message: &str) -> (usize, usize) {
    location_re()
        .captures(message)
        .and_then(|caps| Some((caps[1].parse().ok()?, caps[2].parse().ok()?)))
        .unwrap_or((0, 0))
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
