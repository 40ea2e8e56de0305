//! SELECT routing between the minimal-ORM and Query Builder generators.

use sr_sql::SelectQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Orm,
    QueryBuilder,
}

/// ORM only for a single table with no joins, grouping, set operations,
/// aggregates or subqueries.
pub fn route(select: &SelectQuery) -> Route {
    let single_table = select.from.len() == 1
        && select.joins.is_empty()
        && select.unsupported_from.is_empty();
    let orm = single_table
        && select.group_by.is_empty()
        && select.having.is_none()
        && select.set_ops.is_empty()
        && !select.has_aggregate_projection()
        && !select.has_subquery();
    if orm {
        Route::Orm
    } else {
        Route::QueryBuilder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sr_sql::{analyze, normalize, ParsedQuery, SqlParser};

    fn route_sql(sql: &str) -> Route {
        match analyze(&SqlParser::mysql(), &normalize(sql)).unwrap().query {
            ParsedQuery::Select(select) => route(&select),
            other => panic!("expected SELECT, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_selects_route_to_orm() {
        for sql in [
            "SELECT name FROM tabUser",
            "SELECT * FROM tabNote WHERE owner = %(user)s",
            "SELECT DISTINCT owner FROM tabNote ORDER BY creation DESC LIMIT 5",
            "SELECT name, title FROM tabNote WHERE a = 1 OR b LIKE 'x%'",
            "SELECT name FROM tabItem WHERE name IN ('a', 'b') AND disabled = 0",
        ] {
            assert_eq!(route_sql(sql), Route::Orm, "{sql}");
        }
    }

    #[test]
    fn test_each_disqualifier_routes_to_query_builder() {
        for sql in [
            "SELECT a.name FROM tabA a JOIN tabB b ON a.name = b.parent",
            "SELECT a.name FROM tabA a, tabB b WHERE a.name = b.parent",
            "SELECT COUNT(name) FROM tabUser",
            "SELECT owner FROM tabNote GROUP BY owner",
            "SELECT owner FROM tabNote HAVING owner = 'x'",
            "SELECT name FROM tabA UNION SELECT name FROM tabB",
            "SELECT name FROM tabA WHERE name IN (SELECT parent FROM tabB)",
            "SELECT name FROM tabA WHERE EXISTS (SELECT 1 FROM tabB)",
            "SELECT x FROM (SELECT name AS x FROM tabA) t",
        ] {
            assert_eq!(route_sql(sql), Route::QueryBuilder, "{sql}");
        }
    }
}
