//! Read-only validation for the statement being run.
//!
//! The statement can be overridden with `--query`, so it is parsed with
//! [sqlparser](https://docs.rs/sqlparser/) in the backend's dialect before any
//! connection is opened. Exactly one read-only statement is accepted.

use crate::error::{DbError, DbResult};
use crate::models::DatabaseType;
use sqlparser::ast::Statement;
use sqlparser::dialect::{Dialect, MySqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

const NOT_READ_ONLY: &str = "Only read-only statements (SELECT, SHOW, EXPLAIN) can be run.";

fn get_dialect(db_type: DatabaseType) -> Box<dyn Dialect> {
    match db_type {
        DatabaseType::MySQL => Box::new(MySqlDialect {}),
        DatabaseType::SQLite => Box::new(SQLiteDialect {}),
    }
}

/// Validate `sql` as a single read-only statement.
///
/// # Examples
///
/// ```
/// use roles_select::models::DatabaseType;
/// use roles_select::sql_guard::validate_readonly;
///
/// assert!(validate_readonly("SELECT * FROM roles", DatabaseType::MySQL).is_ok());
/// assert!(validate_readonly("DELETE FROM roles", DatabaseType::MySQL).is_err());
/// ```
pub fn validate_readonly(sql: &str, db_type: DatabaseType) -> DbResult<()> {
    if sql.trim().is_empty() {
        return Err(DbError::invalid_input("Empty SQL statement"));
    }

    let dialect = get_dialect(db_type);
    let statements = Parser::parse_sql(dialect.as_ref(), sql).map_err(|e| {
        DbError::invalid_input(format!("Failed to parse SQL statement. Error: {}", e))
    })?;

    match statements.as_slice() {
        [] => Err(DbError::invalid_input("Empty SQL statement")),
        [stmt] if is_read_only(stmt) => Ok(()),
        [_] => Err(DbError::permission(leading_keyword(sql), NOT_READ_ONLY)),
        _ => Err(DbError::invalid_input(format!(
            "Expected a single statement, found {}",
            statements.len()
        ))),
    }
}

fn is_read_only(stmt: &Statement) -> bool {
    match stmt {
        Statement::Query(_)
        | Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowDatabases { .. }
        | Statement::ShowCreate { .. }
        | Statement::ShowVariables { .. }
        | Statement::ShowStatus { .. }
        | Statement::ExplainTable { .. } => true,
        // EXPLAIN ANALYZE executes its statement
        Statement::Explain {
            statement, analyze, ..
        } => !*analyze && is_read_only(statement),
        _ => false,
    }
}

fn leading_keyword(sql: &str) -> String {
    sql.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}
