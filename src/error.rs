//! Error types for roles-select.
//!
//! All failures are funnelled into [`DbError`] so the runner has a single
//! message to print, whatever went wrong.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("{message}")]
    Database {
        message: String,
        /// e.g., "42S02" for a missing table on MySQL
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Permission denied: {operation} - {reason}")]
    Permission { operation: String, reason: String },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u64,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    pub fn permission(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Permission {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// SQLSTATE reported by the server, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Database { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check the connection parameters and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced objects",
                )
            }
            sqlx::Error::RowNotFound => DbError::database(
                "No rows returned",
                None,
                "Verify the query conditions match existing data",
            ),
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::database(format!("Column not found: {}", col), None, "Check the column list")
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err = DbError::connection("Access denied for user 'root'", "Check credentials");
        assert_eq!(
            err.to_string(),
            "Connection failed: Access denied for user 'root'"
        );
        assert_eq!(err.suggestion(), Some("Check credentials"));
    }

    #[test]
    fn test_database_error_displays_driver_message_only() {
        let err = DbError::database(
            "Table 'go_study.roles' doesn't exist",
            Some("42S02".to_string()),
            "Check the table name",
        );
        assert_eq!(err.to_string(), "Table 'go_study.roles' doesn't exist");
        assert_eq!(err.sql_state(), Some("42S02"));
    }

    #[test]
    fn test_timeout_display() {
        let err = DbError::timeout("query execution", 30);
        assert_eq!(err.to_string(), "Timeout: query execution exceeded 30s");
        assert_eq!(err.suggestion(), None);
    }

    #[test]
    fn test_from_sqlx_row_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::Database { .. }));
    }

    #[test]
    fn test_from_sqlx_io_error_is_connection() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: DbError = sqlx::Error::Io(io).into();
        assert!(matches!(err, DbError::Connection { .. }));
        assert!(err.to_string().contains("refused"));
        assert_eq!(
            err.suggestion(),
            Some("Check network connectivity and database server status")
        );
    }
}
