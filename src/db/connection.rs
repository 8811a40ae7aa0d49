//! Single database connection.
//!
//! Opens exactly one driver connection (MySqlConnection or SqliteConnection),
//! never a pool, and closes it with the protocol-level goodbye.

use crate::db::QueryClient;
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::{
    ConnectionConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_QUERY_TIMEOUT_SECS, DatabaseType,
    QueryResult,
};
use futures_util::TryStreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Executor};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info};

/// Time limits for connecting and for running the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub query: Duration,
}

impl Timeouts {
    pub fn from_secs(connect_secs: u64, query_secs: u64) -> Self {
        Self {
            connect: Duration::from_secs(connect_secs),
            query: Duration::from_secs(query_secs),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_QUERY_TIMEOUT_SECS)
    }
}

/// Database-specific connection handle.
#[derive(Debug)]
pub enum Backend {
    MySql(MySqlConnection),
    SQLite(SqliteConnection),
}

/// An open connection plus the limit applied to each statement.
#[derive(Debug)]
pub struct DbConnection {
    backend: Backend,
    query_timeout: Duration,
}

impl DbConnection {
    /// Open a connection described by `config`.
    pub async fn open(config: &ConnectionConfig, timeouts: Timeouts) -> DbResult<Self> {
        info!(
            db_type = %config.db_type,
            target = %config.masked_url(),
            "Connecting to database"
        );

        let connect = async {
            let backend = match config.db_type {
                DatabaseType::MySQL => {
                    let mut options = MySqlConnectOptions::new()
                        .host(&config.host)
                        .username(&config.user)
                        .database(&config.database);
                    if let Some(port) = config.effective_port() {
                        options = options.port(port);
                    }
                    if !config.password.is_empty() {
                        options = options.password(&config.password);
                    }
                    Backend::MySql(options.connect().await?)
                }
                DatabaseType::SQLite => {
                    let options = SqliteConnectOptions::new()
                        .filename(&config.database)
                        .create_if_missing(false);
                    Backend::SQLite(options.connect().await?)
                }
            };
            Ok::<_, sqlx::Error>(backend)
        };

        let backend = match timeout(timeouts.connect, connect).await {
            Ok(Ok(backend)) => backend,
            Ok(Err(e)) => return Err(DbError::from(e)),
            Err(_) => return Err(DbError::timeout("connect", timeouts.connect.as_secs())),
        };

        info!(db_type = %config.db_type, "Connected successfully");

        Ok(Self {
            backend,
            query_timeout: timeouts.query,
        })
    }

    pub fn db_type(&self) -> DatabaseType {
        match self.backend {
            Backend::MySql(_) => DatabaseType::MySQL,
            Backend::SQLite(_) => DatabaseType::SQLite,
        }
    }
}

impl QueryClient for DbConnection {
    async fn fetch_all(&mut self, sql: &str) -> DbResult<QueryResult> {
        let start = Instant::now();
        debug!(
            sql = %sql,
            timeout_secs = self.query_timeout.as_secs(),
            "Executing query"
        );

        // Raw SQL (text protocol), no prepared statement
        let result = match &mut self.backend {
            Backend::MySql(conn) => {
                let rows = conn.fetch(sql).try_collect::<Vec<_>>();
                timeout(self.query_timeout, rows)
                    .await
                    .map(|r| r.map(|rows| process_rows(rows, start)))
            }
            Backend::SQLite(conn) => {
                let rows = conn.fetch(sql).try_collect::<Vec<_>>();
                timeout(self.query_timeout, rows)
                    .await
                    .map(|r| r.map(|rows| process_rows(rows, start)))
            }
        };

        match result {
            Ok(Ok(result)) => {
                debug!(
                    rows = result.row_count(),
                    execution_time_ms = result.execution_time_ms,
                    "Query finished"
                );
                Ok(result)
            }
            Ok(Err(e)) => Err(DbError::from(e)),
            Err(_) => Err(DbError::timeout(
                "query execution",
                self.query_timeout.as_secs(),
            )),
        }
    }

    async fn close(self) -> DbResult<()> {
        let db_type = self.db_type();
        match self.backend {
            Backend::MySql(conn) => conn.close().await?,
            Backend::SQLite(conn) => conn.close().await?,
        }
        info!(db_type = %db_type, "Connection closed");
        Ok(())
    }
}

/// Collect driver rows into a QueryResult, preserving order.
fn process_rows<R: RowToJson>(rows: Vec<R>, start: Instant) -> QueryResult {
    let execution_time_ms = start.elapsed().as_millis() as u64;

    let Some(first) = rows.first() else {
        return QueryResult::empty(execution_time_ms);
    };

    // Row objects hold one value per name (the last column wins), so the
    // column list keeps one entry per name too.
    let mut columns = first.get_column_metadata();
    let mut seen = HashSet::new();
    columns.retain(|c| seen.insert(c.name.clone()));

    QueryResult {
        columns,
        rows: rows.iter().map(RowToJson::to_json_map).collect(),
        execution_time_ms,
    }
}
