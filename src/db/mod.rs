//! Database access layer.
//!
//! This module provides:
//! - A single database connection (no pooling)
//! - Row decoding into JSON values
//! - The `QueryClient` seam the runner drives

pub mod connection;
pub mod types;

pub use connection::{DbConnection, Timeouts};

use crate::error::DbResult;
use crate::models::QueryResult;
use std::future::Future;

/// A live session that can run one statement and be closed.
///
/// `close` consumes the client so a session cannot be closed twice.
pub trait QueryClient: Send {
    /// Execute `sql` and return every row the driver produced.
    fn fetch_all(&mut self, sql: &str) -> impl Future<Output = DbResult<QueryResult>> + Send;

    /// End the session.
    fn close(self) -> impl Future<Output = DbResult<()>> + Send;
}
