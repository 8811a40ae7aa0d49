//! Data models for roles-select.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod query;

// Re-export commonly used types
pub use connection::{ConnectionConfig, ConnectionConfigError, DatabaseType};
pub use query::{
    ColumnMetadata, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_QUERY_TIMEOUT_SECS, QueryResult,
    ROLES_QUERY,
};
