//! roles-select library
//!
//! Opens one database connection, runs a single read-only statement
//! (`SELECT * FROM roles` unless overridden), prints the result set and
//! closes the connection.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod output;
pub mod runner;
pub mod sql_guard;

pub use config::Config;
pub use error::DbError;
pub use runner::{RunOutcome, open_and_run, run};
