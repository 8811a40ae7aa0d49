//! The open → query → print → close sequence.
//!
//! Success prints the result set between two separator lines. Failure prints
//! the error message with an `[SELECT ERROR] - ` prefix and skips the result
//! set. An opened client is closed exactly once on both paths.

use crate::db::{DbConnection, QueryClient, Timeouts};
use crate::error::DbError;
use crate::models::ConnectionConfig;
use crate::output::{self, OutputFormat};
use crate::sql_guard;
use std::io::{self, Write};
use tracing::{error, info, warn};

pub const SELECT_HEADER: &str = "--------------------------SELECT----------------------------";
pub const SELECT_FOOTER: &str = "------------------------------------------------------------";
pub const ERROR_PREFIX: &str = "[SELECT ERROR] - ";

/// What ended up on the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The result set was printed
    Printed { rows: usize },
    /// An error message was printed instead of the result set
    Failed { message: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Printed { .. })
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Run `sql` on an already open client, print the outcome and close the client.
///
/// Only an I/O error writing to `out` is returned as `Err`; the client is
/// still closed first.
pub async fn run<C, W>(
    mut client: C,
    sql: &str,
    format: OutputFormat,
    out: &mut W,
) -> io::Result<RunOutcome>
where
    C: QueryClient,
    W: Write,
{
    let (outcome, written) = match client.fetch_all(sql).await {
        Ok(result) => {
            info!(rows = result.row_count(), "Query succeeded");
            let rows = result.row_count();
            let body = output::render(&result, format);
            let written = writeln!(out, "{SELECT_HEADER}")
                .and_then(|_| writeln!(out, "{body}"))
                .and_then(|_| writeln!(out, "{SELECT_FOOTER}\n\n"));
            (RunOutcome::Printed { rows }, written)
        }
        Err(e) => {
            error!(
                error = %e,
                sql_state = ?e.sql_state(),
                suggestion = ?e.suggestion(),
                "Query failed"
            );
            let written = print_error(out, &e);
            (
                RunOutcome::Failed {
                    message: e.to_string(),
                },
                written,
            )
        }
    };

    if let Err(e) = client.close().await {
        warn!(error = %e, "Failed to close connection cleanly");
    }

    written.and_then(|_| out.flush())?;
    Ok(outcome)
}

/// Validate `sql`, connect with `config` and hand over to [`run`].
///
/// Nothing is opened when validation or the connection fails, so nothing is closed.
pub async fn open_and_run<W: Write>(
    config: &ConnectionConfig,
    sql: &str,
    format: OutputFormat,
    timeouts: Timeouts,
    out: &mut W,
) -> io::Result<RunOutcome> {
    if let Err(e) = sql_guard::validate_readonly(sql, config.db_type) {
        warn!(error = %e, "Statement rejected");
        return report_failure(out, e);
    }

    let client = match DbConnection::open(config, timeouts).await {
        Ok(client) => client,
        Err(e) => {
            error!(
                error = %e,
                target = %config.masked_url(),
                suggestion = ?e.suggestion(),
                "Connection failed"
            );
            return report_failure(out, e);
        }
    };

    run(client, sql, format, out).await
}

fn print_error<W: Write>(out: &mut W, err: &DbError) -> io::Result<()> {
    // Two-argument console output: prefix, a space, then the message
    writeln!(out, "{ERROR_PREFIX} {err}")
}

fn report_failure<W: Write>(out: &mut W, err: DbError) -> io::Result<RunOutcome> {
    print_error(out, &err)?;
    out.flush()?;
    Ok(RunOutcome::Failed {
        message: err.to_string(),
    })
}
