//! roles-select - Main entry point.
//!
//! Connects, runs `SELECT * FROM roles`, prints the rows between two separator
//! lines and closes the connection.

use clap::Parser;
use roles_select::config::Config;
use roles_select::runner::{self, ERROR_PREFIX};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries only the result set.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    if config.enable_logs {
        init_tracing(&config);
    }

    info!(
        format = %config.format,
        "Starting roles-select v{}",
        env!("CARGO_PKG_VERSION")
    );

    let conn_config = match config.connection_config() {
        Ok(c) => c,
        Err(e) => {
            println!("{ERROR_PREFIX} {e}");
            std::process::exit(1);
        }
    };

    let mut stdout = std::io::stdout();
    let outcome = runner::open_and_run(
        &conn_config,
        &config.query,
        config.format,
        config.timeouts(),
        &mut stdout,
    )
    .await?;

    info!(success = outcome.is_success(), "Done");

    if !outcome.is_success() {
        std::process::exit(outcome.exit_code());
    }
    Ok(())
}
