//! Binary crate for the `weather` command-line tool.
//!
//! This crate focuses on:
//! - Interactive location prompts
//! - Wiring config, IP lookup and the OpenWeather provider together
//! - Human-friendly output formatting

use clap::Parser;
use std::process::ExitCode;

mod cli;
mod output;
mod prompt;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let cmd = cli::Cli::parse();
    cmd.run().await
}

/// Diagnostics go to stderr at `warn` unless `RUST_LOG` says otherwise, so prompts stay readable.
fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if std::env::var("WEATHER_LOG_JSON").is_ok() {
        fmt().json().with_env_filter(env_filter).with_writer(std::io::stderr).init();
    } else {
        fmt().with_env_filter(env_filter).with_writer(std::io::stderr).with_target(false).init();
    }
}
