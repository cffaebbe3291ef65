//! `weather-server` entry point. Loads configuration, initialises structured
//! logging, validates the OpenWeather credential and serves the API.

use anyhow::Result;
use weather_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config = Config::load()?;

    // Fails with a missing-credential error before binding.
    weather_server::serve(&config).await
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("weather_server=info,weather_core=info,tower_http=info"));

    if std::env::var("WEATHER_LOG_JSON").is_ok() {
        fmt().json().with_env_filter(env_filter).with_target(true).init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
