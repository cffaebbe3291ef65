//! Weather API — Axum web server over `weather-core`.
//!
//! Serves `GET /`, `GET /weather/:city`, `GET /weather?lat=&lon=` and `GET /geocode?q=`.
//! CORS is fully open, credentials included.

pub mod routes;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use weather_core::{Config, WeatherProvider, provider_from_config};

pub use routes::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Wildcards are not allowed together with credentials, so echo the request instead.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/", get(routes::status))
        .route("/weather", get(routes::weather_by_query))
        .route("/weather/:city", get(routes::weather_by_city))
        .route("/geocode", get(routes::geocode))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router backed by the OpenWeather provider. Fails when no API key is configured.
pub fn app_from_config(config: &Config) -> Result<Router> {
    let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(config)?);
    Ok(build_router(AppState::new(provider)))
}

/// Validate the credential, bind, and serve until Ctrl-C. Nothing is bound without a key.
pub async fn serve(config: &Config) -> Result<()> {
    let app = app_from_config(config)?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Weather API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Weather API server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
