//! API route handlers.
//!
//! Every request resolves and fetches independently; the only shared state is the provider.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use weather_core::{
    LocationError, LocationHints, ResolvedLocation, SearchSuggestion, WeatherError,
    WeatherProvider, WeatherResult, select_hint,
};

/// Shared state accessible by all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub provider: Arc<dyn WeatherProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Query form of `/weather`. Values stay strings so unparseable numbers fall through to `city`.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeocodeQuery {
    pub q: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    Weather(WeatherError),
    Location(LocationError),
    /// Malformed query string or missing parameter.
    BadRequest(String),
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        Self::Weather(err)
    }
}

impl From<LocationError> for ApiError {
    fn from(err: LocationError) -> Self {
        Self::Location(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            ApiError::Weather(WeatherError::NotFound) => {
                (StatusCode::NOT_FOUND, "City not found".to_string())
            }
            ApiError::Weather(WeatherError::InvalidApiKey) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Weather provider rejected the configured API key".to_string(),
            ),
            ApiError::Weather(err @ WeatherError::ProviderError { .. }) => {
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            ApiError::Weather(err @ WeatherError::NetworkError { .. }) => {
                (StatusCode::GATEWAY_TIMEOUT, err.to_string())
            }
            ApiError::Location(_) => (
                StatusCode::BAD_REQUEST,
                "Provide 'lat' and 'lon' (within -90..90 and -180..180) or a non-empty 'city'"
                    .to_string(),
            ),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();

        if status.is_server_error() {
            error!(%status, %detail, "Weather lookup failed");
        } else {
            warn!(%status, %detail, "Weather lookup rejected");
        }

        (status, Json(ErrorBody { detail })).into_response()
    }
}

/// `GET /`
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse { status: "Weather API running" })
}

/// `GET /weather/:city`
pub async fn weather_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<WeatherResult>, ApiError> {
    let name = city.trim();
    if name.is_empty() {
        return Err(WeatherError::NotFound.into());
    }

    let location = ResolvedLocation::City { name: name.to_string() };
    let result = state.provider.current_weather(&location).await?;
    Ok(Json(result))
}

/// `GET /weather?lat=..&lon=..` or `GET /weather?city=..`; coordinates win when both are valid.
pub async fn weather_by_query(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<WeatherResult>, ApiError> {
    let Query(query) = query?;
    let hint = select_hint(&LocationHints {
        latitude: query.lat,
        longitude: query.lon,
        city: query.city,
        ..LocationHints::default()
    })?;

    let location = ResolvedLocation::from(hint);
    let result = state.provider.current_weather(&location).await?;
    Ok(Json(result))
}

/// `GET /geocode?q=..`: up to five candidate places for a city-name search.
pub async fn geocode(
    State(state): State<AppState>,
    query: Result<Query<GeocodeQuery>, QueryRejection>,
) -> Result<Json<Vec<SearchSuggestion>>, ApiError> {
    let Query(query) = query?;
    let term = query.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(ApiError::BadRequest("Query parameter 'q' must not be empty".to_string()));
    }

    let suggestions = state.provider.geocode(term).await?;
    Ok(Json(suggestions))
}
