use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::{DEFAULT_BASE_URL, DEFAULT_GEOCODING_URL},
    error::WeatherError,
    model::{ResolvedLocation, SearchSuggestion, WeatherResult, title_case},
};

use super::WeatherProvider;

/// Matches requested from the geocoding endpoint.
pub const GEOCODE_LIMIT: u8 = 5;

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    geocoding_url: String,
    http: Client,
}

// Keeps the API key out of logs.
impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("base_url", &self.base_url)
            .field("geocoding_url", &self.geocoding_url)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_client(api_key, DEFAULT_BASE_URL.to_string(), Client::new())
    }

    pub fn with_client(api_key: String, base_url: String, http: Client) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            api_key,
            base_url,
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            http,
        }
    }

    pub fn with_geocoding_url(mut self, url: String) -> Self {
        self.geocoding_url = url.trim_end_matches('/').to_string();
        self
    }

    fn query_for(&self, location: &ResolvedLocation) -> Vec<(&'static str, String)> {
        let mut query = match location {
            ResolvedLocation::City { name } => vec![("q", name.clone())],
            ResolvedLocation::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };
        query.push(("appid", self.api_key.clone()));
        query.push(("units", "metric".to_string()));
        query
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, location: &ResolvedLocation) -> Result<WeatherResult, WeatherError> {
        let url = format!("{}/weather", self.base_url);
        debug!(%location, "Fetching current weather from OpenWeather");

        let res = self.http.get(&url).query(&self.query_for(location)).send().await?;

        let status = res.status();
        let body = res.text().await?;

        debug!(%status, "OpenWeather responded");
        normalize_response(status, &body)
    }

    async fn geocode(&self, query: &str) -> Result<Vec<SearchSuggestion>, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/direct", self.geocoding_url);
        debug!(%query, "Searching OpenWeather geocoding");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", query.to_string()),
                ("limit", GEOCODE_LIMIT.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        debug!(%status, "OpenWeather geocoding responded");
        normalize_geocode(status, &body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
    #[serde(default)]
    pressure: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
    #[serde(default)]
    state: Option<String>,
}

impl From<OwGeoMatch> for SearchSuggestion {
    fn from(m: OwGeoMatch) -> Self {
        Self { name: m.name, lat: m.lat, lon: m.lon, country: m.country, state: m.state }
    }
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
}

/// Maps an OpenWeather "current weather" response onto [`WeatherResult`].
pub fn normalize_response(status: StatusCode, body: &str) -> Result<WeatherResult, WeatherError> {
    let payload: Result<Value, _> = serde_json::from_str(body);
    if let Some(err) = classify_failure(status, payload.as_ref().ok(), body) {
        return Err(err);
    }

    let payload = payload
        .map_err(|e| WeatherError::network(format!("Malformed JSON from OpenWeather: {e}")))?;

    let parsed: OwCurrentResponse = serde_json::from_value(payload)
        .map_err(|e| WeatherError::provider(format!("Unexpected OpenWeather response: {e}")))?;

    let description = parsed
        .weather
        .first()
        .map(|w| title_case(&w.description))
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(WeatherResult {
        city: parsed.name,
        temperature_celsius: parsed.main.temp,
        humidity_percent: parsed.main.humidity,
        wind_speed: parsed.wind.speed,
        pressure_hpa: parsed.main.pressure,
        description,
    })
}

/// Maps an OpenWeather geocoding response onto [`SearchSuggestion`]s. No match is an empty list.
pub fn normalize_geocode(status: StatusCode, body: &str) -> Result<Vec<SearchSuggestion>, WeatherError> {
    let payload: Result<Value, _> = serde_json::from_str(body);
    if let Some(err) = classify_failure(status, payload.as_ref().ok(), body) {
        return Err(err);
    }

    let payload = payload
        .map_err(|e| WeatherError::network(format!("Malformed JSON from OpenWeather: {e}")))?;

    let matches: Vec<OwGeoMatch> = serde_json::from_value(payload)
        .map_err(|e| WeatherError::provider(format!("Unexpected OpenWeather geocoding response: {e}")))?;

    Ok(matches.into_iter().map(SearchSuggestion::from).collect())
}

/// Status and `cod` checks shared by every OpenWeather endpoint. `None` means the body should be parsed.
fn classify_failure(status: StatusCode, payload: Option<&Value>, body: &str) -> Option<WeatherError> {
    let cod = payload.and_then(|p| p.get("cod"));

    if status == StatusCode::UNAUTHORIZED || cod_matches(cod, 401) {
        return Some(WeatherError::InvalidApiKey);
    }

    if status == StatusCode::NOT_FOUND || cod_matches(cod, 404) {
        return Some(WeatherError::NotFound);
    }

    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        let message = payload
            .and_then(|p| p.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("status {status}: {}", truncate_body(body)));
        return Some(WeatherError::provider(message));
    }

    (status != StatusCode::OK).then_some(WeatherError::NotFound)
}

/// OpenWeather reports `cod` as a number on some errors and a string on others.
fn cod_matches(cod: Option<&Value>, expected: u64) -> bool {
    match cod {
        Some(Value::Number(n)) => n.as_u64() == Some(expected),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok() == Some(expected),
        _ => false,
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
