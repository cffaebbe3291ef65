use crate::{
    Config, ResolvedLocation, SearchSuggestion, WeatherError, WeatherResult,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Performs exactly one request; failures are terminal for the call.
    async fn current_weather(&self, location: &ResolvedLocation) -> Result<WeatherResult, WeatherError>;

    /// City-name search returning candidate places, best match first.
    async fn geocode(&self, query: &str) -> Result<Vec<SearchSuggestion>, WeatherError>;
}

/// Construct the OpenWeather provider from config. Fails when no API key is configured.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;

    let provider = OpenWeatherProvider::with_client(
        api_key.to_owned(),
        config.base_url.clone(),
        config.http_client()?,
    )
    .with_geocoding_url(config.geocoding_url.clone());

    Ok(Box::new(provider))
}
