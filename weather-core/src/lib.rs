//! Core library for the `weather` CLI and the `weather-server` HTTP API.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Location resolution (IP guess, coordinates, city name)
//! - The OpenWeather provider: current weather and city search, with response normalization
//! - Shared domain models and errors
//!
//! Data flows one way: hints → [`LocationResolver`] → [`ResolvedLocation`] →
//! [`WeatherProvider`] → [`WeatherResult`] or [`WeatherError`].

pub mod config;
pub mod error;
pub mod geo;
pub mod location;
pub mod model;
pub mod provider;

pub use config::Config;
pub use error::{ConfigError, LocationError, WeatherError};
pub use geo::{IpApiLocator, IpLocator};
pub use location::{LocationHints, LocationPrompt, LocationResolver, select_hint};
pub use model::{LocationHint, ResolvedLocation, SearchSuggestion, WeatherResult};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
