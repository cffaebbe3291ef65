use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::error::ConfigError;

pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const BASE_URL_ENV: &str = "OPENWEATHER_BASE_URL";
pub const GEOCODING_URL_ENV: &str = "OPENWEATHER_GEOCODING_URL";
pub const IP_GEO_URL_ENV: &str = "WEATHER_IP_GEO_URL";
pub const BIND_ADDR_ENV: &str = "WEATHER_BIND_ADDR";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_GEOCODING_URL: &str = "https://api.openweathermap.org/geo/1.0";
pub const DEFAULT_IP_GEO_URL: &str = "http://ip-api.com/json/";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Top-level configuration.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// bind_addr = "0.0.0.0:8000"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeatherMap API key. Usually supplied through `OPENWEATHER_API_KEY`.
    pub api_key: Option<String>,

    /// Base URL of the OpenWeather 2.5 API, without the trailing `/weather`.
    pub base_url: String,

    /// Base URL of the OpenWeather geocoding API, without the trailing `/direct`.
    pub geocoding_url: String,

    /// IP geolocation endpoint returning `{"status": "success", "city": ...}`.
    pub ip_geo_url: String,

    /// Address the HTTP API listens on.
    pub bind_addr: String,

    /// Optional HTTP client timeout. Unset means the client library default.
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            ip_geo_url: DEFAULT_IP_GEO_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Load the config file (if any) and overlay process environment variables.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Overlay values from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(url) = get(BASE_URL_ENV) {
            self.base_url = url;
        }
        if let Some(url) = get(GEOCODING_URL_ENV) {
            self.geocoding_url = url;
        }
        if let Some(url) = get(IP_GEO_URL_ENV) {
            self.ip_geo_url = url;
        }
        if let Some(addr) = get(BIND_ADDR_ENV) {
            self.bind_addr = addr;
        }
    }

    /// Returns the API key, failing with [`ConfigError::InvalidCredential`] when absent or blank.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::InvalidCredential {
                path: Self::config_file_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "config.toml".to_string()),
            })
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        builder.build().context("Failed to build HTTP client")
    }
}
