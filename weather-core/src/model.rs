use serde::Serialize;
use std::fmt;

/// Raw location hint gathered during resolution. Exactly one is produced per run.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationHint {
    /// City detected from the caller's IP address and confirmed by the caller.
    IpGuess { city: String },
    ManualCity { city: String },
    ManualCoords { lat: f64, lon: f64 },
}

/// Location descriptor handed to a [`crate::WeatherProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedLocation {
    City { name: String },
    /// Latitude in -90..=90, longitude in -180..=180.
    Coordinates { lat: f64, lon: f64 },
}

impl From<LocationHint> for ResolvedLocation {
    fn from(hint: LocationHint) -> Self {
        match hint {
            LocationHint::IpGuess { city } | LocationHint::ManualCity { city } => {
                ResolvedLocation::City { name: city }
            }
            LocationHint::ManualCoords { lat, lon } => ResolvedLocation::Coordinates { lat, lon },
        }
    }
}

impl fmt::Display for ResolvedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedLocation::City { name } => f.write_str(name),
            ResolvedLocation::Coordinates { lat, lon } => write!(f, "Lat: {lat}, Lon: {lon}"),
        }
    }
}

/// Normalized current conditions, serialized as-is by the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherResult {
    pub city: String,
    pub temperature_celsius: f64,
    pub humidity_percent: u8,
    pub wind_speed: f64,
    pub pressure_hpa: Option<u32>,
    pub description: String,
}

/// One match of a city-name search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSuggestion {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Upper-cases the first letter of every whitespace-separated word and lower-cases the rest.
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
