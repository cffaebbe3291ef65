use thiserror::Error;

/// Failure of a single current-weather lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("City not found")]
    NotFound,

    #[error("Invalid OpenWeatherMap API key")]
    InvalidApiKey,

    #[error("Weather provider error: {message}")]
    ProviderError { message: String },

    #[error("Network error while contacting weather provider: {message}")]
    NetworkError { message: String },
}

impl WeatherError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::ProviderError { message: message.into() }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError { message: message.into() }
    }
}

// The request URL carries `appid`, so it is stripped from the message.
impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(err.without_url().to_string())
    }
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("No valid location provided")]
    NoLocationProvided,

    /// The interactive prompt was cancelled or its input stream failed.
    #[error("Location input aborted: {0}")]
    Prompt(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "OpenWeatherMap API key not found.\n\
         Hint: set OPENWEATHER_API_KEY in the environment, a .env file, or `api_key` in {path}."
    )]
    InvalidCredential { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_matches_api_detail() {
        assert_eq!(WeatherError::NotFound.to_string(), "City not found");
    }

    #[test]
    fn constructors_keep_message() {
        let err = WeatherError::provider("upstream exploded");
        assert_eq!(err, WeatherError::ProviderError { message: "upstream exploded".into() });
        assert!(err.to_string().contains("upstream exploded"));

        let err = WeatherError::network("connection refused");
        assert!(matches!(err, WeatherError::NetworkError { ref message } if message == "connection refused"));
    }
}
