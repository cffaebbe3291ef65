use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;
use weather_core::{
    Config, IpApiLocator, IpLocator, LocationError, LocationPrompt, LocationResolver,
    ResolvedLocation, WeatherError, WeatherProvider, WeatherResult, provider_from_config,
};

use crate::{output, prompt::InquirePrompt};

/// Top-level CLI struct. Location is gathered interactively.
#[derive(Debug, Parser)]
#[command(
    name = "weather",
    version,
    about = "Current weather for your IP location, coordinates or a city",
    long_about = "Current weather for your IP location, coordinates or a city.\n\n\
                  Requires OPENWEATHER_API_KEY in the environment, a .env file, or the config file."
)]
pub struct Cli {}

#[derive(Debug)]
pub enum LookupError {
    Location(LocationError),
    Weather(WeatherError),
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let config = Config::load().context("Failed to load configuration")?;
        let (provider, locator) = prepare(&config)?;

        println!("Attempting to get approximate location via IP address...");
        let mut prompt = InquirePrompt::default();

        match lookup(provider.as_ref(), Some(&locator), &mut prompt).await {
            Ok((location, weather)) => {
                println!("{}", output::render_weather(&location, &weather));
                Ok(ExitCode::SUCCESS)
            }
            Err(LookupError::Location(LocationError::NoLocationProvided)) => {
                println!("No valid location provided. Exiting.");
                Ok(ExitCode::FAILURE)
            }
            Err(LookupError::Location(err)) => {
                println!("{err}");
                Ok(ExitCode::FAILURE)
            }
            Err(LookupError::Weather(err)) => {
                println!("{}", output::render_error(&err));
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

/// Build the provider and IP locator. Fails on a missing API key before any network traffic,
/// IP lookup included.
pub fn prepare(config: &Config) -> anyhow::Result<(Box<dyn WeatherProvider>, IpApiLocator)> {
    let provider = provider_from_config(config)?;
    let locator = IpApiLocator::with_client(config.ip_geo_url.clone(), config.http_client()?);
    Ok((provider, locator))
}

/// Resolve a location, then fetch its current weather. Exactly one weather request is made.
pub async fn lookup(
    provider: &dyn WeatherProvider,
    locator: Option<&dyn IpLocator>,
    prompt: &mut dyn LocationPrompt,
) -> Result<(ResolvedLocation, WeatherResult), LookupError> {
    let location = LocationResolver::new(locator)
        .resolve(prompt)
        .await
        .map_err(LookupError::Location)?;

    match &location {
        ResolvedLocation::City { name } => println!("Fetching weather data for {name}..."),
        ResolvedLocation::Coordinates { lat, lon } => {
            println!("Fetching weather data for Lat={lat}, Lon={lon}...")
        }
    }
    info!(%location, "Resolved location");

    let weather = provider.current_weather(&location).await.map_err(LookupError::Weather)?;
    Ok((location, weather))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use weather_core::SearchSuggestion;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

    #[derive(Debug, Default)]
    struct RecordingProvider {
        seen: Mutex<Vec<ResolvedLocation>>,
        fail_with: Option<WeatherError>,
    }

    #[async_trait]
    impl WeatherProvider for RecordingProvider {
        async fn current_weather(&self, location: &ResolvedLocation) -> Result<WeatherResult, WeatherError> {
            self.seen.lock().unwrap().push(location.clone());
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            Ok(WeatherResult {
                city: location.to_string(),
                temperature_celsius: 20.0,
                humidity_percent: 50,
                wind_speed: 1.0,
                pressure_hpa: None,
                description: "Clear Sky".into(),
            })
        }

        async fn geocode(&self, _query: &str) -> Result<Vec<SearchSuggestion>, WeatherError> {
            Ok(Vec::new())
        }
    }

    struct Answers(Vec<&'static str>);

    impl Answers {
        fn next(&mut self) -> Result<String, LocationError> {
            if self.0.is_empty() {
                return Err(LocationError::Prompt("no more answers".into()));
            }
            Ok(self.0.remove(0).to_string())
        }
    }

    impl LocationPrompt for Answers {
        fn confirm_detected_city(&mut self, _city: &str) -> Result<String, LocationError> {
            self.next()
        }
        fn latitude(&mut self) -> Result<String, LocationError> {
            self.next()
        }
        fn longitude(&mut self) -> Result<String, LocationError> {
            self.next()
        }
        fn city_name(&mut self) -> Result<String, LocationError> {
            self.next()
        }
    }

    #[test]
    fn cli_accepts_no_arguments() {
        assert!(Cli::try_parse_from(["weather"]).is_ok());
        assert!(Cli::try_parse_from(["weather", "London"]).is_err());
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_ip_lookup() {
        let ip_api = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&ip_api)
            .await;

        let config = Config { api_key: None, ip_geo_url: ip_api.uri(), ..Config::default() };
        let err = prepare(&config).err().expect("missing key must fail");

        assert!(err.to_string().contains("API key not found"));
        assert!(err.to_string().contains("OPENWEATHER_API_KEY"));
    }

    #[tokio::test]
    async fn prepare_uses_configured_ip_endpoint() {
        let ip_api = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "success", "city": "Lisbon"})),
            )
            .expect(1)
            .mount(&ip_api)
            .await;

        let config =
            Config { api_key: Some("KEY".into()), ip_geo_url: ip_api.uri(), ..Config::default() };
        let (_provider, locator) = prepare(&config).unwrap();

        assert_eq!(locator.detect_city().await.unwrap(), Some("Lisbon".to_string()));
    }

    #[tokio::test]
    async fn manual_city_is_fetched_once() {
        let provider = RecordingProvider::default();
        let mut answers = Answers(vec!["", "", "London"]);

        let (location, weather) = lookup(&provider, None, &mut answers).await.unwrap();

        assert_eq!(location, ResolvedLocation::City { name: "London".into() });
        assert_eq!(weather.city, "London");
        assert_eq!(provider.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn no_location_skips_weather_request() {
        let provider = RecordingProvider::default();
        let mut answers = Answers(vec!["", "", ""]);

        let err = lookup(&provider, None, &mut answers).await.unwrap_err();

        assert!(matches!(err, LookupError::Location(LocationError::NoLocationProvided)));
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_errors_are_surfaced() {
        let provider = RecordingProvider { fail_with: Some(WeatherError::NotFound), ..Default::default() };
        let mut answers = Answers(vec!["1.5", "2.5"]);

        let err = lookup(&provider, None, &mut answers).await.unwrap_err();

        assert!(matches!(err, LookupError::Weather(WeatherError::NotFound)));
        assert_eq!(
            provider.seen.lock().unwrap().as_slice(),
            &[ResolvedLocation::Coordinates { lat: 1.5, lon: 2.5 }]
        );
    }
}
