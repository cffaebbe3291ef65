//! Location resolution.
//!
//! Precedence, first satisfied wins:
//! 1. IP-detected city, if the caller confirms it (empty answer counts as yes)
//! 2. latitude + longitude, if both parse and are in range
//! 3. a non-empty manually entered city name
//!
//! Otherwise resolution fails with [`LocationError::NoLocationProvided`].

use tracing::{debug, warn};

use crate::{
    error::LocationError,
    geo::IpLocator,
    model::{LocationHint, ResolvedLocation},
};

/// Console seam for the interactive resolver. Implementations return the raw answer text;
/// interpretation happens in this module.
pub trait LocationPrompt {
    fn confirm_detected_city(&mut self, city: &str) -> Result<String, LocationError>;
    fn latitude(&mut self) -> Result<String, LocationError>;
    fn longitude(&mut self) -> Result<String, LocationError>;
    fn city_name(&mut self) -> Result<String, LocationError>;

    /// Informational message for the user, such as a degraded IP lookup.
    fn notify(&mut self, _message: &str) {}
}

/// Answers collected up front, e.g. from query parameters or a test.
#[derive(Debug, Clone, Default)]
pub struct LocationHints {
    pub detected_city: Option<String>,
    pub confirmation: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub city: Option<String>,
}

/// `""`, `y` and `yes` (any case) accept the suggestion.
pub fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes")
}

/// Both values must be present, finite, and within -90..=90 / -180..=180.
pub fn parse_coordinates(lat: &str, lon: &str) -> Option<(f64, f64)> {
    let (lat, lon) = (lat.trim(), lon.trim());
    if lat.is_empty() || lon.is_empty() {
        return None;
    }

    let lat: f64 = lat.parse().ok()?;
    let lon: f64 = lon.parse().ok()?;

    let valid = lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon);

    valid.then_some((lat, lon))
}

pub fn parse_city(input: &str) -> Option<String> {
    let city = input.trim();
    (!city.is_empty()).then(|| city.to_string())
}

/// Applies the precedence rules to answers that were already collected.
pub fn select_hint(hints: &LocationHints) -> Result<LocationHint, LocationError> {
    if let Some(city) = hints.detected_city.as_deref().and_then(parse_city) {
        let confirmed = hints.confirmation.as_deref().is_none_or(parse_confirmation);
        if confirmed {
            return Ok(LocationHint::IpGuess { city });
        }
    }

    let coords = match (hints.latitude.as_deref(), hints.longitude.as_deref()) {
        (Some(lat), Some(lon)) => parse_coordinates(lat, lon),
        _ => None,
    };
    if let Some((lat, lon)) = coords {
        return Ok(LocationHint::ManualCoords { lat, lon });
    }

    hints
        .city
        .as_deref()
        .and_then(parse_city)
        .map(|city| LocationHint::ManualCity { city })
        .ok_or(LocationError::NoLocationProvided)
}

/// Interactive resolver: optional IP lookup, then prompts only for what is still missing.
pub struct LocationResolver<'a> {
    locator: Option<&'a dyn IpLocator>,
}

impl<'a> LocationResolver<'a> {
    pub fn new(locator: Option<&'a dyn IpLocator>) -> Self {
        Self { locator }
    }

    pub async fn resolve(
        &self,
        prompt: &mut dyn LocationPrompt,
    ) -> Result<ResolvedLocation, LocationError> {
        self.resolve_hint(prompt).await.map(ResolvedLocation::from)
    }

    pub async fn resolve_hint(
        &self,
        prompt: &mut dyn LocationPrompt,
    ) -> Result<LocationHint, LocationError> {
        if let Some(city) = self.detect_city(prompt).await {
            let answer = prompt.confirm_detected_city(&city)?;
            if parse_confirmation(&answer) {
                return Ok(LocationHint::IpGuess { city });
            }
        }

        let lat = prompt.latitude()?;
        let lon = prompt.longitude()?;
        if !lat.trim().is_empty() && !lon.trim().is_empty() {
            match parse_coordinates(&lat, &lon) {
                Some((lat, lon)) => {
                    prompt.notify(&format!("Using manual coordinates: Lat={lat}, Lon={lon}"));
                    return Ok(LocationHint::ManualCoords { lat, lon });
                }
                None => prompt.notify("Invalid latitude or longitude. Falling back to city input."),
            }
        }

        parse_city(&prompt.city_name()?)
            .map(|city| LocationHint::ManualCity { city })
            .ok_or(LocationError::NoLocationProvided)
    }

    async fn detect_city(&self, prompt: &mut dyn LocationPrompt) -> Option<String> {
        let locator = self.locator?;

        match locator.detect_city().await {
            Ok(Some(city)) => {
                debug!(%city, "Detected approximate city from IP");
                Some(city)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "IP geolocation failed, falling back to manual input");
                prompt.notify(&format!("Error connecting to IP geolocation service: {err:#}"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;

    struct FixedLocator(anyhow::Result<Option<String>>);

    #[async_trait]
    impl IpLocator for FixedLocator {
        async fn detect_city(&self) -> anyhow::Result<Option<String>> {
            match &self.0 {
                Ok(city) => Ok(city.clone()),
                Err(err) => Err(anyhow::anyhow!("{err}")),
            }
        }
    }

    /// Replays scripted answers and records which prompts were shown.
    #[derive(Default)]
    struct Scripted {
        answers: VecDeque<&'static str>,
        asked: Vec<&'static str>,
        notices: Vec<String>,
    }

    impl Scripted {
        fn new(answers: &[&'static str]) -> Self {
            Self { answers: answers.iter().copied().collect(), ..Self::default() }
        }

        fn next(&mut self, prompt: &'static str) -> Result<String, LocationError> {
            self.asked.push(prompt);
            self.answers
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| LocationError::Prompt("script exhausted".into()))
        }
    }

    impl LocationPrompt for Scripted {
        fn confirm_detected_city(&mut self, _city: &str) -> Result<String, LocationError> {
            self.next("confirm")
        }
        fn latitude(&mut self) -> Result<String, LocationError> {
            self.next("lat")
        }
        fn longitude(&mut self) -> Result<String, LocationError> {
            self.next("lon")
        }
        fn city_name(&mut self) -> Result<String, LocationError> {
            self.next("city")
        }
        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    fn hints(
        detected: Option<&str>,
        confirmation: Option<&str>,
        lat: Option<&str>,
        lon: Option<&str>,
        city: Option<&str>,
    ) -> LocationHints {
        LocationHints {
            detected_city: detected.map(String::from),
            confirmation: confirmation.map(String::from),
            latitude: lat.map(String::from),
            longitude: lon.map(String::from),
            city: city.map(String::from),
        }
    }

    #[test]
    fn confirmation_accepts_empty_and_yes() {
        for answer in ["", "  ", "y", "Y", "yes", "YES"] {
            assert!(parse_confirmation(answer), "{answer:?} should confirm");
        }
        for answer in ["n", "no", "nope", "x"] {
            assert!(!parse_confirmation(answer), "{answer:?} should decline");
        }
    }

    #[test]
    fn coordinates_parse_and_validate() {
        assert_eq!(parse_coordinates("40.7128", "-74.0060"), Some((40.7128, -74.006)));
        assert_eq!(parse_coordinates(" 90 ", "-180"), Some((90.0, -180.0)));
        assert_eq!(parse_coordinates("abc", "10"), None);
        assert_eq!(parse_coordinates("10", ""), None);
        assert_eq!(parse_coordinates("91", "0"), None);
        assert_eq!(parse_coordinates("0", "180.5"), None);
        assert_eq!(parse_coordinates("NaN", "0"), None);
    }

    #[test]
    fn confirmed_ip_city_wins_over_manual_fields() {
        let h = hints(Some("Berlin"), Some(""), Some("1"), Some("2"), Some("Paris"));
        assert_eq!(select_hint(&h).unwrap(), LocationHint::IpGuess { city: "Berlin".into() });
    }

    #[test]
    fn coordinates_win_over_city_name() {
        let h = hints(None, None, Some("51.5"), Some("-0.12"), Some("Paris"));
        assert_eq!(select_hint(&h).unwrap(), LocationHint::ManualCoords { lat: 51.5, lon: -0.12 });
    }

    #[test]
    fn declined_ip_city_falls_through() {
        let h = hints(Some("Berlin"), Some("n"), None, None, Some("Paris"));
        assert_eq!(select_hint(&h).unwrap(), LocationHint::ManualCity { city: "Paris".into() });
    }

    #[test]
    fn invalid_coordinates_fall_through_to_city() {
        let h = hints(None, None, Some("north"), Some("10"), Some("Oslo"));
        assert_eq!(select_hint(&h).unwrap(), LocationHint::ManualCity { city: "Oslo".into() });
    }

    #[test]
    fn nothing_usable_is_no_location() {
        let h = hints(None, None, Some(""), Some(""), Some("   "));
        assert!(matches!(select_hint(&h), Err(LocationError::NoLocationProvided)));
    }

    #[tokio::test]
    async fn confirmed_detected_city_skips_manual_prompts() {
        let locator = FixedLocator(Ok(Some("Lisbon".into())));
        let mut prompt = Scripted::new(&[""]);

        let resolved = LocationResolver::new(Some(&locator)).resolve(&mut prompt).await.unwrap();

        assert_eq!(resolved, ResolvedLocation::City { name: "Lisbon".into() });
        assert_eq!(prompt.asked, vec!["confirm"]);
    }

    #[tokio::test]
    async fn declined_city_uses_coordinates() {
        let locator = FixedLocator(Ok(Some("Lisbon".into())));
        let mut prompt = Scripted::new(&["n", "40.7128", "-74.0060"]);

        let resolved = LocationResolver::new(Some(&locator)).resolve(&mut prompt).await.unwrap();

        assert_eq!(resolved, ResolvedLocation::Coordinates { lat: 40.7128, lon: -74.006 });
        assert_eq!(prompt.asked, vec!["confirm", "lat", "lon"]);
        assert_eq!(prompt.notices, vec!["Using manual coordinates: Lat=40.7128, Lon=-74.006"]);
    }

    #[tokio::test]
    async fn bad_coordinates_prompt_for_city() {
        let mut prompt = Scripted::new(&["forty", "-74", "New York"]);

        let resolved = LocationResolver::new(None).resolve(&mut prompt).await.unwrap();

        assert_eq!(resolved, ResolvedLocation::City { name: "New York".into() });
        assert_eq!(prompt.asked, vec!["lat", "lon", "city"]);
        assert_eq!(prompt.notices.len(), 1);
    }

    #[tokio::test]
    async fn ip_lookup_failure_is_not_fatal() {
        let locator = FixedLocator(Err(anyhow::anyhow!("connection refused")));
        let mut prompt = Scripted::new(&["", "", "Madrid"]);

        let resolved = LocationResolver::new(Some(&locator)).resolve(&mut prompt).await.unwrap();

        assert_eq!(resolved, ResolvedLocation::City { name: "Madrid".into() });
        assert!(prompt.notices[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn empty_answers_fail_with_no_location() {
        let locator = FixedLocator(Ok(None));
        let mut prompt = Scripted::new(&["", "", ""]);

        let err = LocationResolver::new(Some(&locator)).resolve(&mut prompt).await.unwrap_err();

        assert!(matches!(err, LocationError::NoLocationProvided));
        assert_eq!(prompt.asked, vec!["lat", "lon", "city"]);
    }
}
