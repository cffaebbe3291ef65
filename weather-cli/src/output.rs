use weather_core::{ResolvedLocation, WeatherError, WeatherResult};

/// Console rendering of a successful lookup.
pub fn render_weather(location: &ResolvedLocation, weather: &WeatherResult) -> String {
    let mut out = format!("--- Current Weather in {location} ---\n");
    out.push_str(&format!("  Temperature: {}°C\n", weather.temperature_celsius));
    if let Some(pressure) = weather.pressure_hpa {
        out.push_str(&format!("  Atmospheric pressure: {pressure} hPa\n"));
    }
    out.push_str(&format!("  Humidity: {}%\n", weather.humidity_percent));
    out.push_str(&format!("  Wind speed: {} m/s\n", weather.wind_speed));
    out.push_str(&format!("  Description: {}", weather.description));
    out
}

pub fn render_error(err: &WeatherError) -> String {
    match err {
        WeatherError::InvalidApiKey => "Error: Invalid OpenWeatherMap API key.".to_string(),
        WeatherError::NotFound => "Error: Could not retrieve weather. Details: city not found".to_string(),
        other => format!("Error: Could not retrieve weather. Details: {other}"),
    }
}
