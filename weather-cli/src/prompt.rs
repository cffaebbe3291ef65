use inquire::{InquireError, Text};
use weather_core::{LocationError, LocationPrompt};

/// Terminal prompts backed by `inquire`.
#[derive(Debug, Default)]
pub struct InquirePrompt {
    manual_header_shown: bool,
}

impl InquirePrompt {
    fn ask(&mut self, message: &str) -> Result<String, LocationError> {
        Text::new(message).prompt().map_err(into_location_error)
    }

    fn ask_manual(&mut self, message: &str) -> Result<String, LocationError> {
        if !self.manual_header_shown {
            println!("\n--- Manual Location Input (for precise weather) ---");
            self.manual_header_shown = true;
        }
        self.ask(message)
    }
}

impl LocationPrompt for InquirePrompt {
    fn confirm_detected_city(&mut self, city: &str) -> Result<String, LocationError> {
        println!("Detected approximate city (from IP): {city}");
        self.ask(&format!("Do you want to use '{city}' (Y/n)? Enter 'n' to provide Lat/Lon:"))
    }

    fn latitude(&mut self) -> Result<String, LocationError> {
        self.ask_manual("Enter latitude (e.g., 40.7128) or leave empty:")
    }

    fn longitude(&mut self) -> Result<String, LocationError> {
        self.ask_manual("Enter longitude (e.g., -74.0060) or leave empty:")
    }

    fn city_name(&mut self) -> Result<String, LocationError> {
        self.ask_manual("Please enter a city name manually (e.g., London):")
    }

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }
}

fn into_location_error(err: InquireError) -> LocationError {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            LocationError::Prompt("cancelled by user".to_string())
        }
        other => LocationError::Prompt(other.to_string()),
    }
}
