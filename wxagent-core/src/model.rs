use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A resolved location in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Current conditions as reported by the current-weather service.
///
/// Temperatures are kept in Celsius, the unit the service reports in.
/// Fahrenheit only appears in [`CurrentWeather::summary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub cloud_pct: u8,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub min_temp: f64,
    pub max_temp: f64,
    pub wind_speed: f64,
    pub wind_degrees: u16,
    /// Seconds since the Unix epoch.
    pub sunrise: i64,
    /// Seconds since the Unix epoch.
    pub sunset: i64,
}

impl CurrentWeather {
    pub fn summary(&self) -> String {
        format!(
            "Temperature: {:.1}°F (feels like {:.1}°F)\n\
             Range: {:.1}°F - {:.1}°F\n\
             Humidity: {}%\n\
             Cloud Cover: {}%\n\
             Wind: {} m/s at {}°\n\
             Sunrise: {}\n\
             Sunset: {}",
            celsius_to_fahrenheit(self.temp),
            celsius_to_fahrenheit(self.feels_like),
            celsius_to_fahrenheit(self.min_temp),
            celsius_to_fahrenheit(self.max_temp),
            self.humidity,
            self.cloud_pct,
            self.wind_speed,
            self.wind_degrees,
            format_time(self.sunrise),
            format_time(self.sunset),
        )
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Render an epoch timestamp as a local wall-clock time, e.g. "06:42 AM".
fn format_time(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|utc| utc.with_timezone(&Local).format("%I:%M %p").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CurrentWeather {
        CurrentWeather {
            cloud_pct: 75,
            temp: 25.0,
            feels_like: 27.0,
            humidity: 80,
            min_temp: 20.0,
            max_temp: 30.0,
            wind_speed: 3.6,
            wind_degrees: 120,
            sunrise: 1_700_000_000,
            sunset: 1_700_040_000,
        }
    }

    #[test]
    fn celsius_to_fahrenheit_known_points() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn summary_renders_fahrenheit_without_touching_stored_celsius() {
        let weather = sample();
        let text = weather.summary();

        assert!(text.starts_with("Temperature: 77.0°F (feels like 80.6°F)"));
        assert!(text.contains("Range: 68.0°F - 86.0°F"));
        assert!(text.contains("Humidity: 80%"));
        assert!(text.contains("Cloud Cover: 75%"));
        assert!(text.contains("Wind: 3.6 m/s at 120°"));
        assert!(text.contains("Sunrise: "));
        assert_eq!(weather, sample());
    }

    #[test]
    fn deserializes_service_payload() {
        let json = r#"{
            "cloud_pct": 20, "temp": 29, "feels_like": 33, "humidity": 70,
            "min_temp": 27, "max_temp": 31, "wind_speed": 5.14, "wind_degrees": 90,
            "sunrise": 1700000000, "sunset": 1700040000
        }"#;
        let weather: CurrentWeather = serde_json::from_str(json).expect("valid payload");
        assert_eq!(weather.temp, 29.0);
        assert_eq!(weather.wind_degrees, 90);
    }

    #[test]
    fn missing_field_is_rejected() {
        let json = r#"{"cloud_pct": 20, "temp": 29}"#;
        assert!(serde_json::from_str::<CurrentWeather>(json).is_err());
    }
}
