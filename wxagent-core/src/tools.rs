//! Text-in, text-out operations handed to an agent.
//!
//! Every tool answers with a string. Upstream failures never escape as errors:
//! they come back as a one-line explanation the model can relay, and nothing
//! is retried.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{
    Coordinates, CurrentWeather, Forecast, Providers, WeatherSettings,
    error::{FetchError, ToolError},
    provider::providers_from_settings,
};

pub const GET_WEATHER: &str = "get_weather";
pub const GET_WEATHER_FORECAST_TODAY: &str = "get_weather_forecast_today";
pub const GET_WEATHER_FORECAST_DAYS: &str = "get_weather_forecast_days";

pub const DEFAULT_FORECAST_DAYS: usize = 3;

/// What an agent needs to register a tool: name, description and a JSON schema
/// for the arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LocationArgs {
    location: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ForecastDaysArgs {
    location: String,
    #[serde(default = "default_days")]
    days: usize,
}

fn default_days() -> usize {
    DEFAULT_FORECAST_DAYS
}

#[derive(Debug)]
pub struct WeatherTools {
    providers: Providers,
}

impl WeatherTools {
    pub fn new(providers: Providers) -> Self {
        Self { providers }
    }

    pub fn from_settings(settings: &WeatherSettings) -> anyhow::Result<Self> {
        Ok(Self::new(providers_from_settings(settings)?))
    }

    /// Current conditions at a location.
    pub async fn get_weather(&self, location: &str) -> String {
        match self.current_weather(location).await {
            Ok(weather) => weather.summary(),
            Err(err) => explain("get current weather", location, &err),
        }
    }

    /// Today / tonight / tomorrow digest with precipitation chances.
    pub async fn get_weather_forecast_today(&self, location: &str) -> String {
        match self.forecast(location).await {
            Ok(forecast) => forecast.summary(),
            Err(err) => explain("get the forecast", location, &err),
        }
    }

    /// One line per upcoming day, daytime periods only.
    pub async fn get_weather_forecast_days(&self, location: &str, days: usize) -> String {
        match self.forecast(location).await {
            Ok(forecast) => render_days(&forecast, days),
            Err(err) => explain("get the forecast", location, &err),
        }
    }

    pub async fn current_weather(&self, location: &str) -> Result<CurrentWeather, FetchError> {
        let at = self.locate(location).await?;
        self.providers.current.current(at).await
    }

    pub async fn forecast(&self, location: &str) -> Result<Forecast, FetchError> {
        let at = self.locate(location).await?;
        self.providers.forecast.forecast(at).await
    }

    async fn locate(&self, location: &str) -> Result<Coordinates, FetchError> {
        self.providers.geocoder.locate(location).await
    }

    pub fn declarations() -> Vec<ToolDeclaration> {
        let location = json!({
            "type": "string",
            "description": "Free-text location, e.g. a city, region or address"
        });

        vec![
            ToolDeclaration {
                name: GET_WEATHER.to_string(),
                description: "Get the current weather conditions at a location.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": { "location": location },
                    "required": ["location"]
                }),
            },
            ToolDeclaration {
                name: GET_WEATHER_FORECAST_TODAY.to_string(),
                description: "Get today's, tonight's and tomorrow's forecast for a location."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": { "location": location },
                    "required": ["location"]
                }),
            },
            ToolDeclaration {
                name: GET_WEATHER_FORECAST_DAYS.to_string(),
                description: "Get the daytime forecast for the next few days at a location."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "location": location,
                        "days": {
                            "type": "integer",
                            "minimum": 0,
                            "default": DEFAULT_FORECAST_DAYS,
                            "description": "Number of days to include"
                        }
                    },
                    "required": ["location"]
                }),
            },
        ]
    }

    /// Run a tool by name with JSON arguments, as an agent's tool call would.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<String, ToolError> {
        match name {
            GET_WEATHER => {
                let args: LocationArgs = parse_args(GET_WEATHER, args)?;
                Ok(self.get_weather(&args.location).await)
            }
            GET_WEATHER_FORECAST_TODAY => {
                let args: LocationArgs = parse_args(GET_WEATHER_FORECAST_TODAY, args)?;
                Ok(self.get_weather_forecast_today(&args.location).await)
            }
            GET_WEATHER_FORECAST_DAYS => {
                let args: ForecastDaysArgs = parse_args(GET_WEATHER_FORECAST_DAYS, args)?;
                Ok(self.get_weather_forecast_days(&args.location, args.days).await)
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: &'static str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
        tool,
        reason: e.to_string(),
    })
}

fn render_days(forecast: &Forecast, days: usize) -> String {
    let mut out = format!("Weather forecast for next {days} days:\n");
    for day in forecast.next_days(days) {
        out.push_str(&format!(
            "{}: {}°{}, {}\n",
            day.name(),
            day.temperature(),
            day.temperature_unit(),
            day.short_forecast()
        ));
    }
    out
}

fn explain(action: &str, location: &str, err: &FetchError) -> String {
    format!("Unable to {action} for '{location}': {err}.")
}
