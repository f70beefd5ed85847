//! Core library for the `wxagent` weather tools.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Clients for the geocoding, current-weather and forecast services
//! - The typed forecast model and the queries answered from it
//! - The text-returning tools an agent calls
//!
//! It is used by `wxagent-cli`, but the tools can be registered with any agent
//! runtime through [`WeatherTools::declarations`] and [`WeatherTools::invoke`].

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod tools;

pub use config::{Config, ModelSettings, WeatherSettings};
pub use error::{FetchError, Service, ToolError};
pub use forecast::{Forecast, ForecastPeriod, TemperatureRange};
pub use model::{Coordinates, CurrentWeather};
pub use provider::{CurrentWeatherProvider, ForecastProvider, Geocoder, Providers};
pub use tools::{ToolDeclaration, WeatherTools};
