use crate::{
    Coordinates, CurrentWeather, Forecast, WeatherSettings,
    error::{FetchError, Service},
    provider::{geocode::GeocodeMapsClient, ninjas::ApiNinjasClient, nws::NwsClient},
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::fmt::Debug;

pub mod geocode;
pub mod ninjas;
pub mod nws;

/// Turns free text ("clarendon jamaica") into coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn locate(&self, location: &str) -> Result<Coordinates, FetchError>;
}

#[async_trait]
pub trait CurrentWeatherProvider: Send + Sync + Debug {
    async fn current(&self, at: Coordinates) -> Result<CurrentWeather, FetchError>;
}

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn forecast(&self, at: Coordinates) -> Result<Forecast, FetchError>;
}

/// The three upstream services the tools talk to.
#[derive(Debug)]
pub struct Providers {
    pub geocoder: Box<dyn Geocoder>,
    pub current: Box<dyn CurrentWeatherProvider>,
    pub forecast: Box<dyn ForecastProvider>,
}

/// Build the HTTP client shared by every provider: bounded timeout and an
/// identifying User-Agent on all requests.
pub fn http_client(settings: &WeatherSettings) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(settings.timeout())
        .user_agent(settings.http.user_agent.as_str())
        .build()
        .context("Failed to build HTTP client")
}

/// Construct the default providers from validated settings.
pub fn providers_from_settings(settings: &WeatherSettings) -> anyhow::Result<Providers> {
    let http = http_client(settings)?;

    Ok(Providers {
        geocoder: Box::new(GeocodeMapsClient::new(
            http.clone(),
            &settings.endpoints.geocode,
            settings.geocode_api_key.clone(),
        )),
        current: Box::new(ApiNinjasClient::new(
            http.clone(),
            &settings.endpoints.current_weather,
            settings.weather_api_key.clone(),
        )),
        forecast: Box::new(NwsClient::new(http, &settings.endpoints.forecast)),
    })
}

/// Send a request and read the whole body. Transport failures are classified;
/// the status is returned as-is for the caller to judge.
pub(crate) async fn send(
    service: Service,
    request: RequestBuilder,
) -> Result<(StatusCode, String), FetchError> {
    let res = request
        .send()
        .await
        .map_err(|e| FetchError::transport(service, e))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| FetchError::transport(service, e))?;

    Ok((status, body))
}

pub(crate) fn status_error(service: Service, status: StatusCode, body: &str) -> FetchError {
    FetchError::Status {
        service,
        status,
        body: truncate_body(body),
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

pub(crate) fn log_failure(err: &FetchError) {
    tracing::warn!(
        service = err.service().map(|s| s.as_str()).unwrap_or("geocoding"),
        "{err}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings() -> WeatherSettings {
        Config {
            geocode_api_key: Some("GEO".into()),
            weather_api_key: Some("NINJA".into()),
            ..Config::default()
        }
        .weather_settings()
        .expect("keys present")
    }

    #[test]
    fn providers_build_from_settings() {
        let providers = providers_from_settings(&settings());
        assert!(providers.is_ok());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);

        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(join_url("http://h/", "/points/1,2"), "http://h/points/1,2");
        assert_eq!(join_url("http://h", "search"), "http://h/search");
    }

    #[tokio::test]
    async fn slow_service_times_out_as_connection_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/weather"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let mut cfg = Config {
            geocode_api_key: Some("GEO".into()),
            weather_api_key: Some("NINJA".into()),
            ..Config::default()
        };
        cfg.http.timeout_secs = 1;
        cfg.endpoints.geocode = server.uri();
        cfg.endpoints.current_weather = server.uri();
        cfg.endpoints.forecast = server.uri();

        let providers = providers_from_settings(&cfg.weather_settings().unwrap()).unwrap();
        let err = providers
            .current
            .current(Coordinates::new(0.0, 0.0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::Connection {
                service: Service::CurrentWeather,
                ..
            }
        ));
    }
}
