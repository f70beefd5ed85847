//! Current conditions from API Ninjas.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::{
    Coordinates, CurrentWeather,
    error::{FetchError, Service},
    provider::{join_url, log_failure, send, status_error},
};

use super::CurrentWeatherProvider;

const SERVICE: Service = Service::CurrentWeather;

#[derive(Debug, Clone)]
pub struct ApiNinjasClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ApiNinjasClient {
    pub fn new(http: Client, base_url: &str, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            api_key,
        }
    }

    async fn fetch_current(&self, at: Coordinates) -> Result<CurrentWeather, FetchError> {
        let url = join_url(&self.base_url, "v1/weather");
        tracing::debug!(%url, %at, "fetching current weather");

        let request = self
            .http
            .get(&url)
            .query(&[
                ("lat", at.latitude.to_string()),
                ("lon", at.longitude.to_string()),
            ])
            .header("X-Api-Key", self.api_key.as_str());
        let (status, body) = send(SERVICE, request).await?;

        if status != StatusCode::OK {
            return Err(status_error(SERVICE, status, &body));
        }

        serde_json::from_str(&body).map_err(|e| FetchError::malformed(SERVICE, e))
    }
}

#[async_trait]
impl CurrentWeatherProvider for ApiNinjasClient {
    async fn current(&self, at: Coordinates) -> Result<CurrentWeather, FetchError> {
        self.fetch_current(at).await.inspect_err(log_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiNinjasClient {
        ApiNinjasClient::new(Client::new(), &server.uri(), "NINJA_KEY".to_string())
    }

    fn payload() -> serde_json::Value {
        serde_json::json!({
            "cloud_pct": 40,
            "temp": 29,
            "feels_like": 34,
            "humidity": 74,
            "min_temp": 27,
            "max_temp": 31,
            "wind_speed": 4.63,
            "wind_degrees": 110,
            "sunrise": 1717152000,
            "sunset": 1717198800
        })
    }

    #[tokio::test]
    async fn parses_current_conditions() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/weather"))
            .and(query_param("lat", "18.0333"))
            .and(query_param("lon", "-77.2833"))
            .and(header("X-Api-Key", "NINJA_KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload()))
            .expect(1)
            .mount(&server)
            .await;

        let weather = client(&server)
            .current(Coordinates::new(18.0333, -77.2833))
            .await
            .unwrap();

        assert_eq!(weather.temp, 29.0);
        assert_eq!(weather.cloud_pct, 40);
        assert_eq!(weather.wind_degrees, 110);
    }

    #[tokio::test]
    async fn non_ok_status_carries_code_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/weather"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid API Key."))
            .mount(&server)
            .await;

        let err = client(&server)
            .current(Coordinates::new(0.0, 0.0))
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(matches!(err, FetchError::Status { .. }));
        assert!(msg.contains("400"));
        assert!(msg.contains("Invalid API Key."));
    }

    #[tokio::test]
    async fn accepted_but_not_ok_is_still_a_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/weather"))
            .respond_with(ResponseTemplate::new(202).set_body_json(payload()))
            .mount(&server)
            .await;

        let err = client(&server)
            .current(Coordinates::new(0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { .. }));
    }

    #[tokio::test]
    async fn incomplete_success_body_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/weather"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "temp": 29 })),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .current(Coordinates::new(0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Malformed {
                service: Service::CurrentWeather,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_connection_error() {
        // Nothing listens on the discard port.
        let client = ApiNinjasClient::new(Client::new(), "http://127.0.0.1:9", "K".into());
        let err = client.current(Coordinates::new(0.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, FetchError::Connection { .. }));
    }
}
