//! Multi-day forecast from the National Weather Service (api.weather.gov).
//!
//! Two requests per forecast: `/points/{lat},{lon}` names the forecast office
//! grid and its forecast URL, which is then fetched and parsed. Both requests must
//! carry an identifying User-Agent or the service answers 403.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::ACCEPT};
use serde::Deserialize;

use crate::{
    Coordinates, Forecast,
    error::{FetchError, Service},
    provider::{join_url, log_failure, send, status_error},
};

use super::ForecastProvider;

const GEO_JSON: &str = "application/geo+json";

#[derive(Debug, Clone)]
pub struct NwsClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PointsDocument {
    properties: Option<PointsProperties>,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    forecast: Option<String>,
}

impl NwsClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    async fn get(&self, service: Service, url: &str) -> Result<String, FetchError> {
        tracing::debug!(%url, %service, "requesting");

        let request = self.http.get(url).header(ACCEPT, GEO_JSON);
        let (status, body) = send(service, request).await?;

        if status == StatusCode::FORBIDDEN {
            tracing::warn!(
                %service,
                "access denied; make sure the User-Agent identifies this client"
            );
        }
        if !status.is_success() {
            return Err(status_error(service, status, &body));
        }

        Ok(body)
    }

    /// Resolve the forecast URL for a point.
    async fn forecast_url(&self, at: Coordinates) -> Result<String, FetchError> {
        const SERVICE: Service = Service::ForecastPoints;

        // The service redirects anything more precise than four decimals.
        let path = format!("points/{:.4},{:.4}", at.latitude, at.longitude);
        let body = self.get(SERVICE, &join_url(&self.base_url, &path)).await?;

        let doc: PointsDocument =
            serde_json::from_str(&body).map_err(|e| FetchError::malformed(SERVICE, e))?;

        doc.properties
            .and_then(|p| p.forecast)
            .ok_or(FetchError::MissingField {
                service: SERVICE,
                field: "properties.forecast",
            })
    }

    async fn fetch_forecast(&self, at: Coordinates) -> Result<Forecast, FetchError> {
        const SERVICE: Service = Service::ForecastDocument;

        let url = self.forecast_url(at).await?;
        let body = self.get(SERVICE, &url).await?;

        serde_json::from_str(&body).map_err(|e| FetchError::malformed(SERVICE, e))
    }
}

#[async_trait]
impl ForecastProvider for NwsClient {
    async fn forecast(&self, at: Coordinates) -> Result<Forecast, FetchError> {
        self.fetch_forecast(at).await.inspect_err(log_failure)
    }
}
