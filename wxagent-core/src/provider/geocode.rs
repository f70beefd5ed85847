//! Forward geocoding via geocode.maps.co.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    Coordinates,
    error::{FetchError, Service},
    provider::{join_url, log_failure, send, status_error},
};

use super::Geocoder;

const SERVICE: Service = Service::Geocoding;

#[derive(Debug, Clone)]
pub struct GeocodeMapsClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl GeocodeMapsClient {
    pub fn new(http: Client, base_url: &str, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            api_key,
        }
    }

    async fn lookup(&self, location: &str) -> Result<Coordinates, FetchError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(FetchError::Unresolved {
                location: location.to_string(),
                reason: "location is empty".to_string(),
            });
        }

        let url = join_url(&self.base_url, "search");
        tracing::debug!(%url, location, "geocoding");

        let request = self
            .http
            .get(&url)
            .query(&[("q", location), ("api_key", self.api_key.as_str())]);
        let (status, body) = send(SERVICE, request).await?;

        if !status.is_success() {
            return Err(status_error(SERVICE, status, &body));
        }

        let hits: Vec<GeocodeHit> =
            serde_json::from_str(&body).map_err(|e| FetchError::malformed(SERVICE, e))?;

        // The service ranks results; the first one wins.
        let first = hits.first().ok_or_else(|| FetchError::Unresolved {
            location: location.to_string(),
            reason: "no results found".to_string(),
        })?;

        let latitude = first.lat.as_ref().ok_or(FetchError::MissingField {
            service: SERVICE,
            field: "lat",
        })?;
        let longitude = first.lon.as_ref().ok_or(FetchError::MissingField {
            service: SERVICE,
            field: "lon",
        })?;

        Ok(Coordinates::new(
            latitude.degrees("lat")?,
            longitude.degrees("lon")?,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    lat: Option<Degrees>,
    lon: Option<Degrees>,
}

/// The service sends coordinates as strings; accept plain numbers as well.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Degrees {
    Number(f64),
    Text(String),
}

impl Degrees {
    fn degrees(&self, field: &str) -> Result<f64, FetchError> {
        let value = match self {
            Degrees::Number(n) => *n,
            Degrees::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                FetchError::malformed(SERVICE, format!("`{field}` is not a number: '{s}'"))
            })?,
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(FetchError::malformed(SERVICE, format!("`{field}` is not finite")))
        }
    }
}

#[async_trait]
impl Geocoder for GeocodeMapsClient {
    async fn locate(&self, location: &str) -> Result<Coordinates, FetchError> {
        let result = self.lookup(location).await;
        match &result {
            Ok(at) => tracing::info!(location, %at, "resolved location"),
            Err(err) => log_failure(err),
        }
        result
    }
}
