
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::GeocodingConfig;
use crate::http::HttpClient;

const GEOCODE_PATH: &str = "/maps/api/geocode/json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Google Geocoding client, used to turn the client's location into coordinates
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    base_url: Url,
    api_key: String,
    http: HttpClient,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

impl GeocodingClient {
    #[inline]
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url().context("Invalid geocoding base URL")?,
            api_key: config.require_api_key()?.to_string(),
            http: HttpClient::default(),
        })
    }

    #[inline]
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    /// Coordinates of the first match for `address`, `None` when there is none
    #[inline]
    pub fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let mut url = self
            .base_url
            .join(GEOCODE_PATH)
            .context("Failed to build geocoding URL")?;
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", &self.api_key);

        let response: GeocodeResponse = self
            .http
            .get_json(&url)
            .with_context(|| format!("Geocoding '{}' failed", address))?;

        match response.status.as_str() {
            "OK" => {
                let location = response.results.into_iter().next().map(|r| r.geometry.location);
                debug!("Geocoded '{}' to {:?}", address, location);
                Ok(location)
            }
            "ZERO_RESULTS" => {
                warn!("No geocoding results for '{}'", address);
                Ok(None)
            }
            status => Err(anyhow::anyhow!(
                "Geocoding returned {}: {}",
                status,
                response.error_message.unwrap_or_default()
            )),
        }
    }
}
