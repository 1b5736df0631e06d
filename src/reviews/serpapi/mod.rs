
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::geocode::Coordinates;
use super::model::{PlaceRef, ReviewPage};
use super::{PlaceResolver, ReviewSource};
use crate::config::SerpApiConfig;
use crate::http::HttpClient;

const SEARCH_PATH: &str = "/search.json";
const MAPS_ENGINE: &str = "google_maps";
const REVIEWS_ENGINE: &str = "google_maps_reviews";

/// Client for SerpApi's Google Maps search and review engines
#[derive(Debug, Clone)]
pub struct SerpApiClient {
    base_url: Url,
    api_key: String,
    language: String,
    zoom: String,
    location: Option<Coordinates>,
    http: HttpClient,
}

#[derive(Debug, Deserialize)]
struct SearchMetadata {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    error: Option<String>,
    search_metadata: Option<SearchMetadata>,
    place_results: Option<PlaceResult>,
    #[serde(default)]
    local_results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    data_id: Option<String>,
    title: Option<String>,
    address: Option<String>,
    rating: Option<f32>,
    reviews: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewsResponse {
    error: Option<String>,
    #[serde(default)]
    reviews: Vec<Value>,
    serpapi_pagination: Option<Pagination>,
    place_info: Option<Value>,
    #[serde(default)]
    topics: Vec<Value>,
}

impl SerpApiClient {
    #[inline]
    pub fn new(config: &SerpApiConfig) -> Result<Self> {
        let base_url = config.base_url().context("Invalid SerpApi base URL")?;
        let api_key = config.require_api_key()?.to_string();

        Ok(Self {
            base_url,
            api_key,
            language: config.language.clone(),
            zoom: config.zoom.clone(),
            location: None,
            http: HttpClient::default(),
        })
    }

    /// Bias place search towards `location`
    #[inline]
    pub fn with_location(mut self, location: Coordinates) -> Self {
        self.location = Some(location);
        self
    }

    #[inline]
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    fn endpoint(&self, engine: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(SEARCH_PATH)
            .context("Failed to build SerpApi URL")?;
        url.query_pairs_mut()
            .append_pair("engine", engine)
            .extend_pairs(params)
            .append_pair("hl", &self.language)
            .append_pair("api_key", &self.api_key);
        Ok(url)
    }

    /// Search Google Maps for `query` and return the best matching place
    #[inline]
    pub fn search(&self, query: &str) -> Result<Option<PlaceRef>> {
        let ll = self
            .location
            .map(|c| format!("@{},{},{}", c.lat, c.lng, self.zoom));

        let mut params = vec![("q", query), ("type", "search")];
        if let Some(ll) = ll.as_deref() {
            params.push(("ll", ll));
        }

        let url = self.endpoint(MAPS_ENGINE, &params)?;
        let response: SearchResponse = self
            .http
            .get_json(&url)
            .with_context(|| format!("Place search for '{}' failed", query))?;

        if let Some(error) = response.error {
            warn!("Place search for '{}' returned an error: {}", query, error);
            return Ok(None);
        }

        let status = response.search_metadata.and_then(|m| m.status);
        if status.as_deref() != Some("Success") {
            warn!("Place search for '{}' finished with status {:?}", query, status);
            return Ok(None);
        }

        // An exact match comes back as `place_results`, otherwise take the first listing
        let best = response
            .place_results
            .into_iter()
            .chain(response.local_results)
            .find(|p| p.data_id.as_deref().is_some_and(|id| !id.trim().is_empty()));

        let Some(result) = best else {
            debug!("No place with a data_id for '{}'", query);
            return Ok(None);
        };

        let data_id = result.data_id.unwrap_or_default();
        let title = result.title.unwrap_or_else(|| query.to_string());
        let mut place = PlaceRef::new(data_id, title)?;
        place.address = result.address;
        place.rating = result.rating;
        place.total_reviews = result.reviews;

        info!("Resolved '{}' to '{}' ({})", query, place.title, place.data_id);
        Ok(Some(place))
    }

    /// Fetch one page of reviews for `data_id`
    #[inline]
    pub fn reviews_page(&self, data_id: &str, next_page_token: Option<&str>) -> Result<ReviewPage> {
        let mut params = vec![("data_id", data_id)];
        if let Some(token) = next_page_token {
            params.push(("next_page_token", token));
        }

        let url = self.endpoint(REVIEWS_ENGINE, &params)?;
        let response: ReviewsResponse = self
            .http
            .get_json(&url)
            .context("Review page request failed")?;

        debug!(
            "Review page returned {} records (next token: {})",
            response.reviews.len(),
            response
                .serpapi_pagination
                .as_ref()
                .is_some_and(|p| p.next_page_token.is_some())
        );

        Ok(ReviewPage {
            records: response.reviews,
            continuation_token: response
                .serpapi_pagination
                .and_then(|p| p.next_page_token),
            error: response.error,
            place_info: response.place_info,
            topics: response.topics,
        })
    }
}

impl PlaceResolver for SerpApiClient {
    #[inline]
    fn resolve(&self, query: &str) -> Result<Option<PlaceRef>> {
        self.search(query)
    }
}

impl ReviewSource for SerpApiClient {
    #[inline]
    fn fetch_page(&self, place_id: &str, continuation_token: Option<&str>) -> Result<ReviewPage> {
        self.reviews_page(place_id, continuation_token)
    }
}
