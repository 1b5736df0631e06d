
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{KeywordsError, Result};

pub const MIN_RATING: f32 = 1.0;
pub const MAX_RATING: f32 = 5.0;

/// A place resolved from a search query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRef {
    /// Identifier used to page through the place's reviews
    pub data_id: String,
    pub title: String,
    pub address: Option<String>,
    pub rating: Option<f32>,
    pub total_reviews: Option<u64>,
}

impl PlaceRef {
    #[inline]
    pub fn new(data_id: impl Into<String>, title: impl Into<String>) -> Result<Self> {
        let data_id = data_id.into();
        if data_id.trim().is_empty() {
            return Err(KeywordsError::InvalidParameter(
                "place identifier cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            data_id,
            title: title.into(),
            address: None,
            rating: None,
            total_reviews: None,
        })
    }
}

/// A review record as the search API returns it. Every field is optional and
/// a field with an unexpected type is read as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawReview {
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<RawUser>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub snippet: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub iso_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub likes: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawUser {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A normalized review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    /// `None` when missing or outside 1..=5
    pub rating: Option<f32>,
    /// Review text, empty when the record had none
    pub snippet: String,
    /// 1-based page the review was fetched on
    pub page: u32,
    /// Human readable date as shown by the source, e.g. "2 months ago"
    pub date: Option<String>,
    pub iso_date: Option<DateTime<Utc>>,
    pub images: Vec<String>,
    pub likes: u64,
}

impl Review {
    #[inline]
    pub fn from_raw(raw: RawReview, page: u32) -> Self {
        let author = raw.user.and_then(|u| u.name).unwrap_or_default();

        let rating = raw
            .rating
            .map(|r| r as f32)
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r));
        if rating.is_none() && raw.rating.is_some() {
            debug!("Discarding out-of-range rating {:?}", raw.rating);
        }

        let iso_date = raw.iso_date.as_deref().and_then(|d| {
            DateTime::parse_from_rfc3339(d)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        });

        Self {
            author,
            rating,
            snippet: raw.snippet.unwrap_or_default(),
            page: page.max(1),
            date: raw.date,
            iso_date,
            images: raw.images.unwrap_or_default(),
            likes: raw.likes.unwrap_or_default(),
        }
    }

    /// Normalize one raw JSON record; records that are not objects are skipped
    #[inline]
    pub fn normalize(record: &Value, page: u32) -> Option<Self> {
        if !record.is_object() {
            warn!("Skipping review record on page {} that is not an object", page);
            return None;
        }

        match RawReview::deserialize(record) {
            Ok(raw) => Some(Self::from_raw(raw, page)),
            Err(e) => {
                warn!("Skipping unreadable review record on page {}: {}", page, e);
                None
            }
        }
    }
}

/// One response of the paged review search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewPage {
    pub records: Vec<Value>,
    /// Token for the next page, `None` at the end of the data
    pub continuation_token: Option<String>,
    /// Explicit error reported by the source
    pub error: Option<String>,
    pub place_info: Option<Value>,
    pub topics: Vec<Value>,
}

impl ReviewPage {
    #[inline]
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    #[inline]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }
}

/// Every review gathered for one place, in fetch order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub place: PlaceRef,
    pub reviews: Vec<Review>,
    /// Place summary from the source, passed through untouched
    #[serde(default)]
    pub place_info: Option<Value>,
    /// Topic hints from the source, passed through untouched
    #[serde(default)]
    pub topics: Vec<Value>,
}

impl Corpus {
    #[inline]
    pub fn new(place: PlaceRef) -> Self {
        Self {
            place,
            reviews: Vec::new(),
            place_info: None,
            topics: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Append a page's records after everything already collected
    #[inline]
    pub fn absorb_page(&mut self, page: &ReviewPage, page_number: u32) -> usize {
        let before = self.reviews.len();
        self.reviews.extend(
            page.records
                .iter()
                .filter_map(|record| Review::normalize(record, page_number)),
        );

        if self.place_info.is_none() {
            self.place_info.clone_from(&page.place_info);
        }
        if self.topics.is_empty() {
            self.topics.clone_from(&page.topics);
        }

        self.reviews.len() - before
    }

    /// All snippets in fetch order, including empty ones
    #[inline]
    pub fn snippets(&self) -> Vec<String> {
        self.reviews.iter().map(|r| r.snippet.clone()).collect()
    }

    /// Snippets with text, the documents keyword selection works on
    #[inline]
    pub fn documents(&self) -> Vec<String> {
        self.reviews
            .iter()
            .map(|r| r.snippet.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    #[inline]
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        debug!("Saved {} reviews to {}", self.len(), path.display());
        Ok(())
    }

    #[inline]
    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let corpus: Self = serde_json::from_str(&content)?;
        debug!("Loaded {} reviews from {}", corpus.len(), path.display());
        Ok(corpus)
    }
}
