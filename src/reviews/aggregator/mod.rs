
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::ReviewSource;
use super::model::{Corpus, PlaceRef};
use crate::{KeywordsError, Result};

/// Where a pagination run stands.
///
/// | from       | page outcome                  | to                  |
/// |------------|-------------------------------|---------------------|
/// | `Fetching` | error payload or fetch failed | `ErrorStopped`      |
/// | `Fetching` | ok, next page > cap           | `CapReached`        |
/// | `Fetching` | ok, no continuation token     | `Exhausted`         |
/// | `Fetching` | ok, continuation token        | `Fetching(page+1)`  |
///
/// The three other states are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationState {
    Fetching { page: u32, token: Option<String> },
    Exhausted,
    ErrorStopped { page: u32, message: String },
    CapReached,
}

/// Result of fetching the page a `Fetching` state points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Fetched { next_token: Option<String> },
    Failed { message: String },
}

impl PaginationState {
    #[inline]
    pub fn start() -> Self {
        Self::Fetching {
            page: 1,
            token: None,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Fetching { .. })
    }

    #[inline]
    #[must_use]
    pub fn advance(self, outcome: PageOutcome, page_cap: u32) -> Self {
        let Self::Fetching { page, .. } = self else {
            return self;
        };

        match outcome {
            PageOutcome::Failed { message } => Self::ErrorStopped { page, message },
            PageOutcome::Fetched { .. } if page.saturating_add(1) > page_cap => Self::CapReached,
            PageOutcome::Fetched { next_token } => {
                match next_token.filter(|t| !t.trim().is_empty()) {
                    Some(token) => Self::Fetching {
                        page: page + 1,
                        token: Some(token),
                    },
                    None => Self::Exhausted,
                }
            }
        }
    }
}

/// Non-fatal failure during pagination; reviews before `page` were kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("review page {page} failed: {message}")]
pub struct AggregationWarning {
    pub page: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationReport {
    pub corpus: Corpus,
    /// Pages whose reviews made it into the corpus
    pub pages_fetched: u32,
    pub final_state: PaginationState,
    pub warning: Option<AggregationWarning>,
}

/// Collects every review page for a place into one corpus
#[derive(Debug, Clone)]
pub struct ReviewAggregator<S> {
    source: S,
}

impl<S: ReviewSource> ReviewAggregator<S> {
    #[inline]
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Page through the reviews of `place`, fetching at most `page_cap` pages.
    ///
    /// A source error ends the run early but is not a failure: the report
    /// holds what was collected before it plus a warning.
    #[inline]
    pub fn aggregate(&self, place: &PlaceRef, page_cap: u32) -> Result<AggregationReport> {
        if page_cap == 0 {
            return Err(KeywordsError::InvalidParameter(
                "page cap must be at least 1".to_string(),
            ));
        }

        info!(
            "Aggregating reviews for '{}' ({}), up to {} pages",
            place.title, place.data_id, page_cap
        );

        let mut corpus = Corpus::new(place.clone());
        let mut pages_fetched = 0;
        let mut state = PaginationState::start();

        while let PaginationState::Fetching { page, token } = &state {
            let page = *page;
            debug!("Fetching review page {}", page);

            let outcome = match self.source.fetch_page(&place.data_id, token.as_deref()) {
                Err(e) => PageOutcome::Failed {
                    message: format!("{e:#}"),
                },
                Ok(mut fetched) => match fetched.error.take() {
                    Some(message) => PageOutcome::Failed { message },
                    None => {
                        let added = corpus.absorb_page(&fetched, page);
                        pages_fetched += 1;
                        debug!("Page {} contributed {} reviews", page, added);
                        PageOutcome::Fetched {
                            next_token: fetched.continuation_token,
                        }
                    }
                },
            };

            state = state.advance(outcome, page_cap);
        }

        let warning = match &state {
            PaginationState::ErrorStopped { page, message } => {
                warn!(
                    "Stopped paging at page {}: {}. Keeping {} reviews",
                    page,
                    message,
                    corpus.len()
                );
                Some(AggregationWarning {
                    page: *page,
                    message: message.clone(),
                })
            }
            PaginationState::CapReached => {
                debug!("Page cap of {} reached", page_cap);
                None
            }
            _ => None,
        };

        info!(
            "Collected {} reviews over {} pages",
            corpus.len(),
            pages_fetched
        );

        Ok(AggregationReport {
            corpus,
            pages_fetched,
            final_state: state,
            warning,
        })
    }
}
