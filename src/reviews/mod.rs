// Reviews module
// Place lookup, paged review collection and the review corpus

pub mod aggregator;
pub mod geocode;
pub mod model;
pub mod serpapi;

pub use aggregator::{
    AggregationReport, AggregationWarning, PageOutcome, PaginationState, ReviewAggregator,
};
pub use geocode::{Coordinates, GeocodingClient};
pub use model::{Corpus, PlaceRef, RawReview, RawUser, Review, ReviewPage};
pub use serpapi::SerpApiClient;

/// Resolves a free-text query to a place, `None` when nothing matches
pub trait PlaceResolver {
    fn resolve(&self, query: &str) -> anyhow::Result<Option<PlaceRef>>;
}

/// One page of reviews per call; `continuation_token` is `None` for the first page
pub trait ReviewSource {
    fn fetch_page(
        &self,
        place_id: &str,
        continuation_token: Option<&str>,
    ) -> anyhow::Result<ReviewPage>;
}

impl<T: PlaceResolver + ?Sized> PlaceResolver for &T {
    #[inline]
    fn resolve(&self, query: &str) -> anyhow::Result<Option<PlaceRef>> {
        (**self).resolve(query)
    }
}

impl<T: ReviewSource + ?Sized> ReviewSource for &T {
    #[inline]
    fn fetch_page(
        &self,
        place_id: &str,
        continuation_token: Option<&str>,
    ) -> anyhow::Result<ReviewPage> {
        (**self).fetch_page(place_id, continuation_token)
    }
}
