
use std::thread;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::candidates::CandidateGenerator;
use super::counter::{KeywordCounts, count_keywords};
use super::mmr::{ScoredTerm, find_similar, select_keywords};
use crate::config::ExtractionConfig;
use crate::embeddings::EmbeddingProvider;
use crate::reviews::{
    AggregationReport, AggregationWarning, Corpus, PlaceRef, PlaceResolver, ReviewAggregator,
    ReviewSource,
};
use crate::{KeywordsError, Result};

/// Caller-tunable knobs for one extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionParams {
    pub custom_keywords: Vec<String>,
    pub top_n: usize,
    pub diversity: f32,
    pub page_cap: u32,
}

impl Default for ExtractionParams {
    #[inline]
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

impl From<&ExtractionConfig> for ExtractionParams {
    #[inline]
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            custom_keywords: config.custom_keywords.clone(),
            top_n: config.top_n,
            diversity: config.diversity,
            page_cap: config.page_cap,
        }
    }
}

impl ExtractionParams {
    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(KeywordsError::InvalidParameter(
                "top_n must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.diversity) {
            return Err(KeywordsError::InvalidParameter(format!(
                "diversity must be between 0 and 1, got {}",
                self.diversity
            )));
        }
        if self.page_cap == 0 {
            return Err(KeywordsError::InvalidParameter(
                "page cap must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionOutcome {
    pub place: PlaceRef,
    pub keywords: KeywordCounts,
    /// Set when paging stopped early on a source error
    pub warning: Option<AggregationWarning>,
    pub pages_fetched: u32,
    pub review_count: usize,
}

/// Runs query → reviews → candidates → embeddings → MMR → counts
pub struct KeywordExtractor<R, S, E, C> {
    resolver: R,
    aggregator: ReviewAggregator<S>,
    embedder: E,
    candidates: C,
}

impl<R, S, E, C> KeywordExtractor<R, S, E, C>
where
    R: PlaceResolver,
    S: ReviewSource,
    E: EmbeddingProvider,
    C: CandidateGenerator,
{
    #[inline]
    pub fn new(resolver: R, source: S, embedder: E, candidates: C) -> Self {
        Self {
            resolver,
            aggregator: ReviewAggregator::new(source),
            embedder,
            candidates,
        }
    }

    /// Resolve `query` to a place or fail with `ResolutionFailure`
    #[inline]
    pub fn resolve(&self, query: &str) -> Result<PlaceRef> {
        if query.trim().is_empty() {
            return Err(KeywordsError::InvalidParameter(
                "place query cannot be empty".to_string(),
            ));
        }

        self.resolver
            .resolve(query)
            .map_err(|e| KeywordsError::Network(format!("{e:#}")))?
            .ok_or_else(|| KeywordsError::ResolutionFailure {
                query: query.to_string(),
            })
    }

    /// Resolve `query` and collect its reviews
    #[inline]
    pub fn collect_reviews(&self, query: &str, page_cap: u32) -> Result<AggregationReport> {
        let place = self.resolve(query)?;
        self.aggregator.aggregate(&place, page_cap)
    }

    /// Full extraction for a place query
    #[inline]
    pub fn extract_keywords(
        &self,
        query: &str,
        params: &ExtractionParams,
    ) -> Result<ExtractionOutcome> {
        params.validate()?;

        let report = self.collect_reviews(query, params.page_cap)?;
        let keywords = self.extract_from_corpus(&report.corpus, params)?;

        Ok(ExtractionOutcome {
            place: report.corpus.place.clone(),
            keywords,
            warning: report.warning,
            pages_fetched: report.pages_fetched,
            review_count: report.corpus.len(),
        })
    }

    /// Select and count keywords for an already collected corpus
    #[inline]
    pub fn extract_from_corpus(
        &self,
        corpus: &Corpus,
        params: &ExtractionParams,
    ) -> Result<KeywordCounts> {
        params.validate()?;

        let documents = corpus.documents();
        let selected = if documents.is_empty() {
            info!("'{}' has no review text", corpus.place.title);
            Vec::new()
        } else {
            self.select(&documents, params.top_n, params.diversity)?
        };

        let counts = count_keywords(&selected, &params.custom_keywords, &corpus.snippets());
        info!(
            "Extracted {} keywords for '{}'",
            counts.len(),
            corpus.place.title
        );
        Ok(counts)
    }

    /// Candidates from `corpus` closest to `term`, among its `top_n` most relevant
    #[inline]
    pub fn suggest(&self, term: &str, corpus: &Corpus, top_n: usize) -> Result<Vec<ScoredTerm>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(KeywordsError::InvalidParameter(
                "suggestion term cannot be empty".to_string(),
            ));
        }

        let documents = corpus.documents();
        let candidates = self.candidates.candidates(&documents);
        if documents.is_empty() || candidates.is_empty() {
            return Ok(Vec::new());
        }

        let (doc_embeddings, candidate_embeddings) = self.embed_pair(&documents, &candidates)?;
        let query_embedding = embed_checked(&self.embedder, &[term.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| KeywordsError::Embedding("no embedding for term".to_string()))?;

        find_similar(
            &query_embedding,
            &doc_embeddings,
            &candidate_embeddings,
            &candidates,
            top_n,
        )
    }

    fn select(&self, documents: &[String], top_n: usize, diversity: f32) -> Result<Vec<String>> {
        let candidates = self.candidates.candidates(documents);
        if candidates.is_empty() {
            warn!("No keyword candidates in {} documents", documents.len());
            return Ok(Vec::new());
        }

        let (doc_embeddings, candidate_embeddings) = self.embed_pair(documents, &candidates)?;
        select_keywords(
            &doc_embeddings,
            &candidate_embeddings,
            &candidates,
            top_n,
            diversity,
        )
    }

    /// Embed documents and candidates on two threads
    fn embed_pair(
        &self,
        documents: &[String],
        candidates: &[String],
    ) -> Result<(Vec<Vec<f32>>, Vec<Vec<f32>>)> {
        debug!(
            "Embedding {} documents and {} candidates",
            documents.len(),
            candidates.len()
        );

        let embedder = &self.embedder;
        thread::scope(|scope| {
            let doc_handle = scope.spawn(|| embed_checked(embedder, documents));
            let candidate_embeddings = embed_checked(embedder, candidates);
            let doc_embeddings = doc_handle.join().map_err(|_| {
                KeywordsError::Embedding("document embedding thread panicked".to_string())
            })?;
            Ok((doc_embeddings?, candidate_embeddings?))
        })
    }
}

fn embed_checked<E: EmbeddingProvider>(embedder: &E, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let embeddings = embedder
        .embed(texts)
        .map_err(|e| KeywordsError::Embedding(format!("{e:#}")))?;

    if embeddings.len() != texts.len() {
        return Err(KeywordsError::Embedding(format!(
            "expected {} embeddings, got {}",
            texts.len(),
            embeddings.len()
        )));
    }
    Ok(embeddings)
}
