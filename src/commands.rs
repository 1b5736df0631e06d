use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::Config;
use crate::embeddings::OllamaClient;
use crate::keywords::{ExtractionOutcome, ExtractionParams, KeywordExtractor, NgramCandidates};
use crate::reviews::{Corpus, GeocodingClient, SerpApiClient};

type LiveExtractor = KeywordExtractor<SerpApiClient, SerpApiClient, OllamaClient, NgramCandidates>;

/// Command-line overrides for the extraction defaults in the config file
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub custom_keywords: Vec<String>,
    pub top_n: Option<usize>,
    pub diversity: Option<f32>,
    pub page_cap: Option<u32>,
    pub json: bool,
}

impl ExtractOptions {
    /// Merge these overrides over `config`; custom keywords replace the configured list
    #[inline]
    pub fn params(&self, config: &Config) -> ExtractionParams {
        let mut params = ExtractionParams::from(&config.extraction);
        if !self.custom_keywords.is_empty() {
            params.custom_keywords.clone_from(&self.custom_keywords);
        }
        if let Some(top_n) = self.top_n {
            params.top_n = top_n;
        }
        if let Some(diversity) = self.diversity {
            params.diversity = diversity;
        }
        if let Some(page_cap) = self.page_cap {
            params.page_cap = page_cap;
        }
        params
    }
}

/// Extract keywords for a place query, optionally saving the collected reviews
#[inline]
pub fn extract(query: &str, options: &ExtractOptions, save: Option<&Path>) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let params = options.params(&config);
    params.validate()?;

    let extractor = build_extractor(&config)?;

    let bar = spinner(format!("Collecting reviews for '{query}'"));
    let report = extractor.collect_reviews(query, params.page_cap);
    bar.finish_and_clear();
    let report = report?;

    if let Some(warning) = &report.warning {
        warn!("{}", warning);
    }
    if let Some(path) = save {
        report
            .corpus
            .save_snapshot(path)
            .with_context(|| format!("Failed to save reviews to {}", path.display()))?;
        info!("Saved {} reviews to {}", report.corpus.len(), path.display());
    }

    let bar = spinner("Selecting keywords".to_string());
    let keywords = extractor.extract_from_corpus(&report.corpus, &params);
    bar.finish_and_clear();

    let outcome = ExtractionOutcome {
        place: report.corpus.place.clone(),
        keywords: keywords?,
        warning: report.warning,
        pages_fetched: report.pages_fetched,
        review_count: report.corpus.len(),
    };
    print_outcome(&outcome, options.json)
}

/// Extract keywords from a corpus saved with `extract --save`
#[inline]
pub fn extract_snapshot(path: &Path, options: &ExtractOptions) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let params = options.params(&config);
    params.validate()?;

    let corpus = Corpus::load_snapshot(path)
        .with_context(|| format!("Failed to read reviews from {}", path.display()))?;
    let extractor = build_extractor(&config)?;

    let bar = spinner("Selecting keywords".to_string());
    let keywords = extractor.extract_from_corpus(&corpus, &params);
    bar.finish_and_clear();

    let outcome = ExtractionOutcome {
        place: corpus.place.clone(),
        keywords: keywords?,
        warning: None,
        pages_fetched: 0,
        review_count: corpus.len(),
    };
    print_outcome(&outcome, options.json)
}

/// Print the place's candidate keywords closest to `term`
#[inline]
pub fn suggest(query: &str, term: &str, snapshot: Option<&Path>, json: bool) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let extractor = build_extractor(&config)?;

    let corpus = match snapshot {
        Some(path) => Corpus::load_snapshot(path)
            .with_context(|| format!("Failed to read reviews from {}", path.display()))?,
        None => {
            let bar = spinner(format!("Collecting reviews for '{query}'"));
            let report = extractor.collect_reviews(query, config.extraction.page_cap);
            bar.finish_and_clear();
            report?.corpus
        }
    };

    let suggestions = extractor.suggest(term, &corpus, config.extraction.top_n)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("No suggestions for '{}' in {}", term, corpus.place.title);
        return Ok(());
    }

    println!(
        "{}",
        style(format!("Keywords near '{}' for {}", term, corpus.place.title)).bold()
    );
    for suggestion in &suggestions {
        println!("  {:<24} {:.3}", suggestion.term, suggestion.score);
    }
    Ok(())
}

/// Wire the live SerpApi and Ollama clients from `config`
#[inline]
pub fn build_extractor(config: &Config) -> Result<LiveExtractor> {
    config.validate()?;

    let mut serpapi = SerpApiClient::new(&config.serpapi)?;
    if let Some(location) = client_location(config) {
        serpapi = serpapi.with_location(location);
    }

    let ollama = OllamaClient::new(&config.ollama)?;
    ollama.health_check().with_context(|| {
        format!(
            "Ollama at {}:{} is not ready; run 'place-keywords config' to change it",
            config.ollama.host, config.ollama.port
        )
    })?;
    info!("Embedding with {}", ollama.model());

    let candidates =
        NgramCandidates::new(config.extraction.ngram_min, config.extraction.ngram_max)?;

    Ok(KeywordExtractor::new(
        serpapi.clone(),
        serpapi,
        ollama,
        candidates,
    ))
}

/// Geocode the configured client location, if any. Lookup failures are
/// logged and yield `None`.
fn client_location(config: &Config) -> Option<crate::reviews::Coordinates> {
    let address = config
        .geocoding
        .client_location
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())?;

    let client = match GeocodingClient::new(&config.geocoding) {
        Ok(client) => client,
        Err(e) => {
            warn!("Skipping client location: {:#}", e);
            return None;
        }
    };

    match client.geocode(address) {
        Ok(Some(location)) => {
            info!(
                "Searching near {} ({}, {})",
                address, location.lat, location.lng
            );
            Some(location)
        }
        Ok(None) => {
            warn!("No coordinates found for client location '{}'", address);
            None
        }
        Err(e) => {
            warn!("Failed to geocode client location '{}': {:#}", address, e);
            None
        }
    }
}

#[inline]
pub fn print_outcome(outcome: &ExtractionOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    println!("{}", style(&outcome.place.title).bold().cyan());
    if let Some(address) = &outcome.place.address {
        println!("   {address}");
    }
    println!(
        "   {} reviews from {} pages",
        outcome.review_count, outcome.pages_fetched
    );
    if let Some(warning) = &outcome.warning {
        println!("   {} {}", style("⚠️").yellow(), warning);
    }
    println!();

    if outcome.keywords.is_empty() {
        println!("No keywords found.");
        return Ok(());
    }

    for (keyword, count) in outcome.keywords.iter() {
        println!("  {keyword:<24} {count}");
    }
    Ok(())
}

/// Default snapshot location for a query inside the config directory
#[inline]
pub fn default_snapshot_path(query: &str) -> Result<PathBuf> {
    let slug: String = query
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    anyhow::ensure!(!slug.is_empty(), "Cannot derive a file name from '{query}'");

    Ok(crate::config::get_config_dir()?
        .join("snapshots")
        .join(format!("{slug}.json")))
}

fn spinner(message: String) -> ProgressBar {
    let bar = if console::user_attended_stderr() {
        ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {msg}").expect("style template is valid"),
        )
    } else {
        ProgressBar::hidden()
    };
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}
