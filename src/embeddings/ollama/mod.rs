#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::OllamaConfig;
use crate::embeddings::EmbeddingProvider;
use crate::http::{DEFAULT_TIMEOUT_SECONDS, HttpClient};

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: Url,
    model: String,
    batch_size: u32,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: Option<u64>,
    pub digest: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

impl OllamaClient {
    #[inline]
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let base_url = config
            .ollama_url()
            .context("Failed to generate Ollama URL from config")?;

        Ok(Self {
            base_url,
            model: config.model.clone(),
            batch_size: config.batch_size.max(1),
            http: HttpClient::new(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)),
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.http = self.http.with_retry_attempts(attempts);
        self
    }

    #[inline]
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Test connection to Ollama server and verify model availability
    #[inline]
    pub fn health_check(&self) -> Result<()> {
        debug!("Performing health check for Ollama at {}", self.base_url);

        let models = self.list_models().context("Server ping failed")?;

        if models.iter().any(|m| m.name == self.model) {
            info!(
                "Health check passed for Ollama server at {} with model {}",
                self.base_url, self.model
            );
            Ok(())
        } else {
            let available_models: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
            warn!(
                "Model {} not found. Available models: {:?}",
                self.model, available_models
            );
            Err(anyhow::anyhow!(
                "Model '{}' is not available. Available models: {:?}",
                self.model,
                available_models
            ))
        }
    }

    /// List all available models
    #[inline]
    pub fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self
            .base_url
            .join("/api/tags")
            .context("Failed to build models URL")?;

        debug!("Fetching available models from {}", url);

        let models_response: ModelsResponse =
            self.http.get_json(&url).context("Failed to fetch models")?;

        debug!("Found {} models", models_response.models.len());
        Ok(models_response.models)
    }

    /// Generate embeddings for multiple texts, split into server-sized batches
    #[inline]
    pub fn generate_embeddings_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut results = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size as usize) {
            let batch = self
                .generate_embeddings_single_batch(chunk)
                .with_context(|| format!("Failed to process batch of {} texts", chunk.len()))?;
            results.extend(batch);
        }

        if let Some(first) = results.first() {
            let dimension = first.len();
            if let Some(bad) = results.iter().position(|v| v.len() != dimension) {
                return Err(anyhow::anyhow!(
                    "Inconsistent embedding dimensions: text {} has {} values, expected {}",
                    bad,
                    results[bad].len(),
                    dimension
                ));
            }
            debug!(
                "Generated {} embeddings with {} dimensions",
                results.len(),
                dimension
            );
        }

        Ok(results)
    }

    fn generate_embeddings_single_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let url = self
            .base_url
            .join("/api/embed")
            .context("Failed to build embedding URL")?;

        let response: EmbedResponse = self
            .http
            .post_json(&url, &request)
            .context("Failed to generate batch embeddings")?;

        if response.embeddings.len() != texts.len() {
            return Err(anyhow::anyhow!(
                "Mismatch between request and response counts: {} vs {}",
                texts.len(),
                response.embeddings.len()
            ));
        }

        Ok(response.embeddings)
    }
}

impl EmbeddingProvider for OllamaClient {
    #[inline]
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.generate_embeddings_batch(texts)
    }
}
