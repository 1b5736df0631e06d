// Embeddings module
// Text-to-vector providers used by keyword selection

pub mod ollama;

pub use ollama::{ModelInfo, OllamaClient};

/// Maps texts to fixed-dimension vectors, one per input, in input order.
///
/// Implementations must be deterministic for a given model and safe to call
/// from two threads at once; document and candidate embeddings are requested
/// concurrently.
pub trait EmbeddingProvider: Sync {
    fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for &T {
    #[inline]
    fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        (**self).embed(texts)
    }
}
