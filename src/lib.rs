use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeywordsError>;

#[derive(Error, Debug)]
pub enum KeywordsError {
    #[error("No place found for query: {query}")]
    ResolutionFailure { query: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<config::ConfigError> for KeywordsError {
    #[inline]
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub mod commands;
pub mod config;
pub mod embeddings;
pub mod http;
pub mod keywords;
pub mod reviews;
