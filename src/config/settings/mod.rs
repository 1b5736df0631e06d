
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const SERPAPI_KEY_ENV: &str = "SERPAPI_KEY";
pub const GOOGLE_MAPS_API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub serpapi: SerpApiConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SerpApiConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    pub language: String,
    pub zoom: String,
}

impl Default for SerpApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://serpapi.com".to_string(),
            api_key: String::new(),
            language: "en".to_string(),
            zoom: "14z".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeocodingConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Free-text location used to bias place search, e.g. a street address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_location: Option<String>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com".to_string(),
            api_key: String::new(),
            client_location: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OllamaConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub batch_size: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 11434,
            model: "nomic-embed-text:latest".to_string(),
            batch_size: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub top_n: usize,
    pub diversity: f32,
    pub page_cap: u32,
    pub ngram_min: usize,
    pub ngram_max: usize,
    pub custom_keywords: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            diversity: 0.5,
            page_cap: 5,
            ngram_min: 1,
            ngram_max: 1,
            custom_keywords: ["quiet", "intimate", "dim", "wagyu"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("Invalid batch size: {0} (must be between 1 and 1000)")]
    InvalidBatchSize(u32),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid protocol: {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid language: {0} (cannot be empty)")]
    InvalidLanguage(String),
    #[error("Invalid zoom: {0} (expected a value such as '14z')")]
    InvalidZoom(String),
    #[error("Missing API key: set {0} or add it to the config file")]
    MissingApiKey(&'static str),
    #[error("Invalid top_n: {0} (must be between 1 and 100)")]
    InvalidTopN(usize),
    #[error("Invalid diversity: {0} (must be between 0.0 and 1.0)")]
    InvalidDiversity(f32),
    #[error("Invalid page cap: {0} (must be between 1 and 50)")]
    InvalidPageCap(u32),
    #[error("Invalid n-gram range: ({0}, {1}) (need 1 <= min <= max <= 4)")]
    InvalidNgramRange(usize, usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            serpapi: SerpApiConfig::default(),
            geocoding: GeocodingConfig::default(),
            ollama: OllamaConfig::default(),
            extraction: ExtractionConfig::default(),
            base_dir: None,
        }
    }
}

impl Config {
    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".place-keywords"))
            .or({
                #[cfg(windows)]
                {
                    dirs::data_dir().map(|data| data.join("place-keywords"))
                }
                #[cfg(not(windows))]
                {
                    None
                }
            })
            .ok_or(ConfigError::DirectoryError)
    }

    /// Load from the default config directory, then apply environment overrides
    #[inline]
    pub fn load() -> Result<Self> {
        let config_dir = Self::config_dir().context("Failed to determine config directory")?;
        Ok(Self::load_from(config_dir)?.with_env_overrides())
    }

    /// Load `config.toml` from `config_dir`, falling back to defaults if it is absent
    #[inline]
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self {
                base_dir: Some(config_dir.as_ref().to_path_buf()),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = Some(config_dir.as_ref().to_path_buf());

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    /// Replace API keys with `SERPAPI_KEY` / `GOOGLE_MAPS_API_KEY` when those are set
    #[inline]
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(key) = non_empty_env(SERPAPI_KEY_ENV) {
            debug!("Using SerpApi key from {}", SERPAPI_KEY_ENV);
            self.serpapi.api_key = key;
        }
        if let Some(key) = non_empty_env(GOOGLE_MAPS_API_KEY_ENV) {
            debug!("Using Google Maps key from {}", GOOGLE_MAPS_API_KEY_ENV);
            self.geocoding.api_key = key;
        }
        self
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let config_dir = self.base_dir()?;

        fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Directory this config was loaded from, or the default one
    #[inline]
    pub fn base_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.base_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::config_dir(),
        }
    }

    #[inline]
    pub fn config_file_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.base_dir()?.join(CONFIG_FILE_NAME))
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.serpapi.validate()?;
        self.geocoding.validate()?;
        self.ollama.validate()?;
        self.extraction.validate()?;
        Ok(())
    }

    #[inline]
    pub fn ollama_url(&self) -> Result<Url, ConfigError> {
        self.ollama.ollama_url()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidProtocol(url.scheme().to_string()));
    }
    Ok(url)
}

impl SerpApiConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_base_url(&self.base_url)?;

        if self.language.trim().is_empty() {
            return Err(ConfigError::InvalidLanguage(self.language.clone()));
        }

        let valid_zoom = self
            .zoom
            .strip_suffix('z')
            .is_some_and(|level| level.parse::<f32>().is_ok_and(|z| z > 0.0));
        if !valid_zoom {
            return Err(ConfigError::InvalidZoom(self.zoom.clone()));
        }

        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_base_url(&self.base_url)
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey(SERPAPI_KEY_ENV));
        }
        Ok(&self.api_key)
    }
}

impl GeocodingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_base_url(&self.base_url)?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_base_url(&self.base_url)
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey(GOOGLE_MAPS_API_KEY_ENV));
        }
        Ok(&self.api_key)
    }
}

impl OllamaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol != "http" && self.protocol != "https" {
            return Err(ConfigError::InvalidProtocol(self.protocol.clone()));
        }

        self.ollama_url()?;

        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }

        Ok(())
    }

    pub fn ollama_url(&self) -> Result<Url, ConfigError> {
        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))
    }

    pub fn set_protocol(&mut self, protocol: String) -> Result<(), ConfigError> {
        if protocol != "http" && protocol != "https" {
            return Err(ConfigError::InvalidProtocol(protocol));
        }
        self.protocol = protocol;
        Ok(())
    }

    pub fn set_host(&mut self, host: String) -> Result<(), ConfigError> {
        let temp_config = OllamaConfig {
            host: host.clone(),
            ..self.clone()
        };
        temp_config.validate()?;
        self.host = host;
        Ok(())
    }

    pub fn set_port(&mut self, port: u16) -> Result<(), ConfigError> {
        if port == 0 {
            return Err(ConfigError::InvalidPort(port));
        }
        self.port = port;
        Ok(())
    }

    pub fn set_model(&mut self, model: String) -> Result<(), ConfigError> {
        if model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(model));
        }
        self.model = model;
        Ok(())
    }

    pub fn set_batch_size(&mut self, batch_size: u32) -> Result<(), ConfigError> {
        if batch_size == 0 || batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(batch_size));
        }
        self.batch_size = batch_size;
        Ok(())
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.top_n) {
            return Err(ConfigError::InvalidTopN(self.top_n));
        }

        if !(0.0..=1.0).contains(&self.diversity) {
            return Err(ConfigError::InvalidDiversity(self.diversity));
        }

        if !(1..=50).contains(&self.page_cap) {
            return Err(ConfigError::InvalidPageCap(self.page_cap));
        }

        if self.ngram_min == 0 || self.ngram_min > self.ngram_max || self.ngram_max > 4 {
            return Err(ConfigError::InvalidNgramRange(
                self.ngram_min,
                self.ngram_max,
            ));
        }

        Ok(())
    }

    pub fn set_top_n(&mut self, top_n: usize) -> Result<(), ConfigError> {
        if !(1..=100).contains(&top_n) {
            return Err(ConfigError::InvalidTopN(top_n));
        }
        self.top_n = top_n;
        Ok(())
    }

    pub fn set_diversity(&mut self, diversity: f32) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&diversity) {
            return Err(ConfigError::InvalidDiversity(diversity));
        }
        self.diversity = diversity;
        Ok(())
    }

    pub fn set_page_cap(&mut self, page_cap: u32) -> Result<(), ConfigError> {
        if !(1..=50).contains(&page_cap) {
            return Err(ConfigError::InvalidPageCap(page_cap));
        }
        self.page_cap = page_cap;
        Ok(())
    }
}
