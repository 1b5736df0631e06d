#[cfg(test)]
mod tests;

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, warn};
use url::Url;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const EXPONENTIAL_BACKOFF_BASE: u32 = 2;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Query parameters whose values must never reach the logs
const SECRET_PARAMS: &[&str] = &["api_key", "key"];

/// Blocking HTTP agent shared by every outbound client.
///
/// Server errors (5xx) and transport failures are retried with exponential
/// backoff; client errors (4xx) fail immediately.
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl Default for HttpClient {
    #[inline]
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
    }
}

impl HttpClient {
    #[inline]
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    #[inline]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    #[inline]
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    /// GET `url` and return the response body as text
    #[inline]
    pub fn get_text(&self, url: &Url) -> Result<String> {
        debug!("GET {}", redact(url));
        self.request_with_retry(url, || {
            self.agent
                .get(url.as_str())
                .call()
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
    }

    /// GET `url` and decode the JSON body into `T`
    #[inline]
    pub fn get_json<T: serde::de::DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let body = self.get_text(url)?;
        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse response from {}", redact(url)))
    }

    /// POST a JSON body to `url` and decode the JSON response into `T`
    #[inline]
    pub fn post_json<B, T>(&self, url: &Url, body: &B) -> Result<T>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let request_json = serde_json::to_string(body).context("Failed to serialize request")?;
        debug!("POST {} ({} bytes)", redact(url), request_json.len());

        let response_text = self.request_with_retry(url, || {
            self.agent
                .post(url.as_str())
                .header("Content-Type", "application/json")
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })?;

        serde_json::from_str(&response_text)
            .with_context(|| format!("Failed to parse response from {}", redact(url)))
    }

    fn request_with_retry<F>(&self, url: &Url, mut request_fn: F) -> Result<String>
    where
        F: FnMut() -> Result<String, ureq::Error>,
    {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!("HTTP request attempt {}/{}", attempt, self.retry_attempts);

            match request_fn() {
                Ok(response_text) => {
                    debug!("Request succeeded on attempt {}", attempt);
                    return Ok(response_text);
                }
                Err(error) => {
                    let should_retry = match &error {
                        ureq::Error::StatusCode(status) => {
                            if *status >= 500 {
                                warn!(
                                    "Server error (status {}), attempt {}/{}",
                                    status, attempt, self.retry_attempts
                                );
                                true
                            } else {
                                warn!("Client error (status {}), not retrying", status);
                                return Err(anyhow::anyhow!("Client error: HTTP {}", status));
                            }
                        }
                        ureq::Error::ConnectionFailed
                        | ureq::Error::HostNotFound
                        | ureq::Error::Timeout(_)
                        | ureq::Error::Io(_) => {
                            warn!(
                                "Transport error: {}, attempt {}/{}",
                                error, attempt, self.retry_attempts
                            );
                            true
                        }
                        _ => {
                            warn!("Non-retryable error: {}", error);
                            false
                        }
                    };

                    if !should_retry {
                        return Err(anyhow::anyhow!("Non-retryable error: {}", error));
                    }

                    last_error = Some(anyhow::anyhow!("Request error: {}", error));

                    if attempt < self.retry_attempts {
                        let delay = backoff_delay(self.retry_delay, attempt);
                        debug!("Waiting {:?} before retry", delay);
                        std::thread::sleep(delay);
                    }
                }
            }
        }

        error!("All retry attempts failed for request to {}", redact(url));

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Request failed after retries")))
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Delay before the retry that follows `attempt` (1-based)
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(EXPONENTIAL_BACKOFF_BASE.saturating_pow(attempt.saturating_sub(1)))
}

/// Render `url` with secret query values masked
#[inline]
pub fn redact(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if SECRET_PARAMS.contains(&k.as_ref()) {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
