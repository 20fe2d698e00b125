//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests of a run, including:
//! - Building the shared HTTP client
//! - Admission through the run's [`RateLimiter`]
//! - Bounded retries with a fixed delay between attempts
//! - Recording every failed attempt in the run's [`ErrorLog`]

use crate::config::FetcherConfig;
use crate::crawler::limiter::RateLimiter;
use crate::output::{ErrorLog, ErrorRecord};
use crate::state::FetchState;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A complete response body
///
/// A `404 Not Found` is delivered as a document with an empty body: the
/// target site answers not-found for pages that simply have no content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status code
    pub status: u16,
    pub body: String,
}

impl RawDocument {
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }
}

/// Why a single attempt failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection error: {0}")]
    Connect(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Failed to read body: {0}")]
    Body(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for AttemptFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            Self::Body(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Why a logical fetch produced no document
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Gave up on {url} after {attempts} attempts: {last_cause}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_cause: AttemptFailure,
    },
}

/// Retry and timeout settings of a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Attempts per fetch, including the first
    pub max_attempts: u32,
    /// Timeout of one attempt, from connect until the body is read
    pub timeout: Duration,
    /// Fixed pause between two attempts
    pub retry_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self::from_config(&FetcherConfig::default())
    }
}

impl FetchPolicy {
    pub fn from_config(config: &FetcherConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            timeout: Duration::from_millis(config.request_timeout_ms),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Builds an HTTP client for the run
///
/// User agents are supplied per request by a
/// [`HeaderSource`](crate::crawler::HeaderSource), not fixed on the client.
pub fn build_http_client(policy: &FetchPolicy) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(policy.timeout)
        .connect_timeout(policy.timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs logical fetches with admission control and bounded retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | 2xx | Return the document |
/// | HTTP 404 | Return an empty document, no retry |
/// | Other status | Retry |
/// | Timeout | Retry |
/// | Connection error | Retry |
///
/// Each failed attempt is appended to the error log and, unless it was the
/// last one, followed by the fixed retry delay.
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    client: Client,
    limiter: RateLimiter,
    policy: FetchPolicy,
    errors: ErrorLog,
}

impl RetryingFetcher {
    pub fn new(client: Client, limiter: RateLimiter, policy: FetchPolicy, errors: ErrorLog) -> Self {
        Self {
            client,
            limiter,
            policy,
            errors,
        }
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.errors
    }

    /// Fetches `url`, retrying transient failures
    ///
    /// One limiter permit is held from the first attempt until the fetch
    /// settles, retry delays included.
    ///
    /// # Returns
    ///
    /// * `Ok(RawDocument)` - A complete body (empty for 404)
    /// * `Err(FetchError)` - The URL was malformed or every attempt failed
    pub async fn fetch(&self, url: &str, headers: HeaderMap) -> Result<RawDocument, FetchError> {
        let target = match Url::parse(url) {
            Ok(target) => target,
            Err(e) => {
                self.errors
                    .record(ErrorRecord::not_attempted(url, e.to_string()));
                return Err(FetchError::InvalidUrl {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let _permit = self.limiter.acquire().await;
        let mut state = FetchState::Pending.begin_attempt();

        loop {
            tracing::trace!("{} -> {}", url, state);
            let attempt = state.attempts();

            match self.attempt(&target, &headers).await {
                Ok(document) => {
                    state = state.succeed();
                    tracing::trace!("{} -> {}", url, state);
                    return Ok(document);
                }
                Err(cause) => {
                    self.errors
                        .record(ErrorRecord::attempt(url, attempt, cause.to_string()));

                    state = state.fail(self.policy.max_attempts);
                    if let FetchState::Exhausted { attempts } = state {
                        tracing::trace!("{} -> {}", url, state);
                        return Err(FetchError::Exhausted {
                            url: url.to_string(),
                            attempts,
                            last_cause: cause,
                        });
                    }

                    tracing::trace!("{} -> {}", url, state);
                    tokio::time::sleep(self.policy.retry_delay).await;
                    state = state.begin_attempt();
                }
            }
        }
    }

    /// One GET with the per-attempt timeout
    async fn attempt(&self, url: &Url, headers: &HeaderMap) -> Result<RawDocument, AttemptFailure> {
        let response = self
            .client
            .get(url.clone())
            .headers(headers.clone())
            .timeout(self.policy.timeout)
            .send()
            .await?;

        let status = response.status();
        let final_url = response.url().to_string();

        if status == StatusCode::NOT_FOUND {
            tracing::debug!("{} answered 404, treating as empty", final_url);
            return Ok(RawDocument {
                url: final_url,
                status: status.as_u16(),
                body: String::new(),
            });
        }

        if !status.is_success() {
            return Err(AttemptFailure::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(RawDocument {
            url: final_url,
            status: status.as_u16(),
            body,
        })
    }
}
