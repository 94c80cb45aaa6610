//! Limits applied while extracting a batch of URLs.
//!
//! Keeps a run bounded through:
//! - A per-URL timeout
//! - A cap on concurrent fetches per extractor
//! - A cap on URLs per run
//! - Denylist patterns (local and file URLs are never fetched)
//! - An opt-in retry policy for transient failures

use std::time::Duration;

use glob::Pattern;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Limits for one extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionLimits {
    /// Per-URL extraction timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Concurrent URLs per extractor (default: 4)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Maximum URLs accepted per run (default: 100)
    #[serde(default = "default_max_urls")]
    pub max_urls: usize,

    /// Glob patterns matched against the full URL
    #[serde(default = "default_denylist")]
    pub denylist_patterns: Vec<String>,

    /// Retry policy for transient failures (default: single attempt)
    #[serde(default)]
    pub retry_policy: RetryPolicy,
}

fn default_timeout() -> u64 {
    10
}
fn default_max_concurrency() -> usize {
    4
}
fn default_max_urls() -> usize {
    100
}

fn default_denylist() -> Vec<String> {
    vec![
        "file:*".to_string(),
        "*://localhost*".to_string(),
        "*://127.*".to_string(),
        "*://0.0.0.0*".to_string(),
        "*://[[]::1[]]*".to_string(),
        "*://[[]::[]]*".to_string(),
    ]
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_concurrency: default_max_concurrency(),
            max_urls: default_max_urls(),
            denylist_patterns: default_denylist(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl ExtractionLimits {
    /// Per-URL timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Concurrency, never below 1
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }

    /// Check if a URL matches any denylist pattern.
    ///
    /// Patterns are matched against the URL as given and against its
    /// canonical `scheme://host/path` form, so credentials, numeric IPv4
    /// spellings and bracketed IPv6 hosts cannot sidestep a host pattern.
    pub fn is_denylisted(&self, url: &str) -> bool {
        let raw = url.trim().to_lowercase();
        let canonical = canonical_form(&raw);

        self.denylist_patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .any(|pattern| {
                pattern.matches(&raw)
                    || canonical.as_deref().is_some_and(|c| pattern.matches(c))
            })
    }

    /// Validate a batch of URLs against the run limits
    pub fn validate_urls(&self, urls: &[String]) -> Result<(), LimitViolation> {
        if urls.len() > self.max_urls {
            return Err(LimitViolation::TooManyUrls {
                actual: urls.len(),
                limit: self.max_urls,
            });
        }

        Ok(())
    }
}

/// `scheme://host/path` with the host as the URL parser normalizes it
fn canonical_form(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host()?;
    Some(format!("{}://{}{}", parsed.scheme(), host, parsed.path()))
}

/// Retry policy for failed extractions.
///
/// Only applied to transient failures (transport errors, timeouts,
/// 429 and 5xx responses).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including first try)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay between retries in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Backoff multiplier (delay *= multiplier after each retry)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_max_attempts() -> u32 {
    1
}
fn default_initial_delay() -> u64 {
    500
}
fn default_max_delay() -> u64 {
    5000
}
fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryPolicy {
    /// Calculate delay after a failed attempt (1-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::from_millis(self.initial_delay_ms);
        }

        let delay =
            self.initial_delay_ms as f64 * self.backoff_multiplier.powi((attempt - 1) as i32);

        Duration::from_millis(delay.min(self.max_delay_ms as f64) as u64)
    }

    /// Check if another attempt is allowed
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Violations of the run limits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitViolation {
    #[error("Too many URLs: {actual} > {limit}")]
    TooManyUrls { actual: usize, limit: usize },
}
