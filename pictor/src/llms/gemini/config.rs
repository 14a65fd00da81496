//! Gemini client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry policy for Gemini HTTP calls.
///
/// Delays grow as `initial_delay_secs * exp_base^(retry - 1)`, capped at
/// `max_delay_secs`, plus up to `jitter` seconds of random jitter. `attempts`
/// counts every try including the first. Only responses whose status is in
/// `http_status_codes` are retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryOptions {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Exponential backoff base.
    pub exp_base: f64,
    /// Delay before the first retry, in seconds.
    pub initial_delay_secs: f64,
    /// Upper bound on a single delay, in seconds.
    pub max_delay_secs: f64,
    /// Maximum random jitter added to each delay, in seconds.
    pub jitter: f64,
    /// HTTP status codes that trigger a retry.
    pub http_status_codes: Vec<u16>,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            attempts: 5,
            exp_base: 7.0,
            initial_delay_secs: 1.0,
            max_delay_secs: 60.0,
            jitter: 1.0,
            http_status_codes: vec![429, 500, 503, 504],
        }
    }
}

impl RetryOptions {
    /// A policy that never retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            attempts: 1,
            ..Self::default()
        }
    }

    /// Whether a response with this status should be retried.
    #[must_use]
    pub fn should_retry(&self, status: u16) -> bool {
        self.http_status_codes.contains(&status)
    }

    /// Upper bound, in seconds, for any single delay or jitter setting.
    pub const MAX_DELAY_SECS: f64 = 3600.0;

    /// Check that every setting yields a usable backoff.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first out-of-range setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.attempts == 0 {
            return Err("attempts must be at least 1".to_owned());
        }
        if !self.exp_base.is_finite() || self.exp_base < 1.0 {
            return Err("exp_base must be a finite number of at least 1.0".to_owned());
        }
        for (name, secs) in [
            ("initial_delay_secs", self.initial_delay_secs),
            ("max_delay_secs", self.max_delay_secs),
            ("jitter", self.jitter),
        ] {
            if !(0.0..=Self::MAX_DELAY_SECS).contains(&secs) {
                return Err(format!(
                    "{name} must be between 0 and {} seconds",
                    Self::MAX_DELAY_SECS
                ));
            }
        }
        Ok(())
    }

    /// Backoff before retry number `retry` (1-based), without jitter.
    ///
    /// Never exceeds `max_delay_secs` or [`Self::MAX_DELAY_SECS`].
    #[must_use]
    pub fn base_delay(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial_delay_secs * self.exp_base.powi(exponent);
        bounded_secs(secs.min(self.max_delay_secs))
    }

    /// Backoff before retry number `retry` (1-based), with jitter applied.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let jitter = if self.jitter > 0.0 {
            bounded_secs(fastrand::f64() * self.jitter)
        } else {
            Duration::ZERO
        };
        self.base_delay(retry).saturating_add(jitter)
    }
}

/// Seconds as a duration in `0..=MAX_DELAY_SECS`; NaN and negatives are zero.
fn bounded_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.min(RetryOptions::MAX_DELAY_SECS)).unwrap_or(Duration::ZERO)
}

/// Configuration for the Gemini client.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Default model, used when a request names none.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Retry policy.
    pub retry: RetryOptions,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

impl GeminiConfig {
    /// Default Gemini API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";
    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash-lite";

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            timeout_secs: Some(120),
            retry: RetryOptions::default(),
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryOptions) -> Self {
        self.retry = retry;
        self
    }
}
