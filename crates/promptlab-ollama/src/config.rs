//! Public configuration for the Ollama client.
//!
//! This module provides a stable public API for configuring the client.
//! The internal config is derived from this.

use std::time::Duration;

use promptlab_core::Settings;
use promptlab_core::settings::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_OLLAMA_ENDPOINT,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TEMPERATURE,
};

/// Configuration for the Ollama client.
///
/// Use the builder pattern methods to customize the client configuration.
///
/// # Example
///
/// ```
/// use promptlab_ollama::OllamaClientConfig;
/// use std::time::Duration;
///
/// let config = OllamaClientConfig::new()
///     .with_endpoint("http://gpu-box:11434")
///     .with_timeout(Duration::from_secs(60))
///     .with_default_model("mistral");
/// ```
#[derive(Debug, Clone)]
pub struct OllamaClientConfig {
    /// Base URL of the Ollama server
    pub(crate) endpoint: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Per-request timeout
    pub(crate) timeout: Duration,
    /// Total attempts per request (values below 1 behave as 1)
    pub(crate) max_retries: u32,
    /// Delay before the second attempt; doubles for each later one
    pub(crate) retry_base_delay: Duration,
    /// How long a model-list snapshot stays valid
    pub(crate) cache_ttl: Duration,
    /// Model used when a call names none
    pub(crate) default_model: String,
    /// Temperature used when a test names none
    pub(crate) default_temperature: f64,
}

impl Default for OllamaClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            user_agent: concat!("promptlab/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: Duration::from_secs(1),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            default_model: DEFAULT_MODEL.to_string(),
            default_temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl OllamaClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a configuration from application settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .with_endpoint(settings.effective_ollama_endpoint())
            .with_timeout(Duration::from_secs(settings.effective_request_timeout_secs()))
            .with_max_retries(settings.effective_max_retries())
            .with_cache_ttl(Duration::from_secs(settings.effective_cache_ttl_secs()))
            .with_default_model(settings.effective_default_model())
            .with_default_temperature(settings.effective_default_temperature())
    }

    /// Set the Ollama server URL.
    ///
    /// Defaults to `http://localhost:11434`.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the total number of attempts per request.
    ///
    /// Defaults to 3.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff.
    ///
    /// Defaults to 1 second, so waits are 1s, 2s, 4s, ...
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Set the model-list cache TTL.
    ///
    /// Defaults to 300 seconds.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the model used when a call names none.
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the temperature used when a test names none.
    #[must_use]
    pub const fn with_default_temperature(mut self, temperature: f64) -> Self {
        self.default_temperature = temperature;
        self
    }
}
