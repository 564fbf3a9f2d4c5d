//! Ollama client with retry, backoff and model-list caching.
//!
//! The request operations are grouped by API call:
//! - `tags` - model listing, cache and connection checks
//! - `generate` - prompt refinement and prompt testing

mod generate;
mod tags;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use promptlab_core::Settings;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::cache::ModelCache;
use crate::config::OllamaClientConfig;
use crate::error::{OllamaError, OllamaResult};
use crate::http::{HttpBackend, HttpResponse, ReqwestBackend};
use crate::url::{api_url, parse_base_url};

// ============================================================================
// Type Aliases
// ============================================================================

/// Default Ollama client using the reqwest HTTP backend.
pub type DefaultOllamaClient = OllamaClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for a single Ollama server.
///
/// Generic over the HTTP backend so the retry loop and cache can be tested
/// without a network. Use `DefaultOllamaClient` in production code.
///
/// Clones share the backend and the model cache. Public network operations
/// run on a spawned task, so a caller that stops waiting does not cut a
/// retry loop short.
pub struct OllamaClient<B: HttpBackend> {
    pub(crate) backend: Arc<B>,
    pub(crate) endpoint: String,
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
    pub(crate) max_retries: u32,
    pub(crate) retry_base_delay: Duration,
    pub(crate) default_model: String,
    pub(crate) default_temperature: f64,
    pub(crate) cache: Arc<ModelCache>,
}

impl<B: HttpBackend> Clone for OllamaClient<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            endpoint: self.endpoint.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            max_retries: self.max_retries,
            retry_base_delay: self.retry_base_delay,
            default_model: self.default_model.clone(),
            default_temperature: self.default_temperature,
            cache: Arc::clone(&self.cache),
        }
    }
}

impl DefaultOllamaClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &OllamaClientConfig) -> OllamaResult<Self> {
        let backend = ReqwestBackend::new(config)?;
        Self::with_backend(config, backend)
    }

    /// Create a client configured from application settings.
    pub fn from_settings(settings: &Settings) -> OllamaResult<Self> {
        Self::new(&OllamaClientConfig::from_settings(settings))
    }
}

impl<B: HttpBackend> OllamaClient<B> {
    /// Create a client over a custom backend.
    pub fn with_backend(config: &OllamaClientConfig, backend: B) -> OllamaResult<Self> {
        Ok(Self {
            backend: Arc::new(backend),
            endpoint: config.endpoint.trim().to_string(),
            base_url: parse_base_url(&config.endpoint)?,
            timeout: config.timeout,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
            default_model: config.default_model.clone(),
            default_temperature: config.default_temperature,
            cache: Arc::new(ModelCache::new(config.cache_ttl)),
        })
    }

    /// The backend this client sends requests through.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run `operation` on its own task against a clone of this client.
    ///
    /// Dropping the returned future only drops the join handle; the task
    /// keeps going and its result is discarded.
    pub(crate) async fn detached<T, F, Fut>(&self, operation: F) -> OllamaResult<T>
    where
        T: Send + 'static,
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = OllamaResult<T>> + Send + 'static,
    {
        tokio::spawn(operation(self.clone()))
            .await
            .map_err(|e| OllamaError::Task(e.to_string()))?
    }

    /// Attempts per request; a configured value of 0 still sends once.
    pub(crate) fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Wait before the attempt following the 0-based `attempt`.
    pub(crate) fn backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `send` until it succeeds, fails terminally, or attempts run out.
    ///
    /// Status < 400 is success. 4xx fails immediately. 5xx and transport
    /// failures are retried; once attempts are exhausted the last failure
    /// is returned.
    async fn with_retry<F, Fut>(&self, operation: &'static str, send: F) -> OllamaResult<String>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = OllamaResult<HttpResponse>> + Send,
    {
        let attempts = self.attempts();
        let mut last_error = None;

        for attempt in 0..attempts {
            debug!(operation, attempt = attempt + 1, attempts, "Sending Ollama request");

            let error = match send().await {
                Ok(HttpResponse { status, body }) if status < 400 => return Ok(body),
                Ok(HttpResponse { status, body }) if status < 500 => {
                    return Err(OllamaError::Rejected { status, body });
                }
                Ok(HttpResponse { status, .. }) => OllamaError::ServerError { status },
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            if attempt + 1 < attempts {
                let delay = self.backoff_delay(attempt);
                warn!(
                    operation,
                    attempt = attempt + 1,
                    attempts,
                    error = %error,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Ollama request failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| OllamaError::Connection {
            endpoint: self.endpoint.clone(),
            message: "no attempt was made".to_string(),
        }))
    }

    /// GET `path` with retries and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> OllamaResult<T> {
        let url = api_url(&self.base_url, path)?;
        let body = self.with_retry(operation, || self.backend.get(&url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST a JSON body to `path` with retries and decode the JSON reply.
    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        payload: &Value,
    ) -> OllamaResult<T> {
        let url = api_url(&self.base_url, path)?;
        let body = self
            .with_retry(operation, || self.backend.post_json(&url, payload))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}
