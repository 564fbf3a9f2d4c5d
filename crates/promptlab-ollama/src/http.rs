//! HTTP backend abstraction for the Ollama API.
//!
//! A backend performs exactly one attempt per call and reports the raw
//! status and body. Retry, backoff and status classification live in the
//! client so they can be tested against a scripted backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::config::OllamaClientConfig;
use crate::error::{OllamaError, OllamaResult};

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Trait for HTTP backends that talk to an Ollama server.
///
/// Implementations return `Err` only for transport failures
/// (`OllamaError::Timeout` or `OllamaError::Connection`); every HTTP status,
/// including 4xx and 5xx, comes back as `Ok`.
#[async_trait]
pub trait HttpBackend: Send + Sync + 'static {
    /// Send a GET request.
    async fn get(&self, url: &Url) -> OllamaResult<HttpResponse>;

    /// Send a POST request with a JSON body.
    async fn post_json(&self, url: &Url, body: &Value) -> OllamaResult<HttpResponse>;
}

#[async_trait]
impl<B: HttpBackend + ?Sized> HttpBackend for Arc<B> {
    async fn get(&self, url: &Url) -> OllamaResult<HttpResponse> {
        (**self).get(url).await
    }

    async fn post_json(&self, url: &Url, body: &Value) -> OllamaResult<HttpResponse> {
        (**self).post_json(url, body).await
    }
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest.
pub struct ReqwestBackend {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &OllamaClientConfig) -> OllamaResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| OllamaError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout: config.timeout,
        })
    }

    fn map_transport_error(&self, err: &reqwest::Error) -> OllamaError {
        if err.is_timeout() {
            OllamaError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            OllamaError::Connection {
                endpoint: self.endpoint.clone(),
                message: err.to_string(),
            }
        }
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> OllamaResult<HttpResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| self.map_transport_error(&e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(&e))?;
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get(&self, url: &Url) -> OllamaResult<HttpResponse> {
        self.execute(self.client.get(url.as_str())).await
    }

    async fn post_json(&self, url: &Url, body: &Value) -> OllamaResult<HttpResponse> {
        self.execute(self.client.post(url.as_str()).json(body)).await
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// Scripted outcome of one fake exchange.
    #[derive(Debug, Clone)]
    pub enum FakeReply {
        /// Respond with the given status and JSON body.
        Json(u16, Value),
        /// Respond with the given status and raw text body.
        Text(u16, String),
        /// Fail as if the request timed out.
        Timeout,
        /// Fail as if the connection was refused.
        Refused,
    }

    /// A request the fake backend received.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub method: &'static str,
        pub path: String,
        pub body: Option<Value>,
    }

    /// A fake HTTP backend that replays scripted replies per URL path.
    ///
    /// Replies queued for a path are consumed in order; the last one is
    /// repeated once the queue is down to it. Paths with no script answer
    /// 404.
    pub struct FakeBackend {
        endpoint: String,
        timeout_secs: u64,
        scripts: Mutex<HashMap<String, VecDeque<FakeReply>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    impl FakeBackend {
        /// Create a fake backend with no scripted replies.
        pub fn new() -> Self {
            Self {
                endpoint: "http://fake-ollama:11434".to_string(),
                timeout_secs: 30,
                scripts: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Timeout reported by scripted `FakeReply::Timeout` replies.
        #[must_use]
        pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
            self.timeout_secs = timeout_secs;
            self
        }

        /// Queue a reply for a path such as `/api/tags`.
        #[must_use]
        pub fn with_reply(self, path: &str, reply: FakeReply) -> Self {
            self.push_reply(path, reply);
            self
        }

        /// Queue a reply on an already shared backend.
        pub fn push_reply(&self, path: &str, reply: FakeReply) {
            lock(&self.scripts)
                .entry(path.to_string())
                .or_default()
                .push_back(reply);
        }

        /// Every request received so far.
        pub fn calls(&self) -> Vec<RecordedCall> {
            lock(&self.calls).clone()
        }

        /// Number of requests received for `path`.
        pub fn attempts(&self, path: &str) -> usize {
            lock(&self.calls).iter().filter(|c| c.path == path).count()
        }

        fn respond(
            &self,
            method: &'static str,
            url: &Url,
            body: Option<&Value>,
        ) -> OllamaResult<HttpResponse> {
            let path = url.path().to_string();
            lock(&self.calls).push(RecordedCall {
                method,
                path: path.clone(),
                body: body.cloned(),
            });

            let reply = {
                let mut scripts = lock(&self.scripts);
                scripts.get_mut(&path).and_then(|queue| {
                    if queue.len() > 1 {
                        queue.pop_front()
                    } else {
                        queue.front().cloned()
                    }
                })
            };

            match reply {
                Some(FakeReply::Json(status, value)) => {
                    Ok(HttpResponse::new(status, value.to_string()))
                }
                Some(FakeReply::Text(status, text)) => Ok(HttpResponse::new(status, text)),
                Some(FakeReply::Timeout) => Err(OllamaError::Timeout {
                    timeout_secs: self.timeout_secs,
                }),
                Some(FakeReply::Refused) => Err(OllamaError::Connection {
                    endpoint: self.endpoint.clone(),
                    message: "connection refused".to_string(),
                }),
                None => Ok(HttpResponse::new(404, "404 page not found")),
            }
        }
    }

    impl Default for FakeBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl HttpBackend for FakeBackend {
        async fn get(&self, url: &Url) -> OllamaResult<HttpResponse> {
            self.respond("GET", url, None)
        }

        async fn post_json(&self, url: &Url, body: &Value) -> OllamaResult<HttpResponse> {
            self.respond("POST", url, Some(body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FakeBackend, FakeReply};
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reqwest_backend_creation() {
        let config = OllamaClientConfig::new().with_endpoint("http://gpu-box:11434");
        let backend = ReqwestBackend::new(&config).unwrap();
        assert_eq!(backend.endpoint, "http://gpu-box:11434");
        assert_eq!(backend.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_fake_backend_consumes_queue_then_repeats_last() {
        let backend = FakeBackend::new()
            .with_reply("/api/tags", FakeReply::Text(500, "boom".to_string()))
            .with_reply("/api/tags", FakeReply::Json(200, json!({"models": []})));
        let url = Url::parse("http://fake/api/tags").unwrap();

        assert_eq!(backend.get(&url).await.unwrap().status, 500);
        assert_eq!(backend.get(&url).await.unwrap().status, 200);
        assert_eq!(backend.get(&url).await.unwrap().status, 200);
        assert_eq!(backend.attempts("/api/tags"), 3);
    }

    #[tokio::test]
    async fn test_fake_backend_unscripted_path_is_404() {
        let backend = FakeBackend::new();
        let url = Url::parse("http://fake/api/unknown").unwrap();
        assert_eq!(backend.get(&url).await.unwrap().status, 404);
    }

    #[tokio::test]
    async fn test_fake_backend_records_post_bodies() {
        let backend = FakeBackend::new().with_timeout_secs(5).with_reply(
            "/api/generate",
            FakeReply::Timeout,
        );
        let url = Url::parse("http://fake/api/generate").unwrap();

        let err = backend.post_json(&url, &json!({"model": "m"})).await;
        assert_eq!(err, Err(OllamaError::Timeout { timeout_secs: 5 }));
        assert_eq!(backend.calls()[0].method, "POST");
        assert_eq!(backend.calls()[0].body, Some(json!({"model": "m"})));
    }
}
