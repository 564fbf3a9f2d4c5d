//! Port trait implementation for `OllamaClient`.
//!
//! This module implements the core-owned `ModelEndpointPort` trait for
//! `OllamaClient`, mapping internal errors to `EndpointError`.

use async_trait::async_trait;
use promptlab_core::{
    CacheInfo, ConnectionStatus, EndpointError, EndpointResult, ModelEndpointPort, ModelInfo,
    PromptTestRequest, PromptTestResult,
};

use crate::client::OllamaClient;
use crate::error::OllamaError;
use crate::http::HttpBackend;

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert internal `OllamaError` to core `EndpointError`.
pub fn map_error(err: OllamaError) -> EndpointError {
    match err {
        OllamaError::Timeout { timeout_secs } => EndpointError::Timeout { timeout_secs },
        OllamaError::Rejected { status, body } => EndpointError::Rejected { status, body },
        OllamaError::EmptyResponse { operation } => EndpointError::EmptyResponse {
            operation: operation.to_string(),
        },
        OllamaError::InvalidResponse { message } => EndpointError::InvalidResponse { message },
        err @ (OllamaError::Connection { .. }
        | OllamaError::ServerError { .. }
        | OllamaError::InvalidEndpoint { .. }
        | OllamaError::Client(_)
        | OllamaError::Task(_)) => EndpointError::Unreachable {
            message: err.to_string(),
        },
    }
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl<B: HttpBackend> ModelEndpointPort for OllamaClient<B> {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn check_connection(&self) -> ConnectionStatus {
        Self::check_connection(self).await
    }

    async fn health_check(&self) -> bool {
        Self::health_check(self).await
    }

    async fn list_models(&self, use_cache: bool) -> EndpointResult<Vec<ModelInfo>> {
        Self::list_models(self, use_cache).await.map_err(map_error)
    }

    async fn refresh_models(&self) -> EndpointResult<Vec<ModelInfo>> {
        Self::refresh_models(self).await.map_err(map_error)
    }

    async fn clear_cache(&self) {
        Self::clear_cache(self).await;
    }

    async fn cache_info(&self) -> CacheInfo {
        Self::cache_info(self).await
    }

    async fn refine_prompt(
        &self,
        objective: &str,
        target_model: Option<&str>,
    ) -> EndpointResult<String> {
        Self::refine_prompt(self, objective, target_model)
            .await
            .map_err(map_error)
    }

    async fn test_prompt(&self, request: &PromptTestRequest) -> EndpointResult<PromptTestResult> {
        Self::test_prompt(self, request).await.map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::client;
    use crate::http::testing::{FakeBackend, FakeReply};
    use std::sync::Arc;

    #[test]
    fn test_map_error() {
        assert_eq!(
            map_error(OllamaError::Timeout { timeout_secs: 30 }),
            EndpointError::Timeout { timeout_secs: 30 }
        );
        assert_eq!(
            map_error(OllamaError::ServerError { status: 500 }),
            EndpointError::Unreachable {
                message: "Ollama server error: 500".to_string()
            }
        );
        assert_eq!(
            map_error(OllamaError::Connection {
                endpoint: "http://localhost:11434".to_string(),
                message: "refused".to_string(),
            }),
            EndpointError::Unreachable {
                message: "Failed to connect to Ollama at http://localhost:11434".to_string()
            }
        );
        assert_eq!(
            map_error(OllamaError::EmptyResponse {
                operation: "prompt testing"
            }),
            EndpointError::EmptyResponse {
                operation: "prompt testing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let backend = FakeBackend::new().with_reply("/api/tags", FakeReply::Timeout);
        let port: Arc<dyn ModelEndpointPort> = Arc::new(client(backend));

        assert_eq!(port.endpoint(), "http://fake-ollama:11434");
        assert_eq!(port.default_model(), "llama2");
        assert!(matches!(
            port.list_models(true).await,
            Err(EndpointError::Timeout { .. })
        ));
        assert!(!port.cache_info().await.cached);
    }
}
