//! Model endpoint port trait.

use super::error::EndpointResult;
use super::types::{CacheInfo, ConnectionStatus, ModelInfo, PromptTestRequest, PromptTestResult};
use async_trait::async_trait;

/// Port trait for the local generation endpoint.
///
/// This trait defines the interface that the core domain uses to list
/// models and generate text. The implementation lives in `promptlab-ollama`.
///
/// # Design
///
/// - Uses core-owned DTOs, not the endpoint's wire types
/// - Returns `EndpointError` for all failures
/// - Retries, backoff and model-list caching are the implementation's job
#[async_trait]
pub trait ModelEndpointPort: Send + Sync {
    /// Base URL of the endpoint this client talks to.
    fn endpoint(&self) -> &str;

    /// Model used when a call names none.
    fn default_model(&self) -> &str;

    /// Check the endpoint. Failures are reported in the status, never raised.
    async fn check_connection(&self) -> ConnectionStatus;

    /// `true` when the endpoint answers a listing call.
    async fn health_check(&self) -> bool;

    /// List installed models.
    ///
    /// With `use_cache`, a snapshot younger than the TTL is returned without
    /// a network call.
    async fn list_models(&self, use_cache: bool) -> EndpointResult<Vec<ModelInfo>>;

    /// Fetch the model list from the network and replace the cache.
    async fn refresh_models(&self) -> EndpointResult<Vec<ModelInfo>> {
        self.list_models(false).await
    }

    /// Drop the cached model list.
    async fn clear_cache(&self);

    /// Describe the cache without touching the network.
    async fn cache_info(&self) -> CacheInfo;

    /// Turn a short objective into a full system prompt.
    ///
    /// # Arguments
    ///
    /// * `objective` - What the prompt should accomplish
    /// * `target_model` - Model to run the refinement on (default model if `None`)
    async fn refine_prompt(
        &self,
        objective: &str,
        target_model: Option<&str>,
    ) -> EndpointResult<String>;

    /// Run a system prompt against one user message.
    async fn test_prompt(&self, request: &PromptTestRequest) -> EndpointResult<PromptTestResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // Verify the trait is object-safe
    fn _assert_object_safe(_: Arc<dyn ModelEndpointPort>) {}
}
