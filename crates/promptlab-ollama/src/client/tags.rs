//! Model listing, cache access and connection checks.

use promptlab_core::{CacheInfo, ConnectionStatus, ModelInfo};
use tracing::debug;

use super::OllamaClient;
use crate::error::OllamaResult;
use crate::http::HttpBackend;
use crate::models::TagsResponse;
use crate::url::TAGS_PATH;

impl<B: HttpBackend> OllamaClient<B> {
    async fn request_models(&self) -> OllamaResult<Vec<ModelInfo>> {
        let tags: TagsResponse = self.get_json("list models", TAGS_PATH).await?;
        Ok(tags.models.into_iter().map(ModelInfo::from).collect())
    }

    async fn cached_or_fetched(&self, use_cache: bool) -> OllamaResult<Vec<ModelInfo>> {
        if use_cache {
            if let Some(models) = self.cache.fresh().await {
                debug!(count = models.len(), "Model list served from cache");
                return Ok(models);
            }
        }

        let models = self.request_models().await?;
        self.cache.store(models.clone()).await;
        debug!(count = models.len(), "Model list cached");
        Ok(models)
    }

    /// Fetch the installed models, bypassing the cache.
    pub async fn fetch_models(&self) -> OllamaResult<Vec<ModelInfo>> {
        self.detached(|client| async move { client.request_models().await })
            .await
    }

    /// List installed models.
    ///
    /// With `use_cache`, a snapshot younger than the TTL is returned without
    /// a network call. Otherwise the list is fetched and replaces the cache,
    /// even if the caller has stopped waiting by then.
    pub async fn list_models(&self, use_cache: bool) -> OllamaResult<Vec<ModelInfo>> {
        self.detached(move |client| async move { client.cached_or_fetched(use_cache).await })
            .await
    }

    /// Fetch the model list and replace the cache.
    pub async fn refresh_models(&self) -> OllamaResult<Vec<ModelInfo>> {
        self.list_models(false).await
    }

    /// Drop the cached model list.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        debug!("Model cache cleared");
    }

    /// Describe the cache without touching the network.
    pub async fn cache_info(&self) -> CacheInfo {
        self.cache.info().await
    }

    /// Check the server with a listing call. Never fails.
    pub async fn check_connection(&self) -> ConnectionStatus {
        match self.fetch_models().await {
            Ok(_) => ConnectionStatus::healthy(&self.endpoint),
            Err(e) => ConnectionStatus::failed(&self.endpoint, e.to_string()),
        }
    }

    /// `true` when the server answers a listing call.
    pub async fn health_check(&self) -> bool {
        self.fetch_models().await.is_ok()
    }
}
