//! Playground service - prompt refinement and testing against the model endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::ports::{
    CacheInfo, ConnectionStatus, CoreError, ModelEndpointPort, ModelInfo, PromptTestRequest,
    PromptTestResult,
};
use crate::validation::{MAX_MODEL_CHARS, MAX_SYSTEM_PROMPT_CHARS, check_temperature};

/// Maximum objective length for refinement, in characters.
pub const MAX_OBJECTIVE_CHARS: usize = 5_000;

/// Maximum user input length for a test, in characters.
pub const MAX_USER_INPUT_CHARS: usize = 10_000;

/// Endpoint client slot that can be replaced while requests are in flight.
///
/// Readers clone the inner `Arc`, so a swap never affects a call that has
/// already started.
pub type SharedEndpoint = Arc<RwLock<Arc<dyn ModelEndpointPort>>>;

/// A refined system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefinedPrompt {
    pub objective: String,
    pub refined_prompt: String,
    pub model_used: String,
}

/// Service for refine/test calls and model listing.
pub struct PlaygroundService {
    endpoint: SharedEndpoint,
}

impl PlaygroundService {
    pub fn new(endpoint: Arc<dyn ModelEndpointPort>) -> Self {
        Self {
            endpoint: Arc::new(RwLock::new(endpoint)),
        }
    }

    /// The client currently in use.
    pub async fn endpoint(&self) -> Arc<dyn ModelEndpointPort> {
        Arc::clone(&*self.endpoint.read().await)
    }

    /// Swap in a new client. The old client's cache goes with it.
    pub async fn replace_endpoint(&self, endpoint: Arc<dyn ModelEndpointPort>) {
        let url = endpoint.endpoint().to_string();
        *self.endpoint.write().await = endpoint;
        info!(endpoint = %url, "Replaced model endpoint client");
    }

    /// Refine an objective into a system prompt.
    ///
    /// A blank `target_model` means the default model.
    pub async fn refine(
        &self,
        objective: &str,
        target_model: Option<&str>,
    ) -> Result<RefinedPrompt, CoreError> {
        let objective = objective.trim();
        if objective.is_empty() {
            return Err(CoreError::invalid_input(
                "Objective is required",
                "objective",
                "Objective cannot be empty",
            ));
        }
        if objective.chars().count() > MAX_OBJECTIVE_CHARS {
            return Err(CoreError::invalid_input(
                "Objective is too long",
                "objective",
                "Objective cannot exceed 5,000 characters",
            ));
        }
        let target_model = target_model.map(str::trim).filter(|m| !m.is_empty());

        let endpoint = self.endpoint().await;
        let refined_prompt = endpoint.refine_prompt(objective, target_model).await?;
        Ok(RefinedPrompt {
            objective: objective.to_string(),
            refined_prompt,
            model_used: target_model
                .unwrap_or_else(|| endpoint.default_model())
                .to_string(),
        })
    }

    /// Run a system prompt against one user message.
    pub async fn test(&self, request: PromptTestRequest) -> Result<PromptTestResult, CoreError> {
        let request = validate_test_request(request)?;
        self.endpoint().await.test_prompt(&request).await.map_err(CoreError::from)
    }

    pub async fn list_models(&self, use_cache: bool) -> Result<Vec<ModelInfo>, CoreError> {
        self.endpoint().await.list_models(use_cache).await.map_err(CoreError::from)
    }

    pub async fn refresh_models(&self) -> Result<Vec<ModelInfo>, CoreError> {
        self.endpoint().await.refresh_models().await.map_err(CoreError::from)
    }

    pub async fn clear_cache(&self) {
        self.endpoint().await.clear_cache().await;
    }

    pub async fn cache_info(&self) -> CacheInfo {
        self.endpoint().await.cache_info().await
    }

    pub async fn check_connection(&self) -> ConnectionStatus {
        self.endpoint().await.check_connection().await
    }
}

/// Trim and check a test request; blank model becomes `None`.
fn validate_test_request(request: PromptTestRequest) -> Result<PromptTestRequest, CoreError> {
    let mut details = BTreeMap::new();

    let system_prompt = request.system_prompt.trim().to_string();
    if system_prompt.is_empty() {
        details.insert("system_prompt".to_string(), "System prompt is required".to_string());
    } else if system_prompt.chars().count() > MAX_SYSTEM_PROMPT_CHARS {
        details.insert(
            "system_prompt".to_string(),
            "System prompt cannot exceed 50,000 characters".to_string(),
        );
    }

    let user_input = request.user_input.trim().to_string();
    if user_input.is_empty() {
        details.insert("user_input".to_string(), "User input is required".to_string());
    } else if user_input.chars().count() > MAX_USER_INPUT_CHARS {
        details.insert(
            "user_input".to_string(),
            "User input cannot exceed 10,000 characters".to_string(),
        );
    }

    let model = request
        .model
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());
    if model.as_ref().is_some_and(|m| m.chars().count() > MAX_MODEL_CHARS) {
        details.insert(
            "model".to_string(),
            "Model name cannot exceed 100 characters".to_string(),
        );
    }

    if let Some(Err(message)) = request.temperature.map(check_temperature) {
        details.insert("temperature".to_string(), message.to_string());
    }

    if !details.is_empty() {
        return Err(CoreError::InvalidInput {
            message: "Validation failed".to_string(),
            details,
        });
    }

    Ok(PromptTestRequest {
        system_prompt,
        user_input,
        model,
        temperature: request.temperature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{ConnectionStatus, EndpointError, EndpointResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the last call and echoes inputs back.
    struct EchoEndpoint {
        url: String,
        refine_calls: Mutex<Vec<(String, Option<String>)>>,
        test_calls: Mutex<Vec<PromptTestRequest>>,
    }

    impl EchoEndpoint {
        fn new(url: &str) -> Self {
            Self {
                url: url.to_string(),
                refine_calls: Mutex::new(Vec::new()),
                test_calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelEndpointPort for EchoEndpoint {
        fn endpoint(&self) -> &str {
            &self.url
        }

        fn default_model(&self) -> &str {
            "llama2"
        }

        async fn check_connection(&self) -> ConnectionStatus {
            ConnectionStatus::healthy(self.url.clone())
        }

        async fn health_check(&self) -> bool {
            true
        }

        async fn list_models(&self, _use_cache: bool) -> EndpointResult<Vec<ModelInfo>> {
            Ok(vec![ModelInfo::new("llama2:latest", 1024, "", "abc")])
        }

        async fn clear_cache(&self) {}

        async fn cache_info(&self) -> CacheInfo {
            CacheInfo {
                cached: false,
                cache_time: None,
                cache_age_seconds: None,
                cache_valid: false,
                models_count: 0,
                ttl_seconds: 300,
            }
        }

        async fn refine_prompt(
            &self,
            objective: &str,
            target_model: Option<&str>,
        ) -> EndpointResult<String> {
            self.refine_calls
                .lock()
                .unwrap()
                .push((objective.to_string(), target_model.map(String::from)));
            if objective == "silence" {
                return Err(EndpointError::EmptyResponse {
                    operation: "prompt refinement".to_string(),
                });
            }
            Ok(format!("You are an assistant that will {objective}."))
        }

        async fn test_prompt(
            &self,
            request: &PromptTestRequest,
        ) -> EndpointResult<PromptTestResult> {
            self.test_calls.lock().unwrap().push(request.clone());
            Ok(PromptTestResult {
                response: "ok".to_string(),
                execution_time: 0.01,
                model: request.model.clone().unwrap_or_else(|| "llama2".to_string()),
                temperature: request.temperature.unwrap_or(0.7),
                system_prompt: request.system_prompt.clone(),
                user_input: request.user_input.clone(),
            })
        }
    }

    fn test_request(system_prompt: &str, user_input: &str) -> PromptTestRequest {
        PromptTestRequest {
            system_prompt: system_prompt.to_string(),
            user_input: user_input.to_string(),
            model: None,
            temperature: None,
        }
    }

    #[tokio::test]
    async fn test_refine_trims_and_defaults_model() {
        let endpoint = Arc::new(EchoEndpoint::new("http://a"));
        let service = PlaygroundService::new(endpoint.clone());

        let refined = service.refine("  summarize emails ", Some("  ")).await.unwrap();
        assert_eq!(refined.objective, "summarize emails");
        assert_eq!(refined.model_used, "llama2");
        assert_eq!(
            endpoint.refine_calls.lock().unwrap()[0],
            ("summarize emails".to_string(), None)
        );
    }

    #[tokio::test]
    async fn test_refine_rejects_blank_and_long_objectives() {
        let service = PlaygroundService::new(Arc::new(EchoEndpoint::new("http://a")));

        let err = service.refine("   ", None).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidInput { ref details, .. }
                if details.get("objective").map(String::as_str) == Some("Objective cannot be empty")
        ));

        let long = "o".repeat(MAX_OBJECTIVE_CHARS + 1);
        let err = service.refine(&long, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Objective is too long");
    }

    #[tokio::test]
    async fn test_refine_propagates_endpoint_errors() {
        let service = PlaygroundService::new(Arc::new(EchoEndpoint::new("http://a")));
        let err = service.refine("silence", None).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Endpoint(EndpointError::EmptyResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_test_collects_field_errors() {
        let service = PlaygroundService::new(Arc::new(EchoEndpoint::new("http://a")));
        let mut request = test_request("", &"u".repeat(MAX_USER_INPUT_CHARS + 1));
        request.temperature = Some(-1.0);

        let CoreError::InvalidInput { details, .. } = service.test(request).await.unwrap_err()
        else {
            panic!("expected input error");
        };
        assert_eq!(details["system_prompt"], "System prompt is required");
        assert_eq!(details["user_input"], "User input cannot exceed 10,000 characters");
        assert_eq!(details["temperature"], "Temperature must be between 0.0 and 2.0");
    }

    #[tokio::test]
    async fn test_run_test_forwards_trimmed_request() {
        let endpoint = Arc::new(EchoEndpoint::new("http://a"));
        let service = PlaygroundService::new(endpoint.clone());
        let mut request = test_request(" Be terse. ", " Hi ");
        request.model = Some(" ".to_string());

        let result = service.test(request).await.unwrap();
        assert_eq!(result.model, "llama2");
        let forwarded = endpoint.test_calls.lock().unwrap()[0].clone();
        assert_eq!(forwarded.system_prompt, "Be terse.");
        assert_eq!(forwarded.user_input, "Hi");
        assert!(forwarded.model.is_none());
    }

    #[tokio::test]
    async fn test_replace_endpoint_swaps_client() {
        let service = PlaygroundService::new(Arc::new(EchoEndpoint::new("http://old")));
        let held = service.endpoint().await;

        service
            .replace_endpoint(Arc::new(EchoEndpoint::new("http://new")))
            .await;

        assert_eq!(held.endpoint(), "http://old");
        assert_eq!(service.endpoint().await.endpoint(), "http://new");
        assert_eq!(
            service.check_connection().await.endpoint,
            "http://new".to_string()
        );
    }
}
