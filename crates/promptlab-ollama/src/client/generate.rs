//! Prompt refinement and prompt testing via `/api/generate`.

use promptlab_core::{PromptTestRequest, PromptTestResult};
use tokio::time::Instant;
use tracing::info;

use super::OllamaClient;
use crate::error::{OllamaError, OllamaResult};
use crate::http::HttpBackend;
use crate::models::{
    GenerateRequest, GenerateResponse, REFINE_TEMPERATURE, refinement_prompt, test_transcript,
};
use crate::url::GENERATE_PATH;

/// Round to two decimals.
fn round_secs(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

impl<B: HttpBackend> OllamaClient<B> {
    /// Send one non-streaming generation and return the trimmed text.
    ///
    /// Blank output is `EmptyResponse` tagged with `operation`.
    async fn generate(
        &self,
        operation: &'static str,
        model: &str,
        prompt: &str,
        temperature: f64,
    ) -> OllamaResult<String> {
        let payload = serde_json::to_value(GenerateRequest::new(model, prompt, temperature))?;
        let reply: GenerateResponse = self.post_json(operation, GENERATE_PATH, &payload).await?;

        let text = reply.response.trim();
        if text.is_empty() {
            return Err(OllamaError::EmptyResponse { operation });
        }
        Ok(text.to_string())
    }

    /// Expand an objective into a full system prompt.
    ///
    /// Runs on `target_model`, or the default model when `None`.
    pub async fn refine_prompt(
        &self,
        objective: &str,
        target_model: Option<&str>,
    ) -> OllamaResult<String> {
        let objective = objective.to_string();
        let target_model = target_model.map(str::to_string);
        self.detached(move |client| async move {
            client.refine(&objective, target_model.as_deref()).await
        })
        .await
    }

    async fn refine(&self, objective: &str, target_model: Option<&str>) -> OllamaResult<String> {
        let model = target_model.unwrap_or(&self.default_model);
        let refined = self
            .generate(
                "prompt refinement",
                model,
                &refinement_prompt(objective),
                REFINE_TEMPERATURE,
            )
            .await?;
        info!(model, chars = refined.len(), "Refined prompt");
        Ok(refined)
    }

    /// Run a system prompt against one user message and time the call.
    pub async fn test_prompt(&self, request: &PromptTestRequest) -> OllamaResult<PromptTestResult> {
        let request = request.clone();
        self.detached(move |client| async move { client.run_test(&request).await })
            .await
    }

    async fn run_test(&self, request: &PromptTestRequest) -> OllamaResult<PromptTestResult> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let temperature = request.temperature.unwrap_or(self.default_temperature);
        let transcript = test_transcript(&request.system_prompt, &request.user_input);

        let started = Instant::now();
        let response = self
            .generate("prompt testing", model, &transcript, temperature)
            .await?;
        let execution_time = round_secs(started.elapsed().as_secs_f64());
        info!(model, execution_time, "Prompt test completed");

        Ok(PromptTestResult {
            response,
            execution_time,
            model: model.to_string(),
            temperature,
            system_prompt: request.system_prompt.clone(),
            user_input: request.user_input.clone(),
        })
    }
}
