//! Playground handlers - refine, test and model listing against Ollama.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use promptlab_core::{PromptTestRequest, PromptTestResult};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::HttpError;
use crate::extract::JsonBody;
use crate::state::AppState;

/// `true` only for a case-insensitive `"true"`; absent means `default`.
pub(crate) fn query_flag(value: Option<&str>, default: bool) -> bool {
    value.map_or(default, |v| v.trim().eq_ignore_ascii_case("true"))
}

// ============================================================================
// Refine / test
// ============================================================================

/// Refinement request body.
#[derive(Debug, Default, Deserialize)]
pub struct RefineRequest {
    #[serde(default)]
    pub objective: String,
    pub target_model: Option<String>,
}

/// Turn an objective into a full system prompt.
pub async fn refine(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RefineRequest>,
) -> Result<Json<Value>, HttpError> {
    let refined = state
        .core
        .playground()
        .refine(&req.objective, req.target_model.as_deref())
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Prompt refined successfully",
        "objective": refined.objective,
        "refined_prompt": refined.refined_prompt,
        "model_used": refined.model_used,
    })))
}

/// Test request body. `temperature` may be a number or a numeric string.
#[derive(Debug, Default, Deserialize)]
pub struct RunTestRequest {
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub user_input: String,
    pub model: Option<String>,
    pub temperature: Option<Value>,
}

fn parse_temperature(value: Option<Value>) -> Result<Option<f64>, HttpError> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    };
    parsed.map(Some).ok_or_else(|| HttpError::Validation {
        message: "Validation failed".to_string(),
        details: BTreeMap::from([(
            "temperature".to_string(),
            "Temperature must be a valid number".to_string(),
        )]),
    })
}

#[derive(Serialize)]
struct PromptConfiguration<'a> {
    system_prompt: &'a str,
    model: &'a str,
    temperature: f64,
    test_input: &'a str,
    test_output: &'a str,
    execution_time_seconds: f64,
}

#[derive(Serialize)]
struct YamlConfig<'a> {
    prompt_configuration: PromptConfiguration<'a>,
}

/// Render a tested configuration as a `prompt_configuration` YAML block.
pub fn yaml_snippet(result: &PromptTestResult) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&YamlConfig {
        prompt_configuration: PromptConfiguration {
            system_prompt: &result.system_prompt,
            model: &result.model,
            temperature: result.temperature,
            test_input: &result.user_input,
            test_output: &result.response,
            execution_time_seconds: result.execution_time,
        },
    })
}

/// Run a system prompt against one user message.
pub async fn run_test(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RunTestRequest>,
) -> Result<Json<Value>, HttpError> {
    let request = PromptTestRequest {
        system_prompt: req.system_prompt,
        user_input: req.user_input,
        model: req.model,
        temperature: parse_temperature(req.temperature)?,
    };
    let result = state.core.playground().test(request).await?;
    let yaml_config = yaml_snippet(&result)
        .map_err(|e| HttpError::Internal(format!("Failed to render YAML configuration: {e}")))?;

    Ok(Json(json!({
        "success": true,
        "message": "Prompt test completed successfully",
        "response": result.response,
        "execution_time": result.execution_time,
        "model": result.model,
        "temperature": result.temperature,
        "yaml_config": yaml_config,
    })))
}

// ============================================================================
// Models and cache
// ============================================================================

/// Query parameters for the model list.
#[derive(Debug, Default, Deserialize)]
pub struct ModelsQuery {
    pub refresh: Option<String>,
    pub cache_info: Option<String>,
}

/// List installed models, from the cache unless `refresh=true`.
pub async fn models(
    State(state): State<AppState>,
    Query(query): Query<ModelsQuery>,
) -> Result<Json<Value>, HttpError> {
    let playground = state.core.playground();
    let models = if query_flag(query.refresh.as_deref(), false) {
        playground.refresh_models().await?
    } else {
        playground.list_models(true).await?
    };

    let mut body = json!({
        "success": true,
        "message": "Models retrieved successfully",
        "count": models.len(),
        "models": models,
    });
    if query_flag(query.cache_info.as_deref(), false) {
        body["cache_info"] = json!(playground.cache_info().await);
    }
    Ok(Json(body))
}

/// Describe the model-list cache.
pub async fn cache_info(State(state): State<AppState>) -> Json<Value> {
    let info = state.core.playground().cache_info().await;
    Json(json!({
        "success": true,
        "message": "Cache information retrieved successfully",
        "cache_info": info,
    }))
}

/// Drop the model-list cache.
pub async fn clear_cache(State(state): State<AppState>) -> Json<Value> {
    state.core.playground().clear_cache().await;
    Json(json!({
        "success": true,
        "message": "Models cache cleared successfully",
    }))
}

/// Check the endpoint; 503 when it cannot be reached.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let status = state.core.playground().check_connection().await;
    let code = if status.connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        code,
        Json(json!({
            "success": status.connected,
            "message": status.message,
            "status": status,
        })),
    )
}
