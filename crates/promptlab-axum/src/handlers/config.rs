//! Config handlers - settings, connection tests and settings files.

use std::path::PathBuf;

use axum::Json;
use axum::extract::{Query, State};
use promptlab_core::{Settings, SettingsFileFormat, SettingsUpdate, validate_endpoint};
use serde::Deserialize;
use serde_json::{Value, json};

use super::ollama::query_flag;
use crate::error::HttpError;
use crate::extract::{JsonBody, JsonBodyOrDefault};
use crate::state::AppState;

/// Default file written by `POST /config/save`.
const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Models shown by a connection test.
const PREVIEW_MODELS: usize = 5;

/// Alternatives offered when the default model is missing.
const SUGGESTED_MODELS: usize = 3;

async fn ollama_status(state: &AppState, check: bool) -> Value {
    let playground = state.core.playground();
    let endpoint = playground.endpoint().await;
    let connected = check && playground.check_connection().await.connected;
    json!({ "connected": connected, "endpoint": endpoint.endpoint() })
}

/// Install a new client when `updated` changes how the endpoint is reached.
async fn apply_endpoint_change(
    state: &AppState,
    previous: &Settings,
    updated: &Settings,
) -> Result<bool, HttpError> {
    if !updated.endpoint_changed(previous) {
        return Ok(false);
    }
    state.rebuild_endpoint(updated).await?;
    Ok(true)
}

/// Current settings plus the endpoint's reachability.
pub async fn get(State(state): State<AppState>) -> Result<Json<Value>, HttpError> {
    let settings = state.core.settings().get().await?;
    Ok(Json(json!({
        "success": true,
        "config": settings,
        "ollama_status": ollama_status(&state, true).await,
    })))
}

/// Apply a partial settings update.
///
/// The endpoint is checked only when the update replaced the client.
pub async fn update(
    State(state): State<AppState>,
    JsonBody(update): JsonBody<SettingsUpdate>,
) -> Result<Json<Value>, HttpError> {
    let previous = state.core.settings().get().await?;
    let updated = state.core.settings().update(update).await?;
    let swapped = apply_endpoint_change(&state, &previous, &updated).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Configuration updated successfully",
        "config": updated,
        "ollama_status": ollama_status(&state, swapped).await,
    })))
}

/// Connection test request body.
#[derive(Debug, Default, Deserialize)]
pub struct TestConnectionRequest {
    /// Endpoint to check; the configured one when absent.
    pub endpoint: Option<String>,
}

/// Check an endpoint with a throwaway client.
pub async fn test_connection(
    State(state): State<AppState>,
    JsonBodyOrDefault(req): JsonBodyOrDefault<TestConnectionRequest>,
) -> Result<Json<Value>, HttpError> {
    let mut settings = state.core.settings().get().await?;
    let endpoint = req
        .endpoint
        .unwrap_or_else(|| settings.effective_ollama_endpoint().to_string());
    validate_endpoint(&endpoint).map_err(|msg| HttpError::bad_request("INVALID_ENDPOINT", msg))?;

    settings.ollama_endpoint = Some(endpoint.trim().to_string());
    let client = state.build_endpoint(&settings)?;
    let status = client.check_connection().await;

    let mut body = json!({
        "success": true,
        "connected": status.connected,
        "endpoint": status.endpoint,
        "message": status.message,
    });
    if status.connected {
        let models = client.list_models(false).await.unwrap_or_default();
        body["models_available"] = json!(models.len());
        body["models"] = json!(models.into_iter().take(PREVIEW_MODELS).collect::<Vec<_>>());
    }
    Ok(Json(body))
}

/// Save request body.
#[derive(Debug, Default, Deserialize)]
pub struct SaveConfigRequest {
    pub path: Option<PathBuf>,
    /// `json` or `yaml`; follows the path's extension when absent.
    pub format: Option<String>,
}

/// Write the current settings to a file.
pub async fn save(
    State(state): State<AppState>,
    JsonBodyOrDefault(req): JsonBodyOrDefault<SaveConfigRequest>,
) -> Result<Json<Value>, HttpError> {
    let path = req
        .path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let format = match req.format.as_deref() {
        Some(format) => format.parse::<SettingsFileFormat>()?,
        None => SettingsFileFormat::from_path(&path),
    };

    let written = state.core.settings().export_to_file(&path, format).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Configuration saved successfully",
        "path": written.display().to_string(),
        "format": format.as_str(),
    })))
}

/// Load request body.
#[derive(Debug, Default, Deserialize)]
pub struct LoadConfigRequest {
    pub path: Option<PathBuf>,
}

/// Replace the current settings with a file's contents.
pub async fn load(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoadConfigRequest>,
) -> Result<Json<Value>, HttpError> {
    let path = req
        .path
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| HttpError::bad_request("MISSING_PATH", "File path is required"))?;

    let previous = state.core.settings().get().await?;
    let loaded = state.core.settings().import_from_file(&path).await?;
    apply_endpoint_change(&state, &previous, &loaded).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Configuration loaded successfully",
        "config": loaded,
        "ollama_status": ollama_status(&state, true).await,
    })))
}

/// Query parameters for the configured model view.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigModelsQuery {
    pub refresh: Option<String>,
    pub include_default: Option<String>,
}

/// A model name matches the default exactly or as its `:latest` tag.
fn is_default_model(name: &str, default_model: &str) -> bool {
    name == default_model
        || name
            .strip_suffix(":latest")
            .is_some_and(|base| base == default_model)
}

/// Installed models alongside the configured default.
pub async fn models(
    State(state): State<AppState>,
    Query(query): Query<ConfigModelsQuery>,
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
        "cache_info": playground.cache_info().await,
    });

    if query_flag(query.include_default.as_deref(), true) {
        let settings = state.core.settings().get().await?;
        let default_model = settings.effective_default_model();
        let available = models
            .iter()
            .any(|m| is_default_model(&m.name, default_model));
        body["default_model"] = json!({
            "name": default_model,
            "available": available,
            "temperature": settings.effective_default_temperature(),
        });
        if !available && !models.is_empty() {
            body["suggested_models"] = json!(&models[..models.len().min(SUGGESTED_MODELS)]);
        }
    }

    body["models"] = json!(models);
    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_matching() {
        assert!(is_default_model("llama2", "llama2"));
        assert!(is_default_model("llama2:latest", "llama2"));
        assert!(!is_default_model("llama2:13b", "llama2"));
        assert!(!is_default_model("llama2-uncensored:latest", "llama2"));
    }
}
