//! Prompt handlers - CRUD over the prompt library.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use promptlab_core::PromptDraft;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::HttpError;
use crate::extract::JsonBody;
use crate::state::AppState;

/// Query parameters for listing prompts.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
}

/// List prompts ordered by name.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, HttpError> {
    let prompts = state.core.prompts().list(query.search.as_deref()).await?;
    Ok(Json(json!({
        "success": true,
        "count": prompts.len(),
        "prompts": prompts,
    })))
}

/// Get a prompt by ID.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, HttpError> {
    let prompt = state.core.prompts().get(id).await?;
    Ok(Json(json!({ "success": true, "prompt": prompt })))
}

/// Create a prompt.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> Result<(StatusCode, Json<Value>), HttpError> {
    let draft = PromptDraft::from_json(&body)?;
    let prompt = state.core.prompts().create(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Prompt created successfully",
            "prompt": prompt,
        })),
    ))
}

/// Update the fields present in the body.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Value>, HttpError> {
    let draft = PromptDraft::from_json(&body)?;
    let prompt = state.core.prompts().update(id, draft).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Prompt updated successfully",
        "prompt": prompt,
    })))
}

/// Delete a prompt, echoing what was removed.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, HttpError> {
    let prompt = state.core.prompts().delete(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Prompt deleted successfully",
        "deleted_prompt": prompt,
    })))
}
