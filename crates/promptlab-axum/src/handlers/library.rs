//! Library handlers - export and import of the whole prompt library.

use axum::Json;
use axum::extract::State;
use promptlab_core::{ConflictPolicy, LibraryFormat};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::HttpError;
use crate::extract::{JsonBody, JsonBodyOrDefault};
use crate::state::AppState;

/// Export request body.
#[derive(Debug, Default, Deserialize)]
pub struct ExportRequest {
    /// `json` (default) or `yaml`.
    pub format: Option<String>,
}

/// Import request body.
#[derive(Debug, Default, Deserialize)]
pub struct ImportRequest {
    /// Library text, or an already-decoded library object.
    pub import_data: Option<Value>,
    /// `skip` (default), `overwrite` or `rename`.
    pub conflict_resolution: Option<String>,
    /// `json` or `yaml`; detected from the text when absent.
    pub format: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Render every prompt as a library document.
pub async fn export(
    State(state): State<AppState>,
    JsonBodyOrDefault(req): JsonBodyOrDefault<ExportRequest>,
) -> Result<Json<Value>, HttpError> {
    let format = non_blank(req.format.as_deref())
        .map(str::parse::<LibraryFormat>)
        .transpose()?
        .unwrap_or_default();

    let export = state.core.library().export(format).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Library exported successfully in {} format", export.format),
        "export_data": export.data,
        "metadata": export.metadata,
        "content_type": export.content_type,
    })))
}

/// Merge a library document into storage.
pub async fn import(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ImportRequest>,
) -> Result<Json<Value>, HttpError> {
    let (text, format) = match req.import_data {
        Some(Value::String(text)) if !text.trim().is_empty() => {
            let format = non_blank(req.format.as_deref())
                .map(str::parse::<LibraryFormat>)
                .transpose()?;
            (text, format)
        }
        Some(data @ Value::Object(_)) => {
            let text = serde_json::to_string(&data)
                .map_err(|e| HttpError::Internal(format!("Failed to re-encode import data: {e}")))?;
            (text, Some(LibraryFormat::Json))
        }
        Some(Value::Array(_)) => {
            return Err(HttpError::bad_request(
                "INVALID_STRUCTURE",
                "Import data must be an object",
            ));
        }
        _ => {
            return Err(HttpError::bad_request(
                "MISSING_IMPORT_DATA",
                "import_data field is required",
            ));
        }
    };

    let policy = non_blank(req.conflict_resolution.as_deref())
        .map(str::parse::<ConflictPolicy>)
        .transpose()?
        .unwrap_or_default();

    let report = state
        .core
        .library()
        .import_text(&text, format, policy)
        .await?;
    let summary = report.summary();

    Ok(Json(json!({
        "success": true,
        "message": format!("Import completed. Processed {} prompts.", summary.total_processed),
        "results": report,
        "summary": summary,
    })))
}
