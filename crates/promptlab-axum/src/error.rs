//! Axum-specific error types and mappings.
//!
//! This module provides the error type returned by every handler and the
//! mapping from `CoreError` (and its parts) to HTTP status codes and
//! response bodies.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use promptlab_core::{
    CoreError, EndpointError, LibraryError, RepositoryError, SettingsErrors, SettingsFileError,
    ValidationErrors,
};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Input failed validation; `details` maps field names to messages.
    #[error("{message}")]
    Validation {
        message: String,
        details: BTreeMap<String, String>,
    },

    /// Bad request with a stable error code.
    #[error("{message}")]
    BadRequest {
        error_type: &'static str,
        message: String,
    },

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// A file named in the request does not exist.
    #[error("{0}")]
    FileNotFound(String),

    /// Conflict (resource already exists).
    #[error("{0}")]
    Conflict(String),

    /// The model endpoint failed.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl HttpError {
    pub fn bad_request(error_type: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            error_type,
            message: message.into(),
        }
    }

    /// Status code and stable `type` discriminant.
    pub fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::BadRequest { error_type, .. } => (StatusCode::BAD_REQUEST, *error_type),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::FileNotFound(_) => (StatusCode::NOT_FOUND, "FILE_NOT_FOUND"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "DUPLICATE_NAME"),
            Self::Endpoint(err) => match err {
                EndpointError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "OLLAMA_TIMEOUT"),
                EndpointError::Unreachable { .. } | EndpointError::InvalidResponse { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "OLLAMA_CONNECTION_ERROR")
                }
                EndpointError::Rejected { .. } => (StatusCode::BAD_GATEWAY, "OLLAMA_REJECTED"),
                EndpointError::EmptyResponse { .. } => (StatusCode::BAD_GATEWAY, "EMPTY_RESPONSE"),
            },
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    /// Stable error type discriminant for client-side handling
    #[serde(rename = "type")]
    error_type: &'static str,
    /// Per-field messages for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<BTreeMap<String, String>>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error_type, "{self}");
        } else {
            tracing::debug!(status = status.as_u16(), error_type, "{self}");
        }

        let message = self.to_string();
        let details = match self {
            Self::Validation { details, .. } => Some(details),
            _ => None,
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
            error_type,
            details,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Repository(repo_err) => repo_err.into(),
            CoreError::Endpoint(endpoint_err) => Self::Endpoint(endpoint_err),
            CoreError::Settings(settings_err) => settings_err.into(),
            CoreError::SettingsFile(file_err) => file_err.into(),
            CoreError::Validation(errors) => errors.into(),
            CoreError::InvalidInput { message, details } => Self::Validation { message, details },
            CoreError::Library(library_err) => library_err.into(),
            CoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<RepositoryError> for HttpError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => Self::NotFound(format!("{msg} not found")),
            RepositoryError::AlreadyExists(msg) => Self::Conflict(format!("{msg} already exists")),
            RepositoryError::Constraint(msg) => Self::bad_request("VALIDATION_ERROR", msg),
            RepositoryError::Storage(msg) => Self::Internal(format!("Storage: {msg}")),
            RepositoryError::Serialization(msg) => {
                Self::Internal(format!("Serialization: {msg}"))
            }
        }
    }
}

impl From<ValidationErrors> for HttpError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation {
            message: "Validation failed".to_string(),
            details: errors
                .iter()
                .map(|(field, msg)| (field.as_str().to_string(), msg.to_string()))
                .collect(),
        }
    }
}

impl From<SettingsErrors> for HttpError {
    fn from(errors: SettingsErrors) -> Self {
        Self::Validation {
            message: "Configuration validation failed".to_string(),
            details: errors
                .iter()
                .map(|(field, msg)| (field.to_string(), msg.to_string()))
                .collect(),
        }
    }
}

impl From<SettingsFileError> for HttpError {
    fn from(err: SettingsFileError) -> Self {
        match err {
            SettingsFileError::NotFound(_) => Self::FileNotFound(err.to_string()),
            SettingsFileError::InvalidFormat(_) => Self::bad_request("INVALID_FORMAT", err.to_string()),
            SettingsFileError::Parse { .. } => {
                Self::bad_request("INVALID_CONFIG_FILE", err.to_string())
            }
            SettingsFileError::Io { .. } | SettingsFileError::Serialize(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<LibraryError> for HttpError {
    fn from(err: LibraryError) -> Self {
        let error_type = match err {
            LibraryError::InvalidFormat(_) => "INVALID_FORMAT",
            LibraryError::InvalidConflictPolicy(_) => "INVALID_CONFLICT_RESOLUTION",
            LibraryError::Parse { .. } => "PARSE_ERROR",
            LibraryError::InvalidStructure => "INVALID_STRUCTURE",
            LibraryError::MissingPromptsField => "MISSING_PROMPTS_FIELD",
            LibraryError::InvalidPromptsStructure => "INVALID_PROMPTS_STRUCTURE",
            LibraryError::Render { .. } => return Self::Internal(err.to_string()),
        };
        Self::bad_request(error_type, err.to_string())
    }
}
