//! Core-owned DTOs for model endpoint operations.
//!
//! These types cross the boundary between `promptlab-ollama` and consumers.
//! They carry only what the application needs, not the endpoint's wire
//! format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A model installed on the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model tag (e.g. "llama2:latest")
    pub name: String,
    /// Size on disk in bytes
    pub size: u64,
    /// Last modification time as reported by the endpoint
    pub modified_at: String,
    /// Content digest
    pub digest: String,
    /// Size in megabytes, rounded to one decimal
    pub size_mb: f64,
}

impl ModelInfo {
    /// Build a model entry, deriving `size_mb` from `size`.
    pub fn new(
        name: impl Into<String>,
        size: u64,
        modified_at: impl Into<String>,
        digest: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            modified_at: modified_at.into(),
            digest: digest.into(),
            size_mb: size_in_mb(size),
        }
    }
}

/// Convert a byte count to megabytes with one decimal.
#[allow(clippy::cast_precision_loss)]
pub fn size_in_mb(bytes: u64) -> f64 {
    if bytes == 0 {
        return 0.0;
    }
    (bytes as f64 / BYTES_PER_MB * 10.0).round() / 10.0
}

/// Snapshot of the model-list cache state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheInfo {
    /// Whether a snapshot is held at all
    pub cached: bool,
    /// When the snapshot was captured
    pub cache_time: Option<DateTime<Utc>>,
    /// Whole seconds since capture
    pub cache_age_seconds: Option<u64>,
    /// Whether the snapshot is younger than the TTL
    pub cache_valid: bool,
    /// Number of models in the snapshot
    pub models_count: usize,
    /// Configured time-to-live
    pub ttl_seconds: u64,
}

/// Health label reported alongside a connection check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Healthy,
    Error,
}

/// Outcome of a connection check. Never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub endpoint: String,
    pub status: ConnectionState,
    pub message: String,
}

impl ConnectionStatus {
    pub fn healthy(endpoint: impl Into<String>) -> Self {
        Self {
            connected: true,
            endpoint: endpoint.into(),
            status: ConnectionState::Healthy,
            message: "Successfully connected to Ollama".to_string(),
        }
    }

    pub fn failed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            connected: false,
            endpoint: endpoint.into(),
            status: ConnectionState::Error,
            message: message.into(),
        }
    }
}

/// Input for a single prompt test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTestRequest {
    pub system_prompt: String,
    pub user_input: String,
    /// Falls back to the client's default model.
    pub model: Option<String>,
    /// Falls back to the client's default temperature.
    pub temperature: Option<f64>,
}

/// Output of a single prompt test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTestResult {
    /// Generated text, trimmed
    pub response: String,
    /// Wall-clock seconds around the request, rounded to two decimals
    pub execution_time: f64,
    /// Model actually used
    pub model: String,
    /// Temperature actually used
    pub temperature: f64,
    pub system_prompt: String,
    pub user_input: String,
}
