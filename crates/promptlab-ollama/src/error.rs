//! Internal error types for Ollama operations.
//!
//! These errors are internal to `promptlab-ollama` and are mapped to
//! `EndpointError` at the port boundary.

use thiserror::Error;

/// Result type alias for Ollama operations.
pub type OllamaResult<T> = Result<T, OllamaError>;

/// Errors related to Ollama API operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OllamaError {
    /// The request exceeded the configured timeout.
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// Configured per-request timeout
        timeout_secs: u64,
    },

    /// The server could not be reached.
    #[error("Failed to connect to Ollama at {endpoint}")]
    Connection {
        /// Configured endpoint
        endpoint: String,
        /// Transport error detail
        message: String,
    },

    /// The server answered with a 5xx status.
    #[error("Ollama server error: {status}")]
    ServerError {
        /// HTTP status code
        status: u16,
    },

    /// The server refused the request with a 4xx status.
    #[error("Ollama API error: {status} - {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("Invalid response from Ollama: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// Generation produced only whitespace.
    #[error("Received empty response from Ollama during {operation}")]
    EmptyResponse {
        /// Operation that produced no output
        operation: &'static str,
    },

    /// The configured endpoint is not a usable URL.
    #[error("Invalid Ollama endpoint '{endpoint}': {message}")]
    InvalidEndpoint {
        /// Endpoint as configured
        endpoint: String,
        /// Parse failure
        message: String,
    },

    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// The task running a request panicked or was cancelled by shutdown.
    #[error("Ollama request task failed: {0}")]
    Task(String),
}

impl OllamaError {
    /// Whether another attempt may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connection { .. } | Self::ServerError { .. }
        )
    }
}

impl From<serde_json::Error> for OllamaError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidResponse {
            message: e.to_string(),
        }
    }
}
