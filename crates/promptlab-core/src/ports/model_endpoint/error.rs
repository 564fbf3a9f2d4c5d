//! Error types for model endpoint port operations.

use thiserror::Error;

/// Errors from model endpoint operations.
///
/// These are domain-level errors that consumers can handle.
/// Transport-specific errors (HTTP, JSON) are mapped to these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// The endpoint could not be reached or kept failing with 5xx.
    #[error("Cannot connect to model endpoint: {message}")]
    Unreachable {
        /// Description of the last failure
        message: String,
    },

    /// Every attempt exceeded the request timeout.
    #[error("Model endpoint request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured per-request timeout
        timeout_secs: u64,
    },

    /// The endpoint refused the request with a 4xx status.
    #[error("Model endpoint rejected the request with status {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// The endpoint answered but generated no text.
    #[error("Model endpoint returned an empty response for {operation}")]
    EmptyResponse {
        /// Which operation produced no output
        operation: String,
    },

    /// The response body could not be decoded.
    #[error("Invalid model endpoint response: {message}")]
    InvalidResponse {
        /// What was invalid
        message: String,
    },
}

/// Result type alias for model endpoint port operations.
pub type EndpointResult<T> = Result<T, EndpointError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EndpointError::Rejected {
            status: 404,
            body: "model 'nope' not found".to_string(),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("model 'nope' not found"));

        let err = EndpointError::Timeout { timeout_secs: 30 };
        assert!(err.to_string().contains("30s"));
    }
}
