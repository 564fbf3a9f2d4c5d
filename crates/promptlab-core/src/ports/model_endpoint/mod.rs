//! Model endpoint port definitions.
//!
//! This module defines the port trait and DTOs for talking to the local
//! generation endpoint. The actual implementation lives in `promptlab-ollama`.

mod client;
mod error;
mod types;

pub use client::ModelEndpointPort;
pub use error::{EndpointError, EndpointResult};
pub use types::{
    CacheInfo, ConnectionState, ConnectionStatus, ModelInfo, PromptTestRequest, PromptTestResult,
};
