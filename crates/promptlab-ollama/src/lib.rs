#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod cache;
mod client;
mod config;
mod error;
mod http;
mod models;
mod port;
mod url;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::{DefaultOllamaClient, OllamaClient};

// Configuration
pub use config::OllamaClientConfig;

// Errors
pub use error::{OllamaError, OllamaResult};

// Backend seam
pub use http::{HttpBackend, HttpResponse, ReqwestBackend};

// Error mapping for adapters that hold an `OllamaError`
pub use port::map_error;

/// Scripted backend for tests in this and downstream crates.
#[cfg(any(test, feature = "test-utils"))]
pub use http::testing;

