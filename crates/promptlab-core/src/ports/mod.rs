//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` or `reqwest` types in any signature
//! - Traits are minimal and CRUD-focused for repositories
//! - Intent-based methods for the model endpoint (not transport-leaking)

pub mod model_endpoint;
pub mod prompt_repository;
pub mod settings_repository;

use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

pub use model_endpoint::{
    CacheInfo, ConnectionState, ConnectionStatus, EndpointError, EndpointResult, ModelEndpointPort,
    ModelInfo, PromptTestRequest, PromptTestResult,
};
pub use prompt_repository::PromptRepository;
pub use settings_repository::SettingsRepository;

use crate::domain::LibraryError;
use crate::settings::{SettingsErrors, SettingsFileError};
use crate::validation::ValidationErrors;

/// Container for all repository trait objects.
///
/// This struct provides a consistent way to wire repositories across adapters
/// without coupling them to concrete implementations. It lives in
/// `promptlab-core` so that `AppCore` can accept it without depending on
/// `promptlab-db`.
///
/// # Example
///
/// ```ignore
/// // In promptlab-db factory:
/// pub fn build_repos(pool: &SqlitePool) -> Repos { ... }
///
/// // In adapter bootstrap:
/// let repos = promptlab_db::factory::build_repos(&pool);
/// let core = AppCore::new(repos, endpoint);
/// ```
#[derive(Clone)]
pub struct Repos {
    /// Prompt repository for CRUD operations on prompts.
    pub prompts: Arc<dyn PromptRepository>,
    /// Settings repository for application settings.
    pub settings: Arc<dyn SettingsRepository>,
}

impl Repos {
    /// Create a new Repos container.
    pub fn new(prompts: Arc<dyn PromptRepository>, settings: Arc<dyn SettingsRepository>) -> Self {
        Self { prompts, settings }
    }
}

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same identifier already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A constraint was violated (e.g., check constraint).
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Core error type for semantic domain errors.
///
/// This is the canonical error type used across the core domain.
/// Adapters should map this to their own error types (HTTP status codes,
/// CLI exit codes).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Model endpoint operation failed.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    /// Settings validation failed.
    #[error(transparent)]
    Settings(#[from] SettingsErrors),

    /// Settings file could not be read or written.
    #[error(transparent)]
    SettingsFile(#[from] SettingsFileError),

    /// Prompt fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A non-prompt input (objective, test input) failed validation.
    #[error("{message}")]
    InvalidInput {
        /// Summary suitable for display
        message: String,
        /// Per-field messages keyed by input field name
        details: BTreeMap<String, String>,
    },

    /// Library document could not be decoded or encoded.
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// Internal error (unexpected condition).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Single-field input error.
    pub(crate) fn invalid_input(
        message: impl Into<String>,
        field: &str,
        detail: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            message: message.into(),
            details: BTreeMap::from([(field.to_string(), detail.into())]),
        }
    }
}
