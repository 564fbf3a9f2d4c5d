//! Prompt repository trait definition.
//!
//! This port defines the interface for prompt persistence operations.
//! Implementations must handle all storage details internally.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{NewPrompt, Prompt};

/// Repository for prompt persistence operations.
///
/// Names are unique and compared case-sensitively at this layer.
///
/// # Design Rules
///
/// - No `sqlx` types in signatures
/// - CRUD-only: list, get, insert, update, delete
/// - Search and import conflict logic belong in the services, not here
#[async_trait]
pub trait PromptRepository: Send + Sync {
    /// List all prompts ordered by name.
    async fn list(&self) -> Result<Vec<Prompt>, RepositoryError>;

    /// Get a prompt by its storage ID.
    ///
    /// Returns `Err(RepositoryError::NotFound)` if the prompt doesn't exist.
    async fn get_by_id(&self, id: i64) -> Result<Prompt, RepositoryError>;

    /// Find a prompt by its exact name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Prompt>, RepositoryError>;

    /// Insert a new prompt.
    ///
    /// Returns the persisted prompt with its assigned ID and timestamps.
    /// Returns `Err(RepositoryError::AlreadyExists)` if the name is taken.
    async fn insert(&self, prompt: &NewPrompt) -> Result<Prompt, RepositoryError>;

    /// Persist every field of an existing prompt, including `updated_at`.
    ///
    /// Returns `Err(RepositoryError::NotFound)` if the prompt doesn't exist
    /// and `Err(RepositoryError::AlreadyExists)` if the new name is taken.
    async fn update(&self, prompt: &Prompt) -> Result<(), RepositoryError>;

    /// Delete a prompt by its storage ID.
    ///
    /// Returns `Err(RepositoryError::NotFound)` if the prompt doesn't exist.
    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;
}
