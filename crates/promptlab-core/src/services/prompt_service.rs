//! Prompt service - orchestrates prompt CRUD operations.

use crate::domain::{Prompt, PromptDraft};
use crate::ports::{CoreError, PromptRepository};
use crate::validation::{ValidationMode, validate_prompt};
use std::sync::Arc;
use tracing::info;

/// Service for prompt operations.
///
/// Validates drafts, applies defaults and delegates persistence to the
/// injected `PromptRepository`.
pub struct PromptService {
    repo: Arc<dyn PromptRepository>,
}

impl PromptService {
    /// Create a new prompt service with the given repository.
    pub fn new(repo: Arc<dyn PromptRepository>) -> Self {
        Self { repo }
    }

    /// List prompts ordered by name.
    ///
    /// A non-blank `search` keeps prompts whose name or description contains
    /// it, ignoring case.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Prompt>, CoreError> {
        let prompts = self.repo.list().await?;
        let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(prompts);
        };
        let term = term.to_lowercase();
        Ok(prompts
            .into_iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&term)
                    || p
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            })
            .collect())
    }

    /// Get a prompt by ID.
    pub async fn get(&self, id: i64) -> Result<Prompt, CoreError> {
        self.repo.get_by_id(id).await.map_err(CoreError::from)
    }

    /// Create a prompt from a draft.
    ///
    /// `name` and `system_prompt` are required; the name must not already
    /// exist (exact match).
    pub async fn create(&self, draft: PromptDraft) -> Result<Prompt, CoreError> {
        validate_prompt(&draft, ValidationMode::Create)?;
        let prompt = self.repo.insert(&draft.into_new_prompt()).await?;
        info!(id = prompt.id, name = %prompt.name, "Created prompt");
        Ok(prompt)
    }

    /// Apply the fields present in `draft` to an existing prompt.
    pub async fn update(&self, id: i64, draft: PromptDraft) -> Result<Prompt, CoreError> {
        validate_prompt(&draft, ValidationMode::Update)?;
        let mut prompt = self.repo.get_by_id(id).await?;
        prompt.apply(draft.into_update());
        self.repo.update(&prompt).await?;
        info!(id, name = %prompt.name, "Updated prompt");
        Ok(prompt)
    }

    /// Delete a prompt, returning what was removed.
    pub async fn delete(&self, id: i64) -> Result<Prompt, CoreError> {
        let prompt = self.repo.get_by_id(id).await?;
        self.repo.delete(id).await?;
        info!(id, name = %prompt.name, "Deleted prompt");
        Ok(prompt)
    }
}
