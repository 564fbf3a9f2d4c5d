//! `SQLite` implementation of the `PromptRepository` trait.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use promptlab_core::{NewPrompt, Prompt, PromptRepository, RepositoryError};

use super::row_mappers::{PROMPT_SELECT_COLUMNS, format_datetime, row_to_prompt};

/// `SQLite` implementation of the `PromptRepository` trait.
///
/// Name uniqueness is enforced by the table's `UNIQUE` constraint, which
/// compares with the default `BINARY` collation (case-sensitive).
pub struct SqlitePromptRepository {
    pool: SqlitePool,
}

impl SqlitePromptRepository {
    /// Create a new `SQLite` prompt repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Map `SQLx` errors to `RepositoryError`.
fn map_sqlx_error(e: sqlx::Error, name: &str) -> RepositoryError {
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint failed") && msg.contains("prompts.name") {
        return RepositoryError::AlreadyExists(format!("Prompt with name '{name}'"));
    }
    if msg.contains("constraint failed") {
        return RepositoryError::Constraint(msg);
    }
    RepositoryError::Storage(msg)
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PromptRepository for SqlitePromptRepository {
    async fn list(&self) -> Result<Vec<Prompt>, RepositoryError> {
        let query = format!("SELECT {PROMPT_SELECT_COLUMNS} FROM prompts ORDER BY name");

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        rows.iter().map(row_to_prompt).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Prompt, RepositoryError> {
        let query = format!("SELECT {PROMPT_SELECT_COLUMNS} FROM prompts WHERE id = ?");

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?
            .ok_or_else(|| RepositoryError::NotFound(format!("Prompt with ID {id}")))?;

        row_to_prompt(&row)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Prompt>, RepositoryError> {
        let query = format!("SELECT {PROMPT_SELECT_COLUMNS} FROM prompts WHERE name = ?");

        sqlx::query(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?
            .as_ref()
            .map(row_to_prompt)
            .transpose()
    }

    async fn insert(&self, prompt: &NewPrompt) -> Result<Prompt, RepositoryError> {
        let now = format_datetime(&Utc::now());

        let result = sqlx::query(
            r#"INSERT INTO prompts (
                name, description, system_prompt, model, temperature, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&prompt.name)
        .bind(&prompt.description)
        .bind(&prompt.system_prompt)
        .bind(&prompt.model)
        .bind(prompt.temperature)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &prompt.name))?;

        self.get_by_id(result.last_insert_rowid()).await
    }

    async fn update(&self, prompt: &Prompt) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE prompts SET name = ?, description = ?, system_prompt = ?, model = ?, temperature = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&prompt.name)
        .bind(&prompt.description)
        .bind(&prompt.system_prompt)
        .bind(&prompt.model)
        .bind(prompt.temperature)
        .bind(format_datetime(&prompt.updated_at))
        .bind(prompt.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &prompt.name))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Prompt with ID {}",
                prompt.id
            )));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM prompts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Prompt with ID {id}")));
        }

        Ok(())
    }
}
