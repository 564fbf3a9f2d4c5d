//! Composition utilities for building `AppCore` with `SQLite` backends.
//!
//! This module provides factory functions for wiring up the application
//! with `SQLite` repositories. It is focused purely on construction and
//! should not contain any domain logic.

use sqlx::SqlitePool;
use std::sync::Arc;

use promptlab_core::services::AppCore;
use promptlab_core::{ModelEndpointPort, Repos};

use crate::repositories::{SqlitePromptRepository, SqliteSettingsRepository};

/// Factory for creating repository instances with `SQLite` backends.
pub struct CoreFactory;

impl CoreFactory {
    /// Create a `SQLite` connection pool.
    ///
    /// # Arguments
    ///
    /// * `db_url` - `SQLite` connection URL (e.g., "sqlite:promptlab.db")
    pub async fn create_pool(db_url: &str) -> anyhow::Result<SqlitePool> {
        let pool = SqlitePool::connect(db_url).await?;
        Ok(pool)
    }

    /// Build all `SQLite` repositories from a pool.
    pub fn build_repos(pool: SqlitePool) -> Repos {
        Repos::new(
            Arc::new(SqlitePromptRepository::new(pool.clone())),
            Arc::new(SqliteSettingsRepository::new(pool)),
        )
    }

    /// Build a complete `AppCore` from a pool and a model endpoint client.
    ///
    /// ```ignore
    /// let pool = setup_database(&db_path).await?;
    /// let client = Arc::new(OllamaClient::from_settings(&settings)?);
    /// let core = CoreFactory::build_app_core(pool, client);
    /// ```
    pub fn build_app_core(pool: SqlitePool, endpoint: Arc<dyn ModelEndpointPort>) -> AppCore {
        AppCore::new(Self::build_repos(pool), endpoint)
    }

    /// Create a prompt repository from a pool.
    pub fn prompt_repository(pool: SqlitePool) -> Arc<SqlitePromptRepository> {
        Arc::new(SqlitePromptRepository::new(pool))
    }

    /// Create a settings repository from a pool.
    pub fn settings_repository(pool: SqlitePool) -> Arc<SqliteSettingsRepository> {
        Arc::new(SqliteSettingsRepository::new(pool))
    }
}

/// Test database helper for integration tests.
///
/// Provides an in-memory `SQLite` database with the production schema.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    /// Create a new in-memory test database with full schema.
    pub async fn new() -> anyhow::Result<Self> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self { pool })
    }

    /// Get a reference to the pool.
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Build `Repos` backed by this database.
    pub fn repos(&self) -> Repos {
        CoreFactory::build_repos(self.pool.clone())
    }

    /// Create a prompt repository backed by this database.
    pub fn prompt_repository(&self) -> Arc<SqlitePromptRepository> {
        CoreFactory::prompt_repository(self.pool.clone())
    }

    /// Create a settings repository backed by this database.
    pub fn settings_repository(&self) -> Arc<SqliteSettingsRepository> {
        CoreFactory::settings_repository(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptlab_core::{NewPrompt, PromptRepository, Settings, SettingsRepository};

    #[tokio::test]
    async fn test_repos_share_one_database() {
        let db = TestDb::new().await.unwrap();
        let repos = db.repos();

        repos
            .prompts
            .insert(&NewPrompt::new("Shared", "You share."))
            .await
            .unwrap();
        assert_eq!(db.prompt_repository().list().await.unwrap().len(), 1);

        let settings = Settings {
            default_model: Some("mistral".to_string()),
            ..Settings::with_defaults()
        };
        repos.settings.save(&settings).await.unwrap();
        assert_eq!(db.settings_repository().load().await.unwrap(), settings);
    }
}
