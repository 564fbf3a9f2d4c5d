//! `SQLite` implementation of the `SettingsRepository` trait.
//!
//! Each set field of `Settings` is one row of the `settings` table, keyed by
//! field name with a JSON-encoded value. Unset fields have no row, so an
//! older database keeps working when fields are added or removed.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{Row, SqlitePool};

use promptlab_core::{RepositoryError, Settings, SettingsRepository};

use super::row_mappers::format_datetime;

pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn storage_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

/// Split settings into `(key, Some(json))` for set fields and `(key, None)`
/// for unset ones.
fn settings_to_rows(settings: &Settings) -> Result<Vec<(String, Option<String>)>, RepositoryError> {
    let Value::Object(fields) = serde_json::to_value(settings)
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?
    else {
        return Err(RepositoryError::Serialization(
            "settings did not serialize to an object".to_string(),
        ));
    };

    Ok(fields
        .into_iter()
        .map(|(key, value)| {
            let encoded = (!value.is_null()).then(|| value.to_string());
            (key, encoded)
        })
        .collect())
}

fn rows_to_settings(rows: Vec<(String, String)>) -> Result<Settings, RepositoryError> {
    let mut fields = Map::new();
    for (key, raw) in rows {
        let value: Value = serde_json::from_str(&raw).map_err(|e| {
            RepositoryError::Serialization(format!("setting '{key}' is not valid JSON: {e}"))
        })?;
        fields.insert(key, value);
    }
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| RepositoryError::Serialization(e.to_string()))
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn load(&self) -> Result<Settings, RepositoryError> {
        let rows = sqlx::query("SELECT key, value FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        if rows.is_empty() {
            return Ok(Settings::with_defaults());
        }
        rows_to_settings(
            rows.iter()
                .map(|row| (row.get("key"), row.get("value")))
                .collect(),
        )
    }

    /// Replace the stored settings in one transaction.
    async fn save(&self, settings: &Settings) -> Result<(), RepositoryError> {
        let rows = settings_to_rows(settings)?;
        let updated_at = format_datetime(&Utc::now());

        let mut tx = self.pool.begin().await.map_err(storage_error)?;
        for (key, value) in &rows {
            match value {
                Some(value) => {
                    sqlx::query(
                        "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?)
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    )
                    .bind(key)
                    .bind(value)
                    .bind(&updated_at)
                    .execute(&mut *tx)
                    .await
                    .map_err(storage_error)?;
                }
                None => {
                    sqlx::query("DELETE FROM settings WHERE key = ?")
                        .bind(key)
                        .execute(&mut *tx)
                        .await
                        .map_err(storage_error)?;
                }
            }
        }
        tx.commit().await.map_err(storage_error)?;

        tracing::debug!(
            stored = rows.iter().filter(|(_, v)| v.is_some()).count(),
            "Settings saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;

    async fn repo() -> SqliteSettingsRepository {
        SqliteSettingsRepository::new(setup_test_database().await.unwrap())
    }

    async fn stored_keys(repo: &SqliteSettingsRepository) -> Vec<String> {
        sqlx::query("SELECT key FROM settings ORDER BY key")
            .fetch_all(&repo.pool)
            .await
            .unwrap()
            .iter()
            .map(|row| row.get("key"))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_table_loads_defaults() {
        let repo = repo().await;
        assert_eq!(repo.load().await.unwrap(), Settings::with_defaults());
    }

    #[tokio::test]
    async fn test_one_row_per_set_field() {
        let repo = repo().await;
        let settings = Settings {
            ollama_endpoint: Some("http://gpu-box:11434".to_string()),
            default_temperature: Some(0.25),
            max_retries: Some(5),
            ..Settings::default()
        };

        repo.save(&settings).await.unwrap();

        assert_eq!(
            stored_keys(&repo).await,
            ["default_temperature", "max_retries", "ollama_endpoint"]
        );
        assert_eq!(repo.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_unset_field_removes_its_row() {
        let repo = repo().await;
        repo.save(&Settings::with_defaults()).await.unwrap();
        assert_eq!(stored_keys(&repo).await.len(), 10);

        let settings = Settings {
            debug: None,
            default_model: Some("mistral".to_string()),
            ..Settings::with_defaults()
        };
        repo.save(&settings).await.unwrap();

        let keys = stored_keys(&repo).await;
        assert_eq!(keys.len(), 9);
        assert!(!keys.contains(&"debug".to_string()));
        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded.debug, None);
        assert_eq!(loaded.effective_default_model(), "mistral");
    }

    #[tokio::test]
    async fn test_unknown_keys_are_ignored() {
        let repo = repo().await;
        sqlx::query("INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?)")
            .bind("legacy_flag")
            .bind("true")
            .bind("2024-01-01 00:00:00")
            .execute(&repo.pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?)")
            .bind("server_port")
            .bind("8080")
            .bind("2024-01-01 00:00:00")
            .execute(&repo.pool)
            .await
            .unwrap();

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded.server_port, Some(8080));
        assert_eq!(loaded.default_model, None);
    }

    #[tokio::test]
    async fn test_corrupt_value_is_serialization_error() {
        let repo = repo().await;
        sqlx::query("INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?)")
            .bind("server_port")
            .bind("not json")
            .bind("2024-01-01 00:00:00")
            .execute(&repo.pool)
            .await
            .unwrap();

        let err = repo.load().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Serialization(ref m) if m.contains("server_port")));
    }
}
