//! Settings service - orchestrates settings operations.

use crate::ports::{CoreError, SettingsRepository};
use crate::settings::{
    Settings, SettingsFileFormat, SettingsUpdate, load_from_file, save_to_file, validate_settings,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Service for settings operations.
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    /// Create a new settings service.
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Get current settings.
    pub async fn get(&self) -> Result<Settings, CoreError> {
        self.repo.load().await.map_err(CoreError::from)
    }

    /// Update settings with partial changes.
    pub async fn update(&self, update: SettingsUpdate) -> Result<Settings, CoreError> {
        let mut current = self.repo.load().await.map_err(CoreError::from)?;
        current.merge(&update);
        validate_settings(&current)?;
        self.repo.save(&current).await.map_err(CoreError::from)?;
        Ok(current)
    }

    /// Save complete settings (validates first).
    pub async fn save(&self, settings: &Settings) -> Result<(), CoreError> {
        validate_settings(settings)?;
        self.repo.save(settings).await.map_err(CoreError::from)
    }

    /// Write the current settings to a file. Returns the absolute path.
    pub async fn export_to_file(
        &self,
        path: &Path,
        format: SettingsFileFormat,
    ) -> Result<PathBuf, CoreError> {
        let settings = self.get().await?;
        Ok(save_to_file(&settings, path, format).await?)
    }

    /// Replace the current settings with a file's contents.
    ///
    /// Keys missing from the file keep their current values. Nothing is
    /// persisted unless the merged result validates.
    pub async fn import_from_file(&self, path: &Path) -> Result<Settings, CoreError> {
        let loaded = load_from_file(path).await?;
        let mut current = self.get().await?;
        current.merge(&SettingsUpdate::from_present(&loaded));
        self.save(&current).await?;
        Ok(current)
    }
}
