//! Settings file persistence (JSON or YAML).

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Settings;

/// On-disk settings format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsFileFormat {
    #[default]
    Json,
    Yaml,
}

impl SettingsFileFormat {
    /// Pick a format from the file extension; anything but `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl FromStr for SettingsFileFormat {
    type Err = SettingsFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(SettingsFileError::InvalidFormat(s.to_string())),
        }
    }
}

/// Errors from reading or writing a settings file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsFileError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Format must be either \"json\" or \"yaml\", got '{0}'")]
    InvalidFormat(String),

    #[error("Invalid configuration file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Failed to access {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("Failed to serialize settings: {0}")]
    Serialize(String),
}

/// Write settings to `path`, creating parent directories as needed.
///
/// Returns the absolute path written.
pub async fn save_to_file(
    settings: &Settings,
    path: &Path,
    format: SettingsFileFormat,
) -> Result<PathBuf, SettingsFileError> {
    let body = match format {
        SettingsFileFormat::Json => serde_json::to_string_pretty(settings)
            .map_err(|e| SettingsFileError::Serialize(e.to_string()))?,
        SettingsFileFormat::Yaml => serde_yaml::to_string(settings)
            .map_err(|e| SettingsFileError::Serialize(e.to_string()))?,
    };

    let io_err = |e: std::io::Error| SettingsFileError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, body).await.map_err(io_err)?;

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_err(io_err)?.join(path)
    };
    tracing::info!(path = %absolute.display(), format = format.as_str(), "Saved settings file");
    Ok(absolute)
}

/// Read settings from `path`; the format follows the extension.
///
/// Keys missing from the file stay unset and fall back to defaults.
pub async fn load_from_file(path: &Path) -> Result<Settings, SettingsFileError> {
    let body = match tokio::fs::read_to_string(path).await {
        Ok(body) => body,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SettingsFileError::NotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(SettingsFileError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
    };

    let parse_err = |message: String| SettingsFileError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let settings = match SettingsFileFormat::from_path(path) {
        SettingsFileFormat::Json => {
            serde_json::from_str(&body).map_err(|e| parse_err(e.to_string()))?
        }
        SettingsFileFormat::Yaml => {
            serde_yaml::from_str(&body).map_err(|e| parse_err(e.to_string()))?
        }
    };
    tracing::debug!(path = %path.display(), "Loaded settings file");
    Ok(settings)
}
