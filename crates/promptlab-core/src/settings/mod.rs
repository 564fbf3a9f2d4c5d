//! Settings domain types and validation.
//!
//! This module contains the application settings used across the crates.
//! These are pure domain types; file persistence lives in [`file`].

mod file;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::{MAX_MODEL_CHARS, TEMPERATURE_RANGE};

pub use file::{SettingsFileError, SettingsFileFormat, load_from_file, save_to_file};

/// Default generation endpoint.
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Default model for refinement and tests.
pub const DEFAULT_MODEL: &str = "llama2";

/// Default sampling temperature for tests.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default `SQLite` database file.
pub const DEFAULT_DATABASE_PATH: &str = "promptlab.db";

/// Default bind address for the HTTP server.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default port for the HTTP server.
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Default per-request timeout against the endpoint.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts per endpoint call.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default model-list cache lifetime.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

const MAX_RETRIES_LIMIT: u32 = 10;
const MAX_CACHE_TTL_SECS: u64 = 86_400;

/// Application settings structure.
///
/// All fields are optional to support partial files and graceful defaults.
/// Use the `effective_*` accessors to read a value with its fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the generation endpoint.
    pub ollama_endpoint: Option<String>,

    /// Model used when a request names none.
    pub default_model: Option<String>,

    /// Temperature used when a test names none.
    pub default_temperature: Option<f64>,

    /// `SQLite` database file.
    pub database_path: Option<String>,

    /// Bind address for the HTTP server.
    pub server_host: Option<String>,

    /// Port for the HTTP server.
    pub server_port: Option<u16>,

    /// Verbose logging.
    pub debug: Option<bool>,

    /// Per-request timeout against the endpoint, in seconds.
    pub request_timeout_secs: Option<u64>,

    /// Attempts per endpoint call (1-10).
    pub max_retries: Option<u32>,

    /// Model-list cache lifetime, in seconds.
    pub cache_ttl_secs: Option<u64>,
}

impl Settings {
    /// Create settings with every field set to its default.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            ollama_endpoint: Some(DEFAULT_OLLAMA_ENDPOINT.to_string()),
            default_model: Some(DEFAULT_MODEL.to_string()),
            default_temperature: Some(DEFAULT_TEMPERATURE),
            database_path: Some(DEFAULT_DATABASE_PATH.to_string()),
            server_host: Some(DEFAULT_SERVER_HOST.to_string()),
            server_port: Some(DEFAULT_SERVER_PORT),
            debug: Some(false),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retries: Some(DEFAULT_MAX_RETRIES),
            cache_ttl_secs: Some(DEFAULT_CACHE_TTL_SECS),
        }
    }

    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by the given variable lookup.
    ///
    /// Unparseable numeric or boolean values keep the default.
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|key| lookup(*key));
        let mut settings = Self::with_defaults();

        if let Some(endpoint) = first(&["OLLAMA_ENDPOINT"]) {
            settings.ollama_endpoint = Some(endpoint);
        }
        if let Some(model) = first(&["DEFAULT_MODEL"]) {
            settings.default_model = Some(model);
        }
        if let Some(temp) = first(&["DEFAULT_TEMPERATURE"]).and_then(|v| v.trim().parse().ok()) {
            settings.default_temperature = Some(temp);
        }
        if let Some(path) = first(&["DATABASE_PATH"]) {
            settings.database_path = Some(path);
        }
        if let Some(host) = first(&["SERVER_HOST", "FLASK_HOST"]) {
            settings.server_host = Some(host);
        }
        if let Some(port) = first(&["SERVER_PORT", "FLASK_PORT"]).and_then(|v| v.trim().parse().ok())
        {
            settings.server_port = Some(port);
        }
        if let Some(debug) = first(&["DEBUG", "FLASK_DEBUG"]).and_then(|v| parse_bool(&v)) {
            settings.debug = Some(debug);
        }
        settings
    }

    pub fn effective_ollama_endpoint(&self) -> &str {
        self.ollama_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_OLLAMA_ENDPOINT)
    }

    pub fn effective_default_model(&self) -> &str {
        self.default_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn effective_default_temperature(&self) -> f64 {
        self.default_temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn effective_database_path(&self) -> &str {
        self.database_path.as_deref().unwrap_or(DEFAULT_DATABASE_PATH)
    }

    pub fn effective_server_host(&self) -> &str {
        self.server_host.as_deref().unwrap_or(DEFAULT_SERVER_HOST)
    }

    pub const fn effective_server_port(&self) -> u16 {
        match self.server_port {
            Some(port) => port,
            None => DEFAULT_SERVER_PORT,
        }
    }

    pub const fn effective_debug(&self) -> bool {
        matches!(self.debug, Some(true))
    }

    pub const fn effective_request_timeout_secs(&self) -> u64 {
        match self.request_timeout_secs {
            Some(secs) => secs,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub const fn effective_max_retries(&self) -> u32 {
        match self.max_retries {
            Some(retries) => retries,
            None => DEFAULT_MAX_RETRIES,
        }
    }

    pub const fn effective_cache_ttl_secs(&self) -> u64 {
        match self.cache_ttl_secs {
            Some(secs) => secs,
            None => DEFAULT_CACHE_TTL_SECS,
        }
    }

    /// Whether a change from `previous` requires a new endpoint client.
    pub fn endpoint_changed(&self, previous: &Self) -> bool {
        self.effective_ollama_endpoint() != previous.effective_ollama_endpoint()
            || self.effective_default_model() != previous.effective_default_model()
            || self.effective_default_temperature().to_bits()
                != previous.effective_default_temperature().to_bits()
            || self.effective_request_timeout_secs() != previous.effective_request_timeout_secs()
            || self.effective_max_retries() != previous.effective_max_retries()
            || self.effective_cache_ttl_secs() != previous.effective_cache_ttl_secs()
    }

    /// Merge a partial update into this one, only touching fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref endpoint) = other.ollama_endpoint {
            self.ollama_endpoint.clone_from(endpoint);
        }
        if let Some(ref model) = other.default_model {
            self.default_model.clone_from(model);
        }
        if let Some(temperature) = other.default_temperature {
            self.default_temperature = temperature;
        }
        if let Some(ref path) = other.database_path {
            self.database_path.clone_from(path);
        }
        if let Some(ref host) = other.server_host {
            self.server_host.clone_from(host);
        }
        if let Some(port) = other.server_port {
            self.server_port = port;
        }
        if let Some(debug) = other.debug {
            self.debug = debug;
        }
        if let Some(timeout) = other.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(retries) = other.max_retries {
            self.max_retries = retries;
        }
        if let Some(ttl) = other.cache_ttl_secs {
            self.cache_ttl_secs = ttl;
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub ollama_endpoint: Option<Option<String>>,
    pub default_model: Option<Option<String>>,
    pub default_temperature: Option<Option<f64>>,
    pub database_path: Option<Option<String>>,
    pub server_host: Option<Option<String>>,
    pub server_port: Option<Option<u16>>,
    pub debug: Option<Option<bool>>,
    pub request_timeout_secs: Option<Option<u64>>,
    pub max_retries: Option<Option<u32>>,
    pub cache_ttl_secs: Option<Option<u64>>,
}

impl SettingsUpdate {
    /// An update that sets every field present in `settings` and leaves
    /// the rest alone.
    pub fn from_present(settings: &Settings) -> Self {
        Self {
            ollama_endpoint: settings.ollama_endpoint.clone().map(Some),
            default_model: settings.default_model.clone().map(Some),
            default_temperature: settings.default_temperature.map(Some),
            database_path: settings.database_path.clone().map(Some),
            server_host: settings.server_host.clone().map(Some),
            server_port: settings.server_port.map(Some),
            debug: settings.debug.map(Some),
            request_timeout_secs: settings.request_timeout_secs.map(Some),
            max_retries: settings.max_retries.map(Some),
            cache_ttl_secs: settings.cache_ttl_secs.map(Some),
        }
    }
}

/// Per-field settings validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsErrors(BTreeMap<String, String>);

impl SettingsErrors {
    fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Field/message pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for SettingsErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "Invalid settings: {joined}")
    }
}

impl std::error::Error for SettingsErrors {}

/// Check that an endpoint looks like an HTTP(S) URL.
pub fn validate_endpoint(endpoint: &str) -> Result<(), &'static str> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        Err("Endpoint must be a valid URL string")
    } else if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(())
    } else {
        Err("Endpoint must start with http:// or https://")
    }
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsErrors> {
    let mut errors = SettingsErrors::default();

    if let Some(endpoint) = settings.ollama_endpoint.as_deref() {
        if let Err(message) = validate_endpoint(endpoint) {
            errors.insert("ollama_endpoint", message);
        }
    }

    if let Some(model) = settings.default_model.as_deref() {
        let model = model.trim();
        if model.is_empty() {
            errors.insert("default_model", "Default model cannot be empty");
        } else if model.chars().count() > MAX_MODEL_CHARS {
            errors.insert("default_model", "Default model cannot exceed 100 characters");
        }
    }

    if let Some(temperature) = settings.default_temperature {
        if !TEMPERATURE_RANGE.contains(&temperature) {
            errors.insert(
                "default_temperature",
                "Default temperature must be between 0.0 and 2.0",
            );
        }
    }

    if settings
        .database_path
        .as_ref()
        .is_some_and(|p| p.trim().is_empty())
    {
        errors.insert("database_path", "Database path cannot be empty");
    }

    if settings
        .server_host
        .as_ref()
        .is_some_and(|h| h.trim().is_empty())
    {
        errors.insert("server_host", "Server host cannot be empty");
    }

    if let Some(port) = settings.server_port {
        if port < 1024 {
            errors.insert(
                "server_port",
                format!("Port should be >= 1024 (privileged ports require root), got {port}"),
            );
        }
    }

    if settings.request_timeout_secs == Some(0) {
        errors.insert("request_timeout_secs", "Request timeout must be at least 1 second");
    }

    if let Some(retries) = settings.max_retries {
        if !(1..=MAX_RETRIES_LIMIT).contains(&retries) {
            errors.insert(
                "max_retries",
                format!("Max retries must be between 1 and {MAX_RETRIES_LIMIT}, got {retries}"),
            );
        }
    }

    if let Some(ttl) = settings.cache_ttl_secs {
        if ttl > MAX_CACHE_TTL_SECS {
            errors.insert(
                "cache_ttl_secs",
                format!("Cache TTL cannot exceed {MAX_CACHE_TTL_SECS} seconds, got {ttl}"),
            );
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::with_defaults();
        assert_eq!(settings.effective_ollama_endpoint(), "http://localhost:11434");
        assert_eq!(settings.effective_default_model(), "llama2");
        assert_eq!(settings.effective_server_port(), 5000);
        assert_eq!(settings.effective_max_retries(), 3);
        assert_eq!(settings.effective_cache_ttl_secs(), 300);
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_empty_settings_fall_back_to_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.effective_request_timeout_secs(), 30);
        assert!((settings.effective_default_temperature() - 0.7).abs() < f64::EPSILON);
        assert!(!settings.effective_debug());
    }

    #[test]
    fn test_from_env_overrides() {
        let settings = Settings::from_env_with(env(&[
            ("OLLAMA_ENDPOINT", "http://gpu-box:11434"),
            ("DEFAULT_TEMPERATURE", "0.2"),
            ("FLASK_PORT", "8088"),
            ("FLASK_DEBUG", "True"),
        ]));
        assert_eq!(settings.effective_ollama_endpoint(), "http://gpu-box:11434");
        assert_eq!(settings.default_temperature, Some(0.2));
        assert_eq!(settings.server_port, Some(8088));
        assert_eq!(settings.debug, Some(true));
    }

    #[test]
    fn test_from_env_prefers_server_over_flask_names() {
        let settings =
            Settings::from_env_with(env(&[("SERVER_PORT", "7000"), ("FLASK_PORT", "8000")]));
        assert_eq!(settings.server_port, Some(7000));
    }

    #[test]
    fn test_from_env_ignores_unparseable_values() {
        let settings = Settings::from_env_with(env(&[
            ("DEFAULT_TEMPERATURE", "hot"),
            ("SERVER_PORT", "not-a-port"),
        ]));
        assert_eq!(settings.default_temperature, Some(DEFAULT_TEMPERATURE));
        assert_eq!(settings.server_port, Some(DEFAULT_SERVER_PORT));
    }

    #[test]
    fn test_merge_settings() {
        let mut settings = Settings::with_defaults();
        settings.merge(&SettingsUpdate {
            default_model: Some(Some("mistral".to_string())),
            cache_ttl_secs: Some(None),
            ..Default::default()
        });
        assert_eq!(settings.default_model.as_deref(), Some("mistral"));
        assert_eq!(settings.cache_ttl_secs, None);
        assert_eq!(settings.effective_cache_ttl_secs(), DEFAULT_CACHE_TTL_SECS);
        assert_eq!(settings.server_port, Some(DEFAULT_SERVER_PORT));
    }

    #[test]
    fn test_validate_collects_every_field() {
        let settings = Settings {
            ollama_endpoint: Some("localhost:11434".to_string()),
            default_temperature: Some(2.5),
            server_port: Some(80),
            max_retries: Some(0),
            ..Settings::with_defaults()
        };
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors.get("ollama_endpoint"),
            Some("Endpoint must start with http:// or https://")
        );
        assert!(errors.get("default_temperature").is_some());
        assert!(errors.get("server_port").is_some());
        assert!(errors.get("max_retries").is_some());
    }

    #[test]
    fn test_endpoint_changed() {
        let base = Settings::with_defaults();
        let mut other = base.clone();
        other.server_port = Some(6000);
        assert!(!other.endpoint_changed(&base));
        other.max_retries = Some(5);
        assert!(other.endpoint_changed(&base));
    }
}
