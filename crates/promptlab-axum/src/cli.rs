//! Command-line arguments for the `promptlab` server binary.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use promptlab_core::settings::load_from_file;
use promptlab_core::{Settings, SettingsUpdate};

/// Serve the promptlab HTTP API.
///
/// Settings are layered: built-in defaults, then environment variables
/// (and `.env`), then `--config`, then the flags below.
#[derive(Debug, Parser)]
#[command(name = "promptlab")]
#[command(about = "Author, refine and test system prompts against a local Ollama server")]
#[command(version)]
pub struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Path to the SQLite database file
    #[arg(long = "database")]
    pub database: Option<String>,

    /// JSON or YAML settings file to load at startup
    #[arg(long, env = "PROMPTLAB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Settings fields set by flags.
    pub fn overrides(&self) -> SettingsUpdate {
        SettingsUpdate {
            server_host: self.host.clone().map(Some),
            server_port: self.port.map(Some),
            database_path: self.database.clone().map(Some),
            debug: self.verbose.then_some(Some(true)),
            ..Default::default()
        }
    }

    /// Resolve startup settings from the environment, `--config` and flags.
    pub async fn resolve_settings(&self) -> anyhow::Result<Settings> {
        let mut settings = Settings::from_env();
        if let Some(path) = &self.config {
            let loaded = load_from_file(path)
                .await
                .with_context(|| format!("Failed to load settings from {}", path.display()))?;
            settings.merge(&SettingsUpdate::from_present(&loaded));
        }
        settings.merge(&self.overrides());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::parse_from([
            "promptlab",
            "--verbose",
            "--port",
            "8080",
            "--database",
            "/tmp/lab.db",
        ]);
        assert!(cli.verbose);

        let mut settings = Settings::with_defaults();
        settings.merge(&cli.overrides());
        assert_eq!(settings.effective_server_port(), 8080);
        assert_eq!(settings.effective_database_path(), "/tmp/lab.db");
        assert_eq!(settings.effective_server_host(), "127.0.0.1");
        assert!(settings.effective_debug());
    }

    #[tokio::test]
    async fn test_flags_win_over_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("promptlab.yaml");
        tokio::fs::write(&path, "server_port: 6000\ndefault_model: mistral\n")
            .await
            .unwrap();

        let cli = Cli::parse_from([
            "promptlab",
            "--config",
            path.to_str().unwrap(),
            "--port",
            "7000",
        ]);
        let settings = cli.resolve_settings().await.unwrap();
        assert_eq!(settings.effective_server_port(), 7000);
        assert_eq!(settings.effective_default_model(), "mistral");
    }

    #[tokio::test]
    async fn test_missing_config_file_fails() {
        let cli = Cli::parse_from(["promptlab", "--config", "/nonexistent/promptlab.json"]);
        assert!(cli.resolve_settings().await.is_err());
    }
}
