//! `AppCore` - the primary application facade.
//!
//! This is the composition root for core services. Adapters (HTTP, CLI)
//! receive an `AppCore` instance and use it to access all functionality.

use crate::ports::{ModelEndpointPort, Repos};
use std::sync::Arc;

use super::{LibraryService, PlaygroundService, PromptService, SettingsService};

/// The core application facade.
///
/// `AppCore` provides access to all core services. It's constructed at the
/// adapter's composition root (bootstrap.rs) with concrete repositories and
/// a model endpoint client.
///
/// # Example
///
/// ```ignore
/// let repos = Repos::new(prompt_repo, settings_repo);
/// let endpoint = Arc::new(OllamaClient::from_settings(&settings)?);
/// let core = AppCore::new(repos, endpoint);
///
/// // Access services
/// let prompts = core.prompts().list(None).await?;
/// ```
pub struct AppCore {
    prompts: PromptService,
    library: LibraryService,
    playground: PlaygroundService,
    settings: SettingsService,
}

impl AppCore {
    /// Create a new `AppCore` with the given repositories and endpoint client.
    pub fn new(repos: Repos, endpoint: Arc<dyn ModelEndpointPort>) -> Self {
        Self {
            prompts: PromptService::new(Arc::clone(&repos.prompts)),
            library: LibraryService::new(repos.prompts),
            playground: PlaygroundService::new(endpoint),
            settings: SettingsService::new(repos.settings),
        }
    }

    /// Access the prompt service.
    pub const fn prompts(&self) -> &PromptService {
        &self.prompts
    }

    /// Access the library import/export service.
    pub const fn library(&self) -> &LibraryService {
        &self.library
    }

    /// Access the playground (refine/test/models) service.
    pub const fn playground(&self) -> &PlaygroundService {
        &self.playground
    }

    /// Access the settings service.
    pub const fn settings(&self) -> &SettingsService {
        &self.settings
    }
}
