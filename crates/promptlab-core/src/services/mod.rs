//! Core services - the application's business logic layer.
//!
//! This module contains high-level service abstractions that orchestrate
//! between ports (trait interfaces) and domain logic. Services here are
//! pure orchestrators - they don't know about concrete implementations.

mod app_core;
mod library_service;
mod playground_service;
mod prompt_service;
mod settings_service;

pub use app_core::AppCore;
pub use library_service::LibraryService;
pub use playground_service::{
    MAX_OBJECTIVE_CHARS, MAX_USER_INPUT_CHARS, PlaygroundService, RefinedPrompt, SharedEndpoint,
};
pub use prompt_service::PromptService;
pub use settings_service::SettingsService;
