#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod library;
pub mod ports;
pub mod services;
pub mod settings;
pub mod validation;

// Re-export commonly used types for convenience
pub use domain::{
    ConflictPolicy, ErroredEntry, ExportMetadata, ImportReport, ImportSummary, ImportedEntry,
    LibraryDocument, LibraryError, LibraryExport, LibraryFormat, NewPrompt, OverwrittenEntry,
    Prompt, PromptDraft, PromptUpdate, RenamedEntry, SkippedEntry,
};
pub use library::{LibraryMerger, build_export, parse_library, unique_name};
pub use ports::{
    CacheInfo, ConnectionState, ConnectionStatus, CoreError, EndpointError, EndpointResult,
    ModelEndpointPort, ModelInfo, PromptRepository, PromptTestRequest, PromptTestResult, Repos,
    RepositoryError, SettingsRepository,
};
pub use services::{
    AppCore, LibraryService, PlaygroundService, PromptService, RefinedPrompt, SettingsService,
};
pub use settings::{
    Settings, SettingsErrors, SettingsFileError, SettingsFileFormat, SettingsUpdate,
    validate_endpoint, validate_settings,
};
pub use validation::{PromptField, ValidationErrors, ValidationMode, validate_prompt};

// Silence unused dev-dependency warnings for crates only the integration tests use
#[cfg(test)]
use promptlab_db as _;
