//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (database, HTTP, file formats).
//!
//! # Structure
//!
//! - `prompt` - Prompt types (`Prompt`, `NewPrompt`, `PromptUpdate`, `PromptDraft`)
//! - `library` - Library import/export types (`ConflictPolicy`, `ImportReport`, etc.)

pub mod library;
mod prompt;

// Re-export prompt types at the domain level for convenience
pub use prompt::{
    DEFAULT_PROMPT_MODEL, DEFAULT_PROMPT_TEMPERATURE, NewPrompt, Prompt, PromptDraft,
    PromptUpdate, normalize_description,
};

// Re-export library types at the domain level for convenience
pub use library::{
    ConflictPolicy, ErroredEntry, ExportMetadata, ImportReport, ImportSummary, ImportedEntry,
    LibraryDocument, LibraryError, LibraryExport, LibraryFormat, OverwrittenEntry, RenamedEntry,
    SkippedEntry,
};
