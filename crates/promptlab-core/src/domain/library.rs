//! Library import/export domain types.
//!
//! A library is a portable document holding a set of prompts plus export
//! metadata. Importing one produces an [`ImportReport`] describing what
//! happened to every incoming record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Prompt;

/// Version tag written into every export.
pub const LIBRARY_FORMAT_VERSION: &str = "1.0";

/// Producer tag written into every export.
pub const LIBRARY_EXPORTED_BY: &str = "PromptLab";

/// Reason recorded for records skipped on a name collision.
pub const SKIP_REASON_NAME_EXISTS: &str = "Name already exists";

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while decoding or encoding a library document.
///
/// Record-level problems never surface here; they land in the report's
/// `errors` bucket instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    #[error("Invalid format '{0}'. Must be \"json\" or \"yaml\"")]
    InvalidFormat(String),

    #[error("Invalid conflict_resolution '{0}'. Must be \"skip\", \"overwrite\", or \"rename\"")]
    InvalidConflictPolicy(String),

    #[error("Failed to parse {format} data: {message}")]
    Parse { format: LibraryFormat, message: String },

    #[error("Import data must be an object")]
    InvalidStructure,

    #[error("Import data must contain a \"prompts\" field")]
    MissingPromptsField,

    #[error("Prompts field must be an array")]
    InvalidPromptsStructure,

    #[error("Failed to render {format} data: {message}")]
    Render { format: LibraryFormat, message: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// What to do when an incoming record's name collides with an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Leave the existing record untouched.
    #[default]
    Skip,
    /// Replace the existing record's mutable fields.
    Overwrite,
    /// Insert under a generated `"name (N)"`.
    Rename,
}

impl ConflictPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
            Self::Rename => "rename",
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "overwrite" => Ok(Self::Overwrite),
            "rename" => Ok(Self::Rename),
            _ => Err(LibraryError::InvalidConflictPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interchange format for library documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryFormat {
    #[default]
    Json,
    Yaml,
}

impl LibraryFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// MIME type of rendered documents.
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/x-yaml",
        }
    }

    /// Guess the format from document text.
    ///
    /// Text whose first non-blank character opens a JSON object or array is
    /// JSON, anything else is YAML.
    pub fn detect(text: &str) -> Self {
        let trimmed = text.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            Self::Json
        } else {
            Self::Yaml
        }
    }
}

impl FromStr for LibraryFormat {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(LibraryError::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LibraryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export
// ─────────────────────────────────────────────────────────────────────────────

/// Metadata block at the top of every export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub export_timestamp: DateTime<Utc>,
    pub total_prompts: usize,
    pub format_version: String,
    pub exported_by: String,
}

impl ExportMetadata {
    pub fn new(total_prompts: usize) -> Self {
        Self {
            export_timestamp: Utc::now(),
            total_prompts,
            format_version: LIBRARY_FORMAT_VERSION.to_string(),
            exported_by: LIBRARY_EXPORTED_BY.to_string(),
        }
    }
}

/// The serialized library document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryDocument {
    pub metadata: ExportMetadata,
    pub prompts: Vec<Prompt>,
}

/// Result of an export: rendered text plus what describes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryExport {
    pub format: LibraryFormat,
    pub content_type: &'static str,
    pub data: String,
    pub metadata: ExportMetadata,
}

// ─────────────────────────────────────────────────────────────────────────────
// Import report
// ─────────────────────────────────────────────────────────────────────────────

/// A record inserted by the import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedEntry {
    pub name: String,
    pub id: i64,
}

/// A record left out because its name already existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

/// An existing record whose fields were replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverwrittenEntry {
    pub name: String,
    pub id: i64,
}

/// A record inserted under a generated name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedEntry {
    pub original_name: String,
    pub new_name: String,
}

/// A record that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErroredEntry {
    pub name: String,
    pub errors: Vec<String>,
}

/// Per-record outcome of one import call.
///
/// Every renamed record also appears in `imported` under its new name, so
/// the buckets are disjoint except for that pairing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: Vec<ImportedEntry>,
    pub skipped: Vec<SkippedEntry>,
    pub overwritten: Vec<OverwrittenEntry>,
    pub renamed: Vec<RenamedEntry>,
    pub errors: Vec<ErroredEntry>,
}

impl ImportReport {
    /// Number of incoming records accounted for.
    ///
    /// Renamed records are counted once, through `imported`.
    pub fn total_processed(&self) -> usize {
        self.imported.len() + self.skipped.len() + self.overwritten.len() + self.errors.len()
    }

    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            total_processed: self.total_processed(),
            imported: self.imported.len(),
            skipped: self.skipped.len(),
            overwritten: self.overwritten.len(),
            renamed: self.renamed.len(),
            errors: self.errors.len(),
        }
    }
}

/// Bucket counts of an [`ImportReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_processed: usize,
    pub imported: usize,
    pub skipped: usize,
    pub overwritten: usize,
    pub renamed: usize,
    pub errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_policy_parse() {
        assert_eq!("SKIP".parse::<ConflictPolicy>(), Ok(ConflictPolicy::Skip));
        assert_eq!(" rename ".parse::<ConflictPolicy>(), Ok(ConflictPolicy::Rename));
        assert_eq!(
            "merge".parse::<ConflictPolicy>(),
            Err(LibraryError::InvalidConflictPolicy("merge".to_string()))
        );
    }

    #[test]
    fn test_format_parse_and_detect() {
        assert_eq!("Yml".parse::<LibraryFormat>(), Ok(LibraryFormat::Yaml));
        assert!("xml".parse::<LibraryFormat>().is_err());
        assert_eq!(LibraryFormat::detect("  {\"prompts\": []}"), LibraryFormat::Json);
        assert_eq!(LibraryFormat::detect("\n[1]"), LibraryFormat::Json);
        assert_eq!(LibraryFormat::detect("prompts: []"), LibraryFormat::Yaml);
        assert_eq!(LibraryFormat::Yaml.content_type(), "application/x-yaml");
    }

    #[test]
    fn test_summary_counts_renamed_once() {
        let report = ImportReport {
            imported: vec![
                ImportedEntry { name: "A".into(), id: 1 },
                ImportedEntry { name: "A (1)".into(), id: 2 },
            ],
            skipped: vec![SkippedEntry {
                name: "B".into(),
                reason: SKIP_REASON_NAME_EXISTS.into(),
            }],
            overwritten: vec![],
            renamed: vec![RenamedEntry {
                original_name: "A".into(),
                new_name: "A (1)".into(),
            }],
            errors: vec![ErroredEntry {
                name: "Unknown".into(),
                errors: vec!["Name is required".into()],
            }],
        };
        let summary = report.summary();
        assert_eq!(summary.total_processed, 4);
        assert_eq!(summary.renamed, 1);
        assert_eq!(summary.imported, 2);
    }
}
