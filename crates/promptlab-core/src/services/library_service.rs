//! Library service - prompt library import and export.

use crate::domain::{ConflictPolicy, ImportReport, LibraryExport, LibraryFormat};
use crate::library::{LibraryMerger, build_export, parse_library};
use crate::ports::{CoreError, PromptRepository};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Service for library import/export.
pub struct LibraryService {
    repo: Arc<dyn PromptRepository>,
    merger: LibraryMerger,
}

impl LibraryService {
    pub fn new(repo: Arc<dyn PromptRepository>) -> Self {
        Self {
            merger: LibraryMerger::new(Arc::clone(&repo)),
            repo,
        }
    }

    /// Export every stored prompt, ordered by name.
    pub async fn export(&self, format: LibraryFormat) -> Result<LibraryExport, CoreError> {
        let prompts = self.repo.list().await?;
        let export = build_export(prompts, format)?;
        info!(
            format = format.as_str(),
            total = export.metadata.total_prompts,
            "Exported prompt library"
        );
        Ok(export)
    }

    /// Merge already-decoded records.
    pub async fn import(
        &self,
        records: &[Value],
        policy: ConflictPolicy,
    ) -> Result<ImportReport, CoreError> {
        self.merger.merge(records, policy).await
    }

    /// Decode library text and merge its records.
    ///
    /// With `format` unset the format is detected from the text.
    pub async fn import_text(
        &self,
        text: &str,
        format: Option<LibraryFormat>,
        policy: ConflictPolicy,
    ) -> Result<ImportReport, CoreError> {
        let records = parse_library(text, format)?;
        self.import(&records, policy).await
    }
}
