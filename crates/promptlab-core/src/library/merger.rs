//! Reconciles incoming library records with the stored collection.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::library::SKIP_REASON_NAME_EXISTS;
use crate::domain::{
    ConflictPolicy, ErroredEntry, ImportReport, ImportedEntry, OverwrittenEntry, Prompt,
    PromptDraft, RenamedEntry, SkippedEntry,
};
use crate::ports::{CoreError, PromptRepository};
use crate::validation::{MAX_NAME_CHARS, ValidationMode, check_name, validate_prompt};

/// Smallest `"{base} (N)"`, N ≥ 1, that `is_taken` rejects.
///
/// `is_taken` receives the lowercased candidate. The base is cut short when
/// needed so the candidate stays within [`MAX_NAME_CHARS`].
pub fn unique_name(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    (1_u64..)
        .map(|n| {
            let suffix = format!(" ({n})");
            let room = MAX_NAME_CHARS.saturating_sub(suffix.chars().count());
            let stem: String = base.chars().take(room).collect();
            format!("{}{suffix}", stem.trim_end())
        })
        .find(|candidate| !is_taken(&candidate.to_lowercase()))
        .unwrap_or_else(|| base.to_string())
}

/// Applies a conflict policy to an incoming batch of prompt records.
///
/// Conflicts are detected case-insensitively against a snapshot of the
/// stored names taken at the start of the call. Records inserted by the
/// batch join the snapshot, so later records collide with earlier ones.
pub struct LibraryMerger {
    prompts: Arc<dyn PromptRepository>,
}

/// Outcome of one record, before it lands in a report bucket.
enum Outcome {
    Imported(ImportedEntry),
    Skipped(SkippedEntry),
    Overwritten(OverwrittenEntry),
    Renamed(RenamedEntry, ImportedEntry),
}

impl LibraryMerger {
    pub fn new(prompts: Arc<dyn PromptRepository>) -> Self {
        Self { prompts }
    }

    /// Process `records` strictly in order.
    ///
    /// Only a failure to read the initial snapshot aborts the call; every
    /// per-record problem is reported in the `errors` bucket.
    pub async fn merge(
        &self,
        records: &[Value],
        policy: ConflictPolicy,
    ) -> Result<ImportReport, CoreError> {
        let mut snapshot: HashMap<String, Prompt> = self
            .prompts
            .list()
            .await?
            .into_iter()
            .map(|p| (p.name.to_lowercase(), p))
            .collect();

        let mut report = ImportReport::default();
        for record in records {
            let label = record_label(record);
            match self.merge_one(record, policy, &mut snapshot).await {
                Ok(Outcome::Imported(entry)) => report.imported.push(entry),
                Ok(Outcome::Skipped(entry)) => report.skipped.push(entry),
                Ok(Outcome::Overwritten(entry)) => report.overwritten.push(entry),
                Ok(Outcome::Renamed(renamed, imported)) => {
                    report.renamed.push(renamed);
                    report.imported.push(imported);
                }
                Err(errors) => {
                    debug!(name = %label, ?errors, "Import record rejected");
                    report.errors.push(ErroredEntry {
                        name: label,
                        errors,
                    });
                }
            }
        }

        let summary = report.summary();
        info!(
            policy = %policy,
            total = summary.total_processed,
            imported = summary.imported,
            skipped = summary.skipped,
            overwritten = summary.overwritten,
            renamed = summary.renamed,
            errors = summary.errors,
            "Library import finished"
        );
        Ok(report)
    }

    async fn merge_one(
        &self,
        record: &Value,
        policy: ConflictPolicy,
        snapshot: &mut HashMap<String, Prompt>,
    ) -> Result<Outcome, Vec<String>> {
        let draft = PromptDraft::from_json(record).map_err(|e| e.messages())?;
        validate_prompt(&draft, ValidationMode::Create).map_err(|e| e.messages())?;

        let name = draft.display_name().trim().to_string();
        let key = name.to_lowercase();

        let Some(existing) = snapshot.get(&key) else {
            let created = self.insert(draft, snapshot).await?;
            return Ok(Outcome::Imported(created));
        };

        match policy {
            ConflictPolicy::Skip => Ok(Outcome::Skipped(SkippedEntry {
                name,
                reason: SKIP_REASON_NAME_EXISTS.to_string(),
            })),
            ConflictPolicy::Overwrite => {
                let mut updated = existing.clone();
                updated.apply(draft.into_overwrite());
                self.prompts
                    .update(&updated)
                    .await
                    .map_err(|e| vec![e.to_string()])?;
                let id = updated.id;
                snapshot.insert(key, updated);
                Ok(Outcome::Overwritten(OverwrittenEntry { name, id }))
            }
            ConflictPolicy::Rename => {
                let new_name = unique_name(&name, |candidate| snapshot.contains_key(candidate));
                check_name(&new_name).map_err(|message| vec![message.to_string()])?;
                let renamed = PromptDraft {
                    name: Some(new_name.clone()),
                    ..draft
                };
                let created = self.insert(renamed, snapshot).await?;
                Ok(Outcome::Renamed(
                    RenamedEntry {
                        original_name: name,
                        new_name,
                    },
                    created,
                ))
            }
        }
    }

    async fn insert(
        &self,
        draft: PromptDraft,
        snapshot: &mut HashMap<String, Prompt>,
    ) -> Result<ImportedEntry, Vec<String>> {
        let created = self
            .prompts
            .insert(&draft.into_new_prompt())
            .await
            .map_err(|e| vec![e.to_string()])?;
        let entry = ImportedEntry {
            name: created.name.clone(),
            id: created.id,
        };
        snapshot.insert(created.name.to_lowercase(), created);
        Ok(entry)
    }
}

/// Name used for a record in the report, valid or not.
fn record_label(record: &Value) -> String {
    record
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewPrompt;
    use crate::ports::RepositoryError;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockPromptRepo {
        prompts: Mutex<Vec<Prompt>>,
        fail_inserts_named: Option<String>,
    }

    impl MockPromptRepo {
        fn with(names: &[&str]) -> Self {
            let repo = Self::default();
            {
                let mut prompts = repo.prompts.lock().unwrap();
                for (i, name) in names.iter().enumerate() {
                    prompts.push(Prompt {
                        id: i64::try_from(i).unwrap() + 1,
                        name: (*name).to_string(),
                        description: Some("stored".to_string()),
                        system_prompt: "stored prompt".to_string(),
                        model: "mistral".to_string(),
                        temperature: 1.5,
                        created_at: Utc::now(),
                        updated_at: Utc::now(),
                    });
                }
            }
            repo
        }

        fn names(&self) -> Vec<String> {
            let mut names: Vec<_> = self
                .prompts
                .lock()
                .unwrap()
                .iter()
                .map(|p| p.name.clone())
                .collect();
            names.sort();
            names
        }
    }

    #[async_trait]
    impl PromptRepository for MockPromptRepo {
        async fn list(&self) -> Result<Vec<Prompt>, RepositoryError> {
            let mut prompts = self.prompts.lock().unwrap().clone();
            prompts.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(prompts)
        }

        async fn get_by_id(&self, id: i64) -> Result<Prompt, RepositoryError> {
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| RepositoryError::NotFound(format!("prompt id={id}")))
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Prompt>, RepositoryError> {
            Ok(self
                .prompts
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.name == name)
                .cloned())
        }

        async fn insert(&self, prompt: &NewPrompt) -> Result<Prompt, RepositoryError> {
            if self.fail_inserts_named.as_deref() == Some(prompt.name.as_str()) {
                return Err(RepositoryError::Storage("disk full".to_string()));
            }
            let mut prompts = self.prompts.lock().unwrap();
            if prompts.iter().any(|p| p.name == prompt.name) {
                return Err(RepositoryError::AlreadyExists(prompt.name.clone()));
            }
            let id = prompts.iter().map(|p| p.id).max().unwrap_or(0) + 1;
            let created = Prompt {
                id,
                name: prompt.name.clone(),
                description: prompt.description.clone(),
                system_prompt: prompt.system_prompt.clone(),
                model: prompt.model.clone(),
                temperature: prompt.temperature,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            prompts.push(created.clone());
            Ok(created)
        }

        async fn update(&self, prompt: &Prompt) -> Result<(), RepositoryError> {
            let mut prompts = self.prompts.lock().unwrap();
            let slot = prompts
                .iter_mut()
                .find(|p| p.id == prompt.id)
                .ok_or_else(|| RepositoryError::NotFound(format!("prompt id={}", prompt.id)))?;
            *slot = prompt.clone();
            Ok(())
        }

        async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
            let mut prompts = self.prompts.lock().unwrap();
            let before = prompts.len();
            prompts.retain(|p| p.id != id);
            if prompts.len() == before {
                return Err(RepositoryError::NotFound(format!("prompt id={id}")));
            }
            Ok(())
        }
    }

    fn record(name: &str, system_prompt: &str) -> Value {
        json!({"name": name, "system_prompt": system_prompt})
    }

    #[test]
    fn test_unique_name_picks_smallest_free_suffix() {
        let taken = ["x", "x (1)", "x (3)"];
        assert_eq!(unique_name("X", |c| taken.contains(&c)), "X (2)");
        assert_eq!(unique_name("Y", |_| false), "Y (1)");
    }

    #[test]
    fn test_unique_name_stays_within_name_limit() {
        let base = "a".repeat(MAX_NAME_CHARS);
        let first = unique_name(&base, |_| false);
        assert_eq!(first.chars().count(), MAX_NAME_CHARS);
        assert_eq!(first, format!("{} (1)", "a".repeat(MAX_NAME_CHARS - 4)));

        let taken: Vec<String> = (1..=9)
            .map(|n| format!("{} ({n})", "a".repeat(MAX_NAME_CHARS - 4)))
            .collect();
        let tenth = unique_name(&base, |c| taken.iter().any(|t| t == c));
        assert_eq!(tenth, format!("{} (10)", "a".repeat(MAX_NAME_CHARS - 5)));

        let spaced = format!("{}{}", "b".repeat(MAX_NAME_CHARS - 5), "     ");
        assert_eq!(
            unique_name(&spaced, |_| false),
            format!("{} (1)", "b".repeat(MAX_NAME_CHARS - 5))
        );
    }

    #[tokio::test]
    async fn test_case_insensitive_collision_within_batch() {
        let repo = Arc::new(MockPromptRepo::default());
        let merger = LibraryMerger::new(repo.clone());

        let report = merger
            .merge(&[record("A", "p"), record("a", "q")], ConflictPolicy::Rename)
            .await
            .unwrap();

        assert_eq!(report.imported.len(), 2);
        assert_eq!(report.imported[0].name, "A");
        assert_eq!(report.imported[1].name, "a (1)");
        assert_eq!(
            report.renamed,
            vec![RenamedEntry {
                original_name: "a".to_string(),
                new_name: "a (1)".to_string(),
            }]
        );
        assert_eq!(report.summary().total_processed, 2);
        assert_eq!(repo.names(), vec!["A", "a (1)"]);
    }

    #[tokio::test]
    async fn test_rename_is_deterministic_in_input_order() {
        let repo = Arc::new(MockPromptRepo::with(&["X"]));
        let merger = LibraryMerger::new(repo.clone());

        let report = merger
            .merge(&[record("X", "first"), record("X", "second")], ConflictPolicy::Rename)
            .await
            .unwrap();

        let new_names: Vec<_> = report.renamed.iter().map(|r| r.new_name.as_str()).collect();
        assert_eq!(new_names, vec!["X (1)", "X (2)"]);
        assert_eq!(repo.names(), vec!["X", "X (1)", "X (2)"]);
    }

    #[tokio::test]
    async fn test_skip_leaves_existing_untouched() {
        let repo = Arc::new(MockPromptRepo::with(&["Reviewer"]));
        let merger = LibraryMerger::new(repo.clone());

        let report = merger
            .merge(&[record("reviewer", "new text")], ConflictPolicy::Skip)
            .await
            .unwrap();

        assert!(report.imported.is_empty());
        assert_eq!(report.skipped[0].name, "reviewer");
        assert_eq!(report.skipped[0].reason, "Name already exists");
        let stored = repo.find_by_name("Reviewer").await.unwrap().unwrap();
        assert_eq!(stored.system_prompt, "stored prompt");
    }

    #[tokio::test]
    async fn test_overwrite_applies_defaults_for_missing_fields() {
        let repo = Arc::new(MockPromptRepo::with(&["Reviewer"]));
        let merger = LibraryMerger::new(repo.clone());

        let report = merger
            .merge(&[record("REVIEWER", "fresh text")], ConflictPolicy::Overwrite)
            .await
            .unwrap();

        assert_eq!(
            report.overwritten,
            vec![OverwrittenEntry {
                name: "REVIEWER".to_string(),
                id: 1,
            }]
        );
        let stored = repo.get_by_id(1).await.unwrap();
        assert_eq!(stored.name, "Reviewer");
        assert_eq!(stored.system_prompt, "fresh text");
        assert_eq!(stored.model, "llama2");
        assert!((stored.temperature - 0.7).abs() < f64::EPSILON);
        assert!(stored.description.is_none());
    }

    #[tokio::test]
    async fn test_invalid_records_do_not_abort_batch() {
        let repo = Arc::new(MockPromptRepo::default());
        let merger = LibraryMerger::new(repo.clone());

        let records = vec![
            json!({"system_prompt": "no name"}),
            json!({"name": "Hot", "system_prompt": "p", "temperature": 3.0}),
            json!("not an object"),
            record("Good", "p"),
        ];
        let report = merger.merge(&records, ConflictPolicy::Skip).await.unwrap();

        assert_eq!(report.errors.len(), 3);
        assert_eq!(report.errors[0].name, "Unknown");
        assert_eq!(report.errors[0].errors, vec!["Name is required".to_string()]);
        assert_eq!(report.errors[1].name, "Hot");
        assert_eq!(
            report.errors[1].errors,
            vec!["Temperature must be between 0.0 and 2.0".to_string()]
        );
        assert_eq!(report.imported.len(), 1);
        assert_eq!(report.summary().total_processed, records.len());
    }

    #[tokio::test]
    async fn test_storage_failure_is_per_record() {
        let repo = Arc::new(MockPromptRepo {
            fail_inserts_named: Some("Broken".to_string()),
            ..Default::default()
        });
        let merger = LibraryMerger::new(repo.clone());

        let report = merger
            .merge(&[record("Broken", "p"), record("Fine", "p")], ConflictPolicy::Skip)
            .await
            .unwrap();

        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].errors[0].contains("disk full"));
        assert_eq!(report.imported[0].name, "Fine");
    }

    #[tokio::test]
    async fn test_rename_of_longest_name_fits_limit() {
        let long = "a".repeat(MAX_NAME_CHARS);
        let repo = Arc::new(MockPromptRepo::with(&[long.as_str()]));
        let merger = LibraryMerger::new(repo.clone());

        let report = merger
            .merge(&[record(&long, "p")], ConflictPolicy::Rename)
            .await
            .unwrap();

        assert!(report.errors.is_empty());
        let new_name = &report.renamed[0].new_name;
        assert_eq!(new_name.chars().count(), MAX_NAME_CHARS);
        assert!(new_name.ends_with(" (1)"));
        assert_eq!(&report.imported[0].name, new_name);
    }

    #[tokio::test]
    async fn test_names_are_trimmed_before_matching() {
        let repo = Arc::new(MockPromptRepo::with(&["Tutor"]));
        let merger = LibraryMerger::new(repo.clone());

        let report = merger
            .merge(&[record("  tutor  ", "p")], ConflictPolicy::Rename)
            .await
            .unwrap();

        assert_eq!(report.renamed[0].original_name, "tutor");
        assert_eq!(report.renamed[0].new_name, "tutor (1)");
    }
}
