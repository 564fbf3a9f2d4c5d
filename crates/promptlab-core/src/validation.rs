//! Field-level validation for prompt definitions.
//!
//! The same rules back the create and update paths and the library
//! importer. Errors are collected per field rather than failing fast so
//! callers can show every problem at once.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::PromptDraft;

/// Maximum prompt name length, in characters.
pub const MAX_NAME_CHARS: usize = 255;

/// Maximum system prompt length, in characters.
pub const MAX_SYSTEM_PROMPT_CHARS: usize = 50_000;

/// Maximum model name length, in characters.
pub const MAX_MODEL_CHARS: usize = 100;

/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1_000;

/// Inclusive temperature bounds.
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;

/// Characters that may not appear in a prompt name.
pub const FORBIDDEN_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Identifies a validated prompt field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptField {
    Name,
    Description,
    SystemPrompt,
    Model,
    Temperature,
}

impl PromptField {
    /// Wire name of the field, as used in JSON bodies and library files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::SystemPrompt => "system_prompt",
            Self::Model => "model",
            Self::Temperature => "temperature",
        }
    }
}

impl fmt::Display for PromptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field validation messages. Empty means valid.
///
/// Only the first problem found for a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<PromptField, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message unless the field already has one.
    pub fn insert(&mut self, field: PromptField, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: PromptField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PromptField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// Flatten into plain messages in field order.
    pub fn messages(&self) -> Vec<String> {
        self.0.values().cloned().collect()
    }

    /// Fold another set of errors in, keeping existing messages.
    pub fn extend(&mut self, other: Self) {
        for (field, message) in other.0 {
            self.insert(field, message);
        }
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}

impl std::error::Error for ValidationErrors {}

/// Which fields are mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// `name` and `system_prompt` must be present.
    Create,
    /// Nothing is mandatory; present fields are still checked.
    Update,
}

/// Validate a draft against the prompt field rules.
pub fn validate_prompt(draft: &PromptDraft, mode: ValidationMode) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let required = mode == ValidationMode::Create;

    match draft.name.as_deref() {
        None if required => errors.insert(PromptField::Name, "Name is required"),
        None => {}
        Some(name) => {
            if let Err(message) = check_name(name) {
                errors.insert(PromptField::Name, message);
            }
        }
    }

    match draft.system_prompt.as_deref() {
        None if required => errors.insert(PromptField::SystemPrompt, "System prompt is required"),
        None => {}
        Some(text) => {
            let text = text.trim();
            if text.is_empty() {
                errors.insert(PromptField::SystemPrompt, "System prompt cannot be empty");
            } else if text.chars().count() > MAX_SYSTEM_PROMPT_CHARS {
                errors.insert(
                    PromptField::SystemPrompt,
                    "System prompt cannot exceed 50,000 characters",
                );
            }
        }
    }

    if let Some(model) = draft.model.as_deref() {
        if let Err(message) = check_model(model) {
            errors.insert(PromptField::Model, message);
        }
    }

    if let Some(temperature) = draft.temperature {
        if let Err(message) = check_temperature(temperature) {
            errors.insert(PromptField::Temperature, message);
        }
    }

    if let Some(description) = draft.description.as_deref() {
        if description.trim().chars().count() > MAX_DESCRIPTION_CHARS {
            errors.insert(
                PromptField::Description,
                "Description cannot exceed 1,000 characters",
            );
        }
    }

    errors.into_result()
}

/// Check a prompt name.
pub fn check_name(name: &str) -> Result<(), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name cannot be empty");
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err("Name cannot exceed 255 characters");
    }
    if name.contains(FORBIDDEN_NAME_CHARS) {
        return Err(r#"Name cannot contain these characters: /, \, :, *, ?, ", <, >, |"#);
    }
    Ok(())
}

/// Check a model name.
pub fn check_model(model: &str) -> Result<(), &'static str> {
    let model = model.trim();
    if model.is_empty() {
        Err("Model name cannot be empty")
    } else if model.chars().count() > MAX_MODEL_CHARS {
        Err("Model name cannot exceed 100 characters")
    } else {
        Ok(())
    }
}

/// Check a sampling temperature.
pub fn check_temperature(temperature: f64) -> Result<(), &'static str> {
    if !temperature.is_finite() {
        Err("Temperature must be a valid number")
    } else if TEMPERATURE_RANGE.contains(&temperature) {
        Ok(())
    } else {
        Err("Temperature must be between 0.0 and 2.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, system_prompt: &str) -> PromptDraft {
        PromptDraft {
            name: Some(name.to_string()),
            system_prompt: Some(system_prompt.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_create_is_valid() {
        assert!(validate_prompt(&draft("Helper", "Be helpful."), ValidationMode::Create).is_ok());
    }

    #[test]
    fn test_create_requires_name_and_system_prompt() {
        let errors = validate_prompt(&PromptDraft::default(), ValidationMode::Create).unwrap_err();
        assert_eq!(errors.get(PromptField::Name), Some("Name is required"));
        assert_eq!(
            errors.get(PromptField::SystemPrompt),
            Some("System prompt is required")
        );
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_update_requires_nothing() {
        assert!(validate_prompt(&PromptDraft::default(), ValidationMode::Update).is_ok());
    }

    #[test]
    fn test_update_still_checks_present_fields() {
        let update = PromptDraft {
            model: Some("   ".to_string()),
            ..Default::default()
        };
        let errors = validate_prompt(&update, ValidationMode::Update).unwrap_err();
        assert_eq!(errors.get(PromptField::Model), Some("Model name cannot be empty"));
    }

    #[test]
    fn test_blank_name_and_prompt() {
        let errors = validate_prompt(&draft("  ", "\n\t"), ValidationMode::Create).unwrap_err();
        assert_eq!(errors.get(PromptField::Name), Some("Name cannot be empty"));
        assert_eq!(
            errors.get(PromptField::SystemPrompt),
            Some("System prompt cannot be empty")
        );
    }

    #[test]
    fn test_every_forbidden_character_rejected() {
        for c in FORBIDDEN_NAME_CHARS {
            let name = format!("bad{c}name");
            let errors = validate_prompt(&draft(&name, "p"), ValidationMode::Create).unwrap_err();
            assert!(
                errors.get(PromptField::Name).unwrap().starts_with("Name cannot contain"),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_allowed_punctuation_in_name() {
        let name = "Code review (strict) - v2.1 & friends, #1!";
        assert!(validate_prompt(&draft(name, "p"), ValidationMode::Create).is_ok());
    }

    #[test]
    fn test_length_limits_count_characters() {
        let at_limit = "é".repeat(MAX_NAME_CHARS);
        assert!(validate_prompt(&draft(&at_limit, "p"), ValidationMode::Create).is_ok());

        let over = "a".repeat(MAX_NAME_CHARS + 1);
        let errors = validate_prompt(&draft(&over, "p"), ValidationMode::Create).unwrap_err();
        assert_eq!(
            errors.get(PromptField::Name),
            Some("Name cannot exceed 255 characters")
        );

        let long_prompt = "x".repeat(MAX_SYSTEM_PROMPT_CHARS + 1);
        let errors = validate_prompt(&draft("ok", &long_prompt), ValidationMode::Create).unwrap_err();
        assert_eq!(
            errors.get(PromptField::SystemPrompt),
            Some("System prompt cannot exceed 50,000 characters")
        );
    }

    #[test]
    fn test_model_too_long() {
        let mut d = draft("ok", "p");
        d.model = Some("m".repeat(MAX_MODEL_CHARS + 1));
        let errors = validate_prompt(&d, ValidationMode::Create).unwrap_err();
        assert_eq!(
            errors.get(PromptField::Model),
            Some("Model name cannot exceed 100 characters")
        );
    }

    #[test]
    fn test_temperature_bounds() {
        for t in [0.0, 0.05, 0.7, 1.0, 1.99, 2.0] {
            let mut d = draft("ok", "p");
            d.temperature = Some(t);
            assert!(validate_prompt(&d, ValidationMode::Create).is_ok(), "{t}");
        }
        for t in [-0.01, 2.01, 10.0, -5.0] {
            let mut d = draft("ok", "p");
            d.temperature = Some(t);
            let errors = validate_prompt(&d, ValidationMode::Create).unwrap_err();
            assert_eq!(
                errors.get(PromptField::Temperature),
                Some("Temperature must be between 0.0 and 2.0")
            );
        }
        assert_eq!(
            check_temperature(f64::NAN),
            Err("Temperature must be a valid number")
        );
    }

    #[test]
    fn test_blank_description_is_not_an_error() {
        let mut d = draft("ok", "p");
        d.description = Some("   ".to_string());
        assert!(validate_prompt(&d, ValidationMode::Create).is_ok());

        d.description = Some("d".repeat(MAX_DESCRIPTION_CHARS + 1));
        let errors = validate_prompt(&d, ValidationMode::Create).unwrap_err();
        assert_eq!(
            errors.get(PromptField::Description),
            Some("Description cannot exceed 1,000 characters")
        );
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let errors = validate_prompt(&PromptDraft::default(), ValidationMode::Create).unwrap_err();
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["name"], "Name is required");
        assert_eq!(json["system_prompt"], "System prompt is required");
    }

    #[test]
    fn test_first_message_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.insert(PromptField::Name, "first");
        errors.insert(PromptField::Name, "second");
        assert_eq!(errors.get(PromptField::Name), Some("first"));
        assert_eq!(errors.messages(), vec!["first".to_string()]);
    }
}
