//! Prompt domain types.
//!
//! These types represent saved system prompts, independent of any
//! infrastructure concerns (database, HTTP, file formats).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{PromptField, ValidationErrors};

/// Model used when a prompt does not name one.
pub const DEFAULT_PROMPT_MODEL: &str = "llama2";

/// Temperature used when a prompt does not specify one.
pub const DEFAULT_PROMPT_TEMPERATURE: f64 = 0.7;

// ─────────────────────────────────────────────────────────────────────────────
// Persisted Types
// ─────────────────────────────────────────────────────────────────────────────

/// A prompt that exists in storage with an assigned ID.
///
/// Use `NewPrompt` for prompts that haven't been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Storage ID (opaque to callers, assigned on insert).
    pub id: i64,
    /// Unique, case-sensitive prompt name.
    pub name: String,
    /// Optional free-form description. Never `Some("")`.
    pub description: Option<String>,
    /// The system prompt text.
    pub system_prompt: String,
    /// Model the prompt is meant for (e.g. "llama2", "mistral").
    pub model: String,
    /// Sampling temperature in `[0.0, 2.0]`.
    pub temperature: f64,
    /// UTC timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// UTC timestamp of the last field mutation.
    pub updated_at: DateTime<Utc>,
}

/// A prompt to be inserted into storage (no ID yet).
///
/// After insertion, the repository returns a `Prompt` with the assigned ID
/// and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrompt {
    pub name: String,
    pub description: Option<String>,
    pub system_prompt: String,
    pub model: String,
    pub temperature: f64,
}

impl NewPrompt {
    /// Create a new prompt with default model and temperature.
    #[must_use]
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            system_prompt: system_prompt.into(),
            model: DEFAULT_PROMPT_MODEL.to_string(),
            temperature: DEFAULT_PROMPT_TEMPERATURE,
        }
    }
}

/// Partial update for an existing prompt.
///
/// `None` leaves the field untouched. For `description`, `Some(None)`
/// clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
}

impl PromptUpdate {
    /// Returns true when the update would not change any field.
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.system_prompt.is_none()
            && self.model.is_none()
            && self.temperature.is_none()
    }
}

impl Prompt {
    /// Apply a partial update and refresh `updated_at`.
    pub fn apply(&mut self, update: PromptUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(system_prompt) = update.system_prompt {
            self.system_prompt = system_prompt;
        }
        if let Some(model) = update.model {
            self.model = model;
        }
        if let Some(temperature) = update.temperature {
            self.temperature = temperature;
        }
        self.updated_at = Utc::now();
    }

    /// Drop the storage identity, keeping the editable fields.
    #[must_use]
    pub fn to_new_prompt(&self) -> NewPrompt {
        NewPrompt {
            name: self.name.clone(),
            description: self.description.clone(),
            system_prompt: self.system_prompt.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Drafts
// ─────────────────────────────────────────────────────────────────────────────

/// A possibly partial, not yet validated prompt definition.
///
/// Drafts come from HTTP bodies and imported library files. Every field is
/// optional; `validate_prompt` decides which ones are mandatory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
}

impl PromptDraft {
    /// Build a draft from a loosely-typed JSON object.
    ///
    /// Unknown keys are ignored so exported records (which carry `id` and
    /// timestamps) can be fed back in. `null` is treated as absent. Values of
    /// the wrong JSON type are reported per field; numeric strings are
    /// accepted for `temperature`.
    pub fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let Some(object) = value.as_object() else {
            errors.insert(PromptField::Name, "Prompt entry must be an object");
            return Err(errors);
        };

        let mut text_field = |field: PromptField, message: &str| -> Option<String> {
            match object.get(field.as_str()) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(_) => {
                    errors.insert(field, message);
                    None
                }
            }
        };

        let name = text_field(PromptField::Name, "Name must be a string");
        let description = text_field(PromptField::Description, "Description must be a string");
        let system_prompt = text_field(PromptField::SystemPrompt, "System prompt must be a string");
        let model = text_field(PromptField::Model, "Model must be a string");

        let temperature = match object.get(PromptField::Temperature.as_str()) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(t) if t.is_finite() => Some(t),
                _ => {
                    errors.insert(PromptField::Temperature, "Temperature must be a valid number");
                    None
                }
            },
            Some(_) => {
                errors.insert(PromptField::Temperature, "Temperature must be a valid number");
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            name,
            description,
            system_prompt,
            model,
            temperature,
        })
    }

    /// Name used to identify the draft in reports, even when invalid.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    /// Convert a validated draft into a `NewPrompt`.
    ///
    /// Text fields are trimmed, missing model and temperature get their
    /// defaults, and a blank description becomes absent. Call only after
    /// create-mode validation succeeded.
    #[must_use]
    pub fn into_new_prompt(self) -> NewPrompt {
        NewPrompt {
            name: self.name.map(|n| n.trim().to_string()).unwrap_or_default(),
            description: normalize_description(self.description),
            system_prompt: self
                .system_prompt
                .map(|p| p.trim().to_string())
                .unwrap_or_default(),
            model: self
                .model
                .map(|m| m.trim().to_string())
                .unwrap_or_else(|| DEFAULT_PROMPT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(DEFAULT_PROMPT_TEMPERATURE),
        }
    }

    /// Convert a validated draft into a partial update.
    ///
    /// Only fields present in the draft are touched. A present but blank
    /// description clears the stored one.
    #[must_use]
    pub fn into_update(self) -> PromptUpdate {
        PromptUpdate {
            name: self.name.map(|n| n.trim().to_string()),
            description: self.description.map(|d| normalize_description(Some(d))),
            system_prompt: self.system_prompt.map(|p| p.trim().to_string()),
            model: self.model.map(|m| m.trim().to_string()),
            temperature: self.temperature,
        }
    }

    /// Full replacement of the mutable fields, used by import overwrite.
    ///
    /// Fields the draft omits fall back to their defaults instead of keeping
    /// the stored value; the name is never touched.
    #[must_use]
    pub fn into_overwrite(self) -> PromptUpdate {
        let fresh = Self {
            name: None,
            ..self
        }
        .into_new_prompt();
        PromptUpdate {
            name: None,
            description: Some(fresh.description),
            system_prompt: Some(fresh.system_prompt),
            model: Some(fresh.model),
            temperature: Some(fresh.temperature),
        }
    }
}

/// Trim a description and collapse blank values to `None`.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}
