//! Wire types for the Ollama HTTP API.
//!
//! These types are internal to `promptlab-ollama`. Consumers see the
//! core-owned `ModelInfo` instead.

use promptlab_core::ModelInfo;
use serde::{Deserialize, Serialize};

/// Nucleus sampling value sent with every generation request.
pub const TOP_P: f64 = 0.9;

/// Temperature used for prompt refinement.
pub const REFINE_TEMPERATURE: f64 = 0.3;

// ============================================================================
// GET /api/tags
// ============================================================================

/// Body of `GET /api/tags`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagEntry>,
}

/// One installed model. Missing fields default to empty or zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified_at: String,
    #[serde(default)]
    pub digest: String,
}

impl From<TagEntry> for ModelInfo {
    fn from(entry: TagEntry) -> Self {
        Self::new(entry.name, entry.size, entry.modified_at, entry.digest)
    }
}

// ============================================================================
// POST /api/generate
// ============================================================================

/// Body of a non-streaming `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Sampling options for a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub temperature: f64,
    pub top_p: f64,
}

impl<'a> GenerateRequest<'a> {
    pub const fn new(model: &'a str, prompt: &'a str, temperature: f64) -> Self {
        Self {
            model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature,
                top_p: TOP_P,
            },
        }
    }
}

/// Body of a non-streaming generation reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
}

// ============================================================================
// Prompt templates
// ============================================================================

/// Meta-prompt that turns an objective into a system prompt.
pub fn refinement_prompt(objective: &str) -> String {
    format!(
        "You are an expert prompt engineer. Your task is to convert a simple objective into a \
detailed, effective system prompt that will guide an AI assistant to achieve that objective.

Guidelines for creating system prompts:
1. Be specific and clear about the role and behavior expected
2. Include relevant context and constraints
3. Specify the desired output format if applicable
4. Add examples or templates when helpful
5. Include error handling or edge case instructions
6. Make it actionable and measurable

The objective to convert into a system prompt is:
{objective}

Create a comprehensive system prompt that will effectively guide an AI to accomplish this \
objective. Return only the system prompt text, without any additional commentary or explanation."
    )
}

/// Single-turn transcript sent when testing a system prompt.
pub fn test_transcript(system_prompt: &str, user_input: &str) -> String {
    format!("{system_prompt}\n\nUser: {user_input}\n\nAssistant:")
}
