//! Text-generation request schema.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized text-generation request body.
///
/// Produced by [`crate::validate::RequestValidator`] from untrusted JSON, so a
/// value of this type carries only recognized fields. Serializes to the exact
/// wire shape the model expects; absent optional fields are omitted, not
/// serialized as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// A system (or developer) message inserted into the model's context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// Text or message inputs to the model, used to generate a response.
    pub input: GenerationInput,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Reasoning>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextOptions>,
}

impl GenerationRequest {
    /// A request carrying a bare prompt string and nothing else.
    pub fn from_text(prompt: impl Into<String>) -> Self {
        Self {
            instructions: None,
            input: GenerationInput::Text(prompt.into()),
            reasoning: None,
            text: None,
        }
    }
}

/// `input` accepts either a bare prompt string or an ordered message list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationInput {
    Text(String),
    Messages(Vec<InputMessage>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    pub role: MessageRole,
    /// Only string content is supported for these models.
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Developer,
    User,
}

/// Reasoning controls. Both fields are independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<ReasoningEffort>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReasoningSummary>,
}

/// Whether `Minimal` is accepted from untrusted input is decided by the
/// validator profile, not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    High,
    Medium,
    Low,
    Minimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningSummary {
    Auto,
    Concise,
    Detailed,
}

/// Output-format directive (`text` on the wire).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

/// Closed discriminated union for `text.format`.
///
/// The `type` tag decides which sibling fields are meaningful; a value mixing
/// fields from both variants is unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    JsonSchema {
        name: String,
        /// Arbitrary JSON-object schema, preserved verbatim so keywords like
        /// `required`, `additionalProperties` and `items` are retained.
        schema: Map<String, Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        strict: Option<bool>,
    },
}
