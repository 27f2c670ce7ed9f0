//! Untrusted-payload validation for text-generation requests.

use serde_json::{Map, Value};
use thiserror::Error as ThisError;

use crate::request::{
    GenerationInput, GenerationRequest, InputMessage, MessageRole, OutputFormat, Reasoning,
    ReasoningEffort, ReasoningSummary, TextOptions,
};
use crate::violations::{
    PathSegment::{Index, Key},
    ViolationTree,
};

/// Which optional schema features the validator accepts.
///
/// The request schema went through three strictness levels; a feature switched
/// off here turns the corresponding field into an unknown field (dropped), not
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationProfile {
    /// Accept the `reasoning` object.
    pub reasoning: bool,
    /// Accept the `text.format` directive.
    pub text_format: bool,
    /// Accept `"minimal"` as a `reasoning.effort` value.
    pub minimal_effort: bool,
}

impl ValidationProfile {
    /// `instructions` + `input` only.
    pub fn minimal() -> Self {
        Self {
            reasoning: false,
            text_format: false,
            minimal_effort: false,
        }
    }

    /// Adds the `reasoning` controls.
    pub fn with_reasoning() -> Self {
        Self {
            reasoning: true,
            ..Self::minimal()
        }
    }

    /// Adds `text.format` passthrough.
    pub fn full() -> Self {
        Self {
            reasoning: true,
            text_format: true,
            minimal_effort: false,
        }
    }
}

impl Default for ValidationProfile {
    fn default() -> Self {
        Self::full()
    }
}

#[derive(Debug, ThisError)]
pub enum ValidationError {
    /// The payload is not a JSON object at the top level.
    #[error("payload must be a JSON object")]
    InvalidPayload,

    /// Field-level constraint failures, carrying the full violation tree.
    #[error("request does not match the generation schema")]
    Schema(ViolationTree),
}

/// Validates untrusted JSON into a [`GenerationRequest`].
///
/// Recognized fields are projected out explicitly; unknown top-level fields
/// are dropped rather than rejected. Every field-level violation is collected
/// into one [`ViolationTree`] before the call fails, so a caller sees all of
/// its mistakes at once.
#[derive(Debug, Clone, Default)]
pub struct RequestValidator {
    profile: ValidationProfile,
}

impl RequestValidator {
    pub fn new(profile: ValidationProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> ValidationProfile {
        self.profile
    }

    pub fn validate(&self, payload: &Value) -> Result<GenerationRequest, ValidationError> {
        let Value::Object(fields) = payload else {
            return Err(ValidationError::InvalidPayload);
        };

        let mut tree = ViolationTree::default();

        let instructions = project_instructions(fields, &mut tree);
        let input = project_input(fields, &mut tree);
        let reasoning = if self.profile.reasoning {
            self.project_reasoning(fields, &mut tree)
        } else {
            None
        };
        let text = if self.profile.text_format {
            project_text(fields, &mut tree)
        } else {
            None
        };

        // `input` is Some exactly when no violation was recorded for it.
        match (input, tree.is_empty()) {
            (Some(input), true) => Ok(GenerationRequest {
                instructions,
                input,
                reasoning,
                text,
            }),
            _ => Err(ValidationError::Schema(tree)),
        }
    }

    fn project_reasoning(
        &self,
        fields: &Map<String, Value>,
        tree: &mut ViolationTree,
    ) -> Option<Reasoning> {
        let value = fields.get("reasoning")?;
        let Value::Object(fields) = value else {
            tree.push(&[Key("reasoning")], "expected an object");
            return None;
        };

        let effort = match fields.get("effort") {
            None => None,
            Some(value) => {
                let parsed = value.as_str().and_then(|s| self.parse_effort(s));
                if parsed.is_none() {
                    tree.push(&[Key("reasoning"), Key("effort")], self.effort_expected());
                }
                parsed
            }
        };

        let summary = match fields.get("summary") {
            None => None,
            Some(value) => {
                let parsed = value.as_str().and_then(parse_summary);
                if parsed.is_none() {
                    tree.push(
                        &[Key("reasoning"), Key("summary")],
                        "expected one of: auto, concise, detailed",
                    );
                }
                parsed
            }
        };

        Some(Reasoning { effort, summary })
    }

    fn parse_effort(&self, value: &str) -> Option<ReasoningEffort> {
        match value {
            "high" => Some(ReasoningEffort::High),
            "medium" => Some(ReasoningEffort::Medium),
            "low" => Some(ReasoningEffort::Low),
            "minimal" if self.profile.minimal_effort => Some(ReasoningEffort::Minimal),
            _ => None,
        }
    }

    fn effort_expected(&self) -> &'static str {
        if self.profile.minimal_effort {
            "expected one of: high, medium, low, minimal"
        } else {
            "expected one of: high, medium, low"
        }
    }
}

fn parse_summary(value: &str) -> Option<ReasoningSummary> {
    match value {
        "auto" => Some(ReasoningSummary::Auto),
        "concise" => Some(ReasoningSummary::Concise),
        "detailed" => Some(ReasoningSummary::Detailed),
        _ => None,
    }
}

fn project_instructions(fields: &Map<String, Value>, tree: &mut ViolationTree) -> Option<String> {
    match fields.get("instructions") {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            tree.push(&[Key("instructions")], "expected a string");
            None
        }
    }
}

fn project_input(fields: &Map<String, Value>, tree: &mut ViolationTree) -> Option<GenerationInput> {
    match fields.get("input") {
        None => {
            tree.push(&[Key("input")], "required");
            None
        }
        Some(Value::String(s)) => Some(GenerationInput::Text(s.clone())),
        Some(Value::Array(items)) => {
            let mut messages = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                if let Some(message) = project_message(index, item, tree) {
                    messages.push(message);
                }
            }
            // The list survives only if every element validated.
            (messages.len() == items.len()).then_some(GenerationInput::Messages(messages))
        }
        Some(_) => {
            tree.push(&[Key("input")], "expected a string or an array of messages");
            None
        }
    }
}

fn project_message(index: usize, item: &Value, tree: &mut ViolationTree) -> Option<InputMessage> {
    let Value::Object(fields) = item else {
        tree.push(&[Key("input"), Index(index)], "expected a message object");
        return None;
    };

    let role = match fields.get("role").and_then(Value::as_str) {
        Some("developer") => Some(MessageRole::Developer),
        Some("user") => Some(MessageRole::User),
        _ => {
            tree.push(
                &[Key("input"), Index(index), Key("role")],
                "expected one of: developer, user",
            );
            None
        }
    };

    let content = match fields.get("content") {
        Some(Value::String(s)) => Some(s.clone()),
        _ => {
            tree.push(
                &[Key("input"), Index(index), Key("content")],
                "expected a string",
            );
            None
        }
    };

    Some(InputMessage {
        role: role?,
        content: content?,
    })
}

fn project_text(fields: &Map<String, Value>, tree: &mut ViolationTree) -> Option<TextOptions> {
    let value = fields.get("text")?;
    let Value::Object(fields) = value else {
        tree.push(&[Key("text")], "expected an object");
        return None;
    };

    let format = match fields.get("format") {
        None => None,
        Some(value) => project_format(value, tree),
    };

    Some(TextOptions { format })
}

const JSON_SCHEMA_FIELDS: [&str; 3] = ["name", "schema", "strict"];

fn project_format(value: &Value, tree: &mut ViolationTree) -> Option<OutputFormat> {
    let Value::Object(fields) = value else {
        tree.push(&[Key("text"), Key("format")], "expected an object");
        return None;
    };

    match fields.get("type").and_then(Value::as_str) {
        Some("text") => {
            // A `text` format must not smuggle in `json_schema` fields.
            for field in JSON_SCHEMA_FIELDS {
                if fields.contains_key(field) {
                    tree.push(
                        &[Key("text"), Key("format"), Key(field)],
                        "not allowed for the text format",
                    );
                }
            }
            Some(OutputFormat::Text)
        }
        Some("json_schema") => {
            let name = match fields.get("name") {
                Some(Value::String(s)) => Some(s.clone()),
                _ => {
                    tree.push(&[Key("text"), Key("format"), Key("name")], "expected a string");
                    None
                }
            };
            let schema = match fields.get("schema") {
                Some(Value::Object(map)) => Some(map.clone()),
                _ => {
                    tree.push(
                        &[Key("text"), Key("format"), Key("schema")],
                        "expected a JSON object",
                    );
                    None
                }
            };
            let strict = match fields.get("strict") {
                None => None,
                Some(Value::Bool(b)) => Some(*b),
                Some(_) => {
                    tree.push(
                        &[Key("text"), Key("format"), Key("strict")],
                        "expected a boolean",
                    );
                    None
                }
            };
            Some(OutputFormat::JsonSchema {
                name: name?,
                schema: schema?,
                strict,
            })
        }
        _ => {
            tree.push(
                &[Key("text"), Key("format")],
                r#"expected type "text" or "json_schema""#,
            );
            None
        }
    }
}
