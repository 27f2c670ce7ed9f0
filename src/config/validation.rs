use serde::{Deserialize, Serialize};
use stratus_schema::ValidationProfile;

/// Request-validator feature toggles.
///
/// The request schema went through three strictness levels; these flags pick
/// one without duplicating types. See [`ValidationProfile`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Accept the `reasoning` object.
    /// TOML: `validation.reasoning`. Default: `true`.
    #[serde(default = "default_true")]
    pub reasoning: bool,

    /// Accept the `text.format` directive.
    /// TOML: `validation.text_format`. Default: `true`.
    #[serde(default = "default_true")]
    pub text_format: bool,

    /// Accept `"minimal"` as a `reasoning.effort` value.
    /// TOML: `validation.minimal_effort`. Default: `false`.
    #[serde(default)]
    pub minimal_effort: bool,
}

impl ValidationConfig {
    pub fn profile(&self) -> ValidationProfile {
        ValidationProfile {
            reasoning: self.reasoning,
            text_format: self.text_format,
            minimal_effort: self.minimal_effort,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            reasoning: true,
            text_format: true,
            minimal_effort: false,
        }
    }
}

fn default_true() -> bool {
    true
}
