//! Structured-output extraction: typed parsing of model output text.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error as ThisError;

use crate::response::{ContentPart, GenerationResponse, OutputItem, ReasoningPart};

/// Failure to interpret an `output_text` part as the expected result type.
///
/// The two variants separate the serde failure stages: the text not being
/// JSON at all, versus valid JSON that does not fit the result schema.
#[derive(Debug, ThisError)]
pub enum OutputParseError {
    #[error("output item {item}: output text is not valid JSON: {source}")]
    InvalidJson {
        item: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("output item {item}: output text does not match the result schema: {source}")]
    SchemaMismatch {
        item: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// A [`GenerationResponse`] whose `output_text` parts carry a typed `parsed`
/// value alongside the original text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedResponse<T> {
    pub output: Vec<ParsedOutputItem<T>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedOutputItem<T> {
    Message { content: Vec<ParsedContentPart<T>> },
    Reasoning { content: Vec<ReasoningPart> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedContentPart<T> {
    OutputText { text: String, parsed: T },
    Refusal { refusal: String },
}

impl<T> ParsedResponse<T> {
    /// The parsed value of the first `output_text` part, scanning `output` in
    /// order and skipping non-`message` items and parts without a parsed
    /// value.
    ///
    /// Recomputed on every call rather than stored, so it can never go stale
    /// relative to `output`.
    pub fn output_parsed(&self) -> Option<&T> {
        self.output.iter().find_map(|item| match item {
            ParsedOutputItem::Message { content } => content.iter().find_map(|part| match part {
                ParsedContentPart::OutputText { parsed, .. } => Some(parsed),
                ParsedContentPart::Refusal { .. } => None,
            }),
            ParsedOutputItem::Reasoning { .. } => None,
        })
    }
}

/// Parses every `output_text` part of `response` as JSON and validates it
/// into `T`.
///
/// Refusal parts and reasoning items pass through unchanged and never
/// contribute a parsed value. A part that is not valid JSON, or that does not
/// deserialize into `T`, fails the whole call; the caller asked for a
/// specific parse, so malformed text is never skipped silently.
///
/// The input response is never mutated; item and part order is preserved
/// exactly as received.
pub fn parse_structured<T>(
    response: &GenerationResponse,
) -> Result<ParsedResponse<T>, OutputParseError>
where
    T: DeserializeOwned,
{
    let mut output = Vec::with_capacity(response.output.len());

    for (index, item) in response.output.iter().enumerate() {
        output.push(match item {
            OutputItem::Message { content } => {
                let mut parts = Vec::with_capacity(content.len());
                for part in content {
                    parts.push(match part {
                        ContentPart::OutputText { text } => ParsedContentPart::OutputText {
                            text: text.clone(),
                            parsed: parse_output_text(index, text)?,
                        },
                        ContentPart::Refusal { refusal } => ParsedContentPart::Refusal {
                            refusal: refusal.clone(),
                        },
                    });
                }
                ParsedOutputItem::Message { content: parts }
            }
            OutputItem::Reasoning { content } => ParsedOutputItem::Reasoning {
                content: content.clone(),
            },
        });
    }

    Ok(ParsedResponse { output })
}

fn parse_output_text<T>(item: usize, text: &str) -> Result<T, OutputParseError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(text).map_err(|source| match source.classify() {
        serde_json::error::Category::Data => OutputParseError::SchemaMismatch { item, source },
        _ => OutputParseError::InvalidJson { item, source },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
    struct Verdict {
        answer: String,
    }

    fn message(texts: &[&str]) -> OutputItem {
        OutputItem::Message {
            content: texts
                .iter()
                .map(|text| ContentPart::OutputText {
                    text: (*text).to_string(),
                })
                .collect(),
        }
    }

    fn reasoning(text: &str) -> OutputItem {
        OutputItem::Reasoning {
            content: vec![ReasoningPart::ReasoningText {
                text: text.to_string(),
            }],
        }
    }

    #[test]
    fn attaches_parsed_value_to_every_output_text_part() {
        let response = GenerationResponse {
            output: vec![
                reasoning("mulling it over"),
                message(&[r#"{"answer":"a"}"#, r#"{"answer":"b"}"#]),
            ],
        };

        let parsed = parse_structured::<Verdict>(&response).expect("extraction failed");
        let ParsedOutputItem::Message { content } = &parsed.output[1] else {
            panic!("expected a message item");
        };
        assert_eq!(content.len(), 2);
        assert!(matches!(
            &content[1],
            ParsedContentPart::OutputText { parsed, .. } if parsed.answer == "b"
        ));
    }

    #[test]
    fn output_parsed_returns_first_output_text_value() {
        let response = GenerationResponse {
            output: vec![
                reasoning("hmm"),
                message(&[r#"{"answer":"first"}"#]),
                message(&[r#"{"answer":"second"}"#]),
            ],
        };

        let parsed = parse_structured::<Verdict>(&response).expect("extraction failed");
        assert_eq!(
            parsed.output_parsed(),
            Some(&Verdict {
                answer: "first".to_string(),
            })
        );
    }

    #[test]
    fn output_parsed_is_absent_for_reasoning_only_output() {
        let response = GenerationResponse {
            output: vec![reasoning("nothing to say")],
        };

        let parsed = parse_structured::<Verdict>(&response).expect("extraction failed");
        assert_eq!(parsed.output_parsed(), None);
    }

    #[test]
    fn refusal_parts_pass_through_without_a_parsed_value() {
        let response = GenerationResponse {
            output: vec![OutputItem::Message {
                content: vec![
                    ContentPart::Refusal {
                        refusal: "cannot help with that".to_string(),
                    },
                    ContentPart::OutputText {
                        text: r#"{"answer":"ok"}"#.to_string(),
                    },
                ],
            }],
        };

        let parsed = parse_structured::<Verdict>(&response).expect("extraction failed");
        let ParsedOutputItem::Message { content } = &parsed.output[0] else {
            panic!("expected a message item");
        };
        assert!(matches!(&content[0], ParsedContentPart::Refusal { .. }));
        assert_eq!(
            parsed.output_parsed(),
            Some(&Verdict {
                answer: "ok".to_string(),
            })
        );
    }

    #[test]
    fn invalid_json_is_a_hard_failure() {
        let response = GenerationResponse {
            output: vec![message(&["not json"])],
        };

        let err = parse_structured::<Verdict>(&response).expect_err("expected extraction to fail");
        assert!(matches!(err, OutputParseError::InvalidJson { item: 0, .. }));
    }

    #[test]
    fn schema_mismatch_is_a_hard_failure() {
        let response = GenerationResponse {
            output: vec![reasoning("x"), message(&[r#"{"verdict":"wrong shape"}"#])],
        };

        let err = parse_structured::<Verdict>(&response).expect_err("expected extraction to fail");
        assert!(matches!(err, OutputParseError::SchemaMismatch { item: 1, .. }));
    }

    #[test]
    fn extraction_is_idempotent_and_leaves_the_input_untouched() {
        let response = GenerationResponse {
            output: vec![message(&[r#"{"answer":"stable"}"#])],
        };
        let before = response.clone();

        let first = parse_structured::<Verdict>(&response).expect("extraction failed");
        let second = parse_structured::<Verdict>(&response).expect("extraction failed");

        assert_eq!(first, second);
        assert_eq!(response, before);
    }

    #[test]
    fn serializes_with_parsed_alongside_text() {
        let response = GenerationResponse {
            output: vec![message(&[r#"{"answer":"ok"}"#])],
        };

        let parsed = parse_structured::<Verdict>(&response).expect("extraction failed");
        let out = serde_json::to_value(&parsed).expect("failed to serialize");
        assert_eq!(
            out,
            json!({
                "output": [{
                    "type": "message",
                    "content": [{
                        "type": "output_text",
                        "text": r#"{"answer":"ok"}"#,
                        "parsed": {"answer": "ok"},
                    }],
                }],
            })
        );
    }
}
