use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use super::extract::ValidatedGeneration;
use crate::error::GatewayError;
use crate::server::router::AppState;
use stratus_schema::{GenerationRequest, OutputFormat, TextOptions, parse_structured};

/// Fixed example result shape for `/structured-output`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StructuredAnswer {
    pub user_request: String,
    pub thought_process: Vec<String>,
    pub final_answer: String,
}

/// `text.format` directive derived from [`StructuredAnswer`].
static ANSWER_FORMAT: LazyLock<OutputFormat> = LazyLock::new(|| {
    let schema = serde_json::to_value(schema_for!(StructuredAnswer))
        .ok()
        .and_then(|v| v.as_object().cloned())
        .unwrap_or_default();

    OutputFormat::JsonSchema {
        name: "structured_answer".to_string(),
        schema,
        strict: Some(true),
    }
});

pub(super) async fn text_input_handler(
    State(state): State<AppState>,
    prompt: String,
) -> Result<Response, GatewayError> {
    if prompt.is_empty() {
        return Err(GatewayError::InvalidPayload("No prompt provided"));
    }

    debug!(model = %state.model, "Incoming raw text generation request");

    let request = GenerationRequest::from_text(prompt);
    let response = state
        .invoker
        .invoke(&state.model, &request, &state.run_options)
        .await?
        .ok_or(GatewayError::EmptyRemoteResponse)?;

    Ok(Json(response.output).into_response())
}

pub(super) async fn text_input_object_handler(
    State(state): State<AppState>,
    ValidatedGeneration(request): ValidatedGeneration,
) -> Result<Response, GatewayError> {
    debug!(model = %state.model, "Incoming structured generation request");

    let response = state
        .invoker
        .invoke(&state.model, &request, &state.run_options)
        .await?
        .ok_or(GatewayError::EmptyRemoteResponse)?;

    Ok(Json(response.output).into_response())
}

pub(super) async fn structured_output_handler(
    State(state): State<AppState>,
    ValidatedGeneration(mut request): ValidatedGeneration,
) -> Result<Response, GatewayError> {
    debug!(model = %state.model, "Incoming structured-output generation request");

    // The example result schema wins over whatever format the caller sent.
    request.text = Some(TextOptions {
        format: Some(ANSWER_FORMAT.clone()),
    });

    let response = state
        .invoker
        .invoke(&state.model, &request, &state.run_options)
        .await?
        .ok_or(GatewayError::EmptyRemoteResponse)?;

    let parsed = parse_structured::<StructuredAnswer>(&response)?;
    let answer = parsed
        .output_parsed()
        .ok_or(GatewayError::MissingOutputText)?;

    Ok(Json(answer).into_response())
}
