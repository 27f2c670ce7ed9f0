use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error as ThisError;

use crate::upstream::InvokeError;
use stratus_schema::{OutputParseError, ValidationError, ViolationTree};

/// Gateway-level error taxonomy.
///
/// Validation failures are recovered into structured 400 bodies; everything
/// else is converted to a generic message at the boundary. Internal detail is
/// logged, never leaked to the caller.
#[derive(Debug, ThisError)]
pub enum GatewayError {
    /// Malformed top-level payload: not JSON, not an object, or an empty
    /// prompt. The message is the literal 400 body.
    #[error("{0}")]
    InvalidPayload(&'static str),

    /// Field-level schema violations, with the full violation tree.
    #[error("request schema violation")]
    SchemaViolation(ViolationTree),

    /// The model call completed but returned no result.
    #[error("empty response from model")]
    EmptyRemoteResponse,

    /// The model response carried no `output_text` to extract.
    #[error("no output text in response")]
    MissingOutputText,

    /// Output text failed JSON decoding or result-schema validation.
    #[error(transparent)]
    OutputParse(#[from] OutputParseError),

    /// Upstream invocation failure (transport, status, envelope).
    #[error(transparent)]
    Upstream(#[from] InvokeError),

    /// Catch-all whose detail must never reach the caller.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for GatewayError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidPayload => GatewayError::InvalidPayload("Invalid payload"),
            ValidationError::Schema(tree) => GatewayError::SchemaViolation(tree),
        }
    }
}

/// 400 body for schema violations: `{"error": ..., "details": <tree>}`.
#[derive(Serialize)]
struct SchemaViolationBody {
    error: &'static str,
    details: ViolationTree,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::InvalidPayload(message) => {
                tracing::warn!(reason = message, "Request rejected");
                (StatusCode::BAD_REQUEST, message).into_response()
            }

            GatewayError::SchemaViolation(details) => {
                tracing::warn!(details = ?details, "Request failed schema validation");
                (
                    StatusCode::BAD_REQUEST,
                    Json(SchemaViolationBody {
                        error: "Invalid prompt",
                        details,
                    }),
                )
                    .into_response()
            }

            GatewayError::EmptyRemoteResponse => {
                tracing::warn!("Model call returned no result");
                (StatusCode::INTERNAL_SERVER_ERROR, "No response from model").into_response()
            }

            GatewayError::MissingOutputText => {
                tracing::warn!("Model response carried no output text");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "No output text in response",
                )
                    .into_response()
            }

            GatewayError::OutputParse(e) => {
                tracing::warn!(error = %e, "Failed to parse structured model output");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to parse model output",
                )
                    .into_response()
            }

            GatewayError::Upstream(e) => {
                tracing::error!(error = %e, "Upstream invocation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }

            GatewayError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
