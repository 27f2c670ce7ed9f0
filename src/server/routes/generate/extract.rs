use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;
use tracing::debug;

use crate::error::GatewayError;
use crate::server::router::AppState;
use crate::utils::logging::with_pretty_json_debug;
use stratus_schema::GenerationRequest;

pub(crate) struct ValidatedGeneration(pub(crate) GenerationRequest);

impl FromRequest<AppState> for ValidatedGeneration {
    type Rejection = GatewayError;

    /// Extract and validate a JSON generation request body.
    ///
    /// Responsibilities:
    /// - Read the raw body and decode it as a JSON value.
    /// - Run the configured `RequestValidator` to project the recognized
    ///   fields into a normalized `GenerationRequest`.
    ///
    /// Error handling:
    /// - Unreadable body => `Internal` (500).
    /// - Undecodable JSON or a non-object payload => `InvalidPayload` (400,
    ///   plain-text body).
    /// - Field-level failures => `SchemaViolation` carrying the full
    ///   violation tree (400, structured body).
    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| GatewayError::Internal(format!("failed to read request body: {e}")))?;

        let payload: Value = serde_json::from_slice(&bytes)
            .map_err(|_| GatewayError::InvalidPayload("Invalid payload"))?;

        let request = state.validator.validate(&payload)?;

        with_pretty_json_debug(&request, |pretty| {
            debug!(body = %pretty, "Extracted normalized generation request");
        });

        Ok(Self(request))
    }
}
