//! Remote model invocation.

mod workers_ai;

pub use workers_ai::WorkersAiClient;

use async_trait::async_trait;
use thiserror::Error as ThisError;

use stratus_schema::{GenerationRequest, GenerationResponse};

/// Per-invocation routing options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// AI Gateway routing/observability token, from process configuration.
    /// Passed through as-is; its presence is not validated here.
    pub gateway: Option<GatewayOptions>,
}

#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub id: String,
}

/// Transport/envelope failures from the model invocation.
#[derive(Debug, ThisError)]
pub enum InvokeError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid invocation URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("upstream returned {status}: {body:.200}")]
    Status {
        status: reqwest::StatusCode,
        /// Raw upstream body, preserved for internal diagnostics only.
        body: String,
    },

    #[error("upstream rejected the run: {message}")]
    Rejected { message: String },

    #[error("failed to decode upstream envelope: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Opaque seam to the hosted model.
///
/// `Ok(None)` means the call completed but produced no result; the caller
/// decides how to surface that.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(
        &self,
        model: &str,
        request: &GenerationRequest,
        options: &RunOptions,
    ) -> Result<Option<GenerationResponse>, InvokeError>;
}
