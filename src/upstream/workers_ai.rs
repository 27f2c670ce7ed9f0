//! Workers AI REST client.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{GatewayOptions, InvokeError, ModelInvoker, RunOptions};
use crate::config::UpstreamConfig;
use stratus_schema::{GenerationRequest, GenerationResponse};

const USER_AGENT: &str = concat!("stratus/", env!("CARGO_PKG_VERSION"));

/// REST envelope wrapping a model run result.
#[derive(Debug, Deserialize)]
struct RunEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<GenerationResponse>,
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone)]
pub struct WorkersAiClient {
    http: reqwest::Client,
    account_id: String,
    api_token: String,
    api_base: Url,
    gateway_base: Url,
}

impl WorkersAiClient {
    pub fn new(cfg: &UpstreamConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(5 * 60))
            .build()
            .expect("failed to build reqwest client");

        Self {
            http,
            account_id: cfg.account_id.clone(),
            api_token: cfg.api_token.clone(),
            api_base: cfg.api_base.clone(),
            gateway_base: cfg.gateway_base.clone(),
        }
    }

    /// Direct run URL, or the AI Gateway route when a gateway id is supplied.
    fn run_url(&self, model: &str, gateway: Option<&GatewayOptions>) -> Result<Url, url::ParseError> {
        match gateway {
            Some(gateway) => self.gateway_base.join(&format!(
                "{}/{}/workers-ai/{model}",
                self.account_id, gateway.id
            )),
            None => self
                .api_base
                .join(&format!("accounts/{}/ai/run/{model}", self.account_id)),
        }
    }
}

#[async_trait]
impl ModelInvoker for WorkersAiClient {
    async fn invoke(
        &self,
        model: &str,
        request: &GenerationRequest,
        options: &RunOptions,
    ) -> Result<Option<GenerationResponse>, InvokeError> {
        let url = self.run_url(model, options.gateway.as_ref())?;

        tracing::debug!(%url, model, "Dispatching model run");

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_token)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
            return Err(InvokeError::Status { status, body });
        }

        let envelope: RunEnvelope = serde_json::from_slice(&resp.bytes().await?)?;
        if !envelope.success {
            let message = envelope
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(InvokeError::Rejected { message });
        }

        Ok(envelope.result)
    }
}
