use serde::{Deserialize, Serialize};
use url::Url;

/// Upstream Workers AI settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Cloudflare account the model runs under.
    /// TOML: `upstream.account_id`.
    #[serde(default)]
    pub account_id: String,

    /// Bearer token for the run endpoint (required, non-empty).
    /// TOML: `upstream.api_token`. Must be provided.
    #[serde(default)]
    pub api_token: String,

    /// AI Gateway id. When set, runs are routed through the gateway.
    /// TOML: `upstream.gateway_id`.
    #[serde(default)]
    pub gateway_id: Option<String>,

    /// Model identifier to run.
    /// TOML: `upstream.model`. Default: `@cf/openai/gpt-oss-120b`.
    #[serde(default = "default_model")]
    pub model: String,

    /// REST API base for direct runs. Must end with a trailing slash.
    /// TOML: `upstream.api_base`.
    #[serde(default = "default_api_base")]
    pub api_base: Url,

    /// AI Gateway base used when `gateway_id` is set. Must end with a
    /// trailing slash.
    /// TOML: `upstream.gateway_base`.
    #[serde(default = "default_gateway_base")]
    pub gateway_base: Url,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            api_token: String::new(),
            gateway_id: None,
            model: default_model(),
            api_base: default_api_base(),
            gateway_base: default_gateway_base(),
        }
    }
}

fn default_model() -> String {
    "@cf/openai/gpt-oss-120b".to_string()
}

fn default_api_base() -> Url {
    Url::parse("https://api.cloudflare.com/client/v4/").expect("default api_base is a valid URL")
}

fn default_gateway_base() -> Url {
    Url::parse("https://gateway.ai.cloudflare.com/v1/").expect("default gateway_base is a valid URL")
}
