use crate::config::Config;
use crate::server::routes::generate;
use crate::upstream::{GatewayOptions, ModelInvoker, RunOptions};

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
};
use base64::Engine as _;
use rand::RngCore;
use std::{sync::Arc, time::Instant};
use stratus_schema::RequestValidator;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Immutable per-process state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub invoker: Arc<dyn ModelInvoker>,
    pub validator: Arc<RequestValidator>,
    pub model: Arc<str>,
    pub run_options: RunOptions,
}

impl AppState {
    pub fn new(cfg: &Config, invoker: Arc<dyn ModelInvoker>) -> Self {
        let gateway = cfg
            .upstream
            .gateway_id
            .clone()
            .map(|id| GatewayOptions { id });

        Self {
            invoker,
            validator: Arc::new(RequestValidator::new(cfg.validation.profile())),
            model: Arc::from(cfg.upstream.model.as_str()),
            run_options: RunOptions { gateway },
        }
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn access_log(req: Request, next: Next) -> Response {
    // Capture request metadata before moving `req` into the handler stack.
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    // Always reflect `x-request-id` for easier correlation, even if the client didn't send one.
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let latency_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        error!(
            "| {:>3} | {} | {:^7} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            path,
            latency_ms,
            user_agent
        );
    } else if status.is_client_error() {
        warn!(
            "| {:>3} | {} | {:^7} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            path,
            latency_ms,
            user_agent
        );
    } else {
        info!(
            "| {:>3} | {} | {:^7} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            path,
            latency_ms,
            user_agent
        );
    }

    resp
}

pub fn gateway_router(state: AppState) -> Router {
    // A method mismatch on a known path is reported as 404, same as an
    // unknown path.
    Router::new()
        .merge(generate::router())
        .fallback(not_found_handler)
        .method_not_allowed_fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}
