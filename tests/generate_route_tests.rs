use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use stratus::config::Config;
use stratus::server::router::{AppState, gateway_router};
use stratus::upstream::{InvokeError, ModelInvoker, RunOptions};
use stratus_schema::{
    ContentPart, GenerationRequest, GenerationResponse, OutputItem, ReasoningPart,
};

/// Canned invoker that records every request it is handed.
struct StubInvoker {
    response: Option<GenerationResponse>,
    seen: Mutex<Vec<(String, Value)>>,
}

impl StubInvoker {
    fn returning(response: Option<GenerationResponse>) -> Arc<Self> {
        Arc::new(Self {
            response,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn last_request(&self) -> Option<(String, Value)> {
        self.seen.lock().expect("poisoned lock").last().cloned()
    }
}

#[async_trait]
impl ModelInvoker for StubInvoker {
    async fn invoke(
        &self,
        model: &str,
        request: &GenerationRequest,
        _options: &RunOptions,
    ) -> Result<Option<GenerationResponse>, InvokeError> {
        let body = serde_json::to_value(request).expect("request must serialize");
        self.seen
            .lock()
            .expect("poisoned lock")
            .push((model.to_string(), body));
        Ok(self.response.clone())
    }
}

fn text_response(text: &str) -> GenerationResponse {
    GenerationResponse {
        output: vec![OutputItem::Message {
            content: vec![ContentPart::OutputText {
                text: text.to_string(),
            }],
        }],
    }
}

fn app_with(invoker: Arc<StubInvoker>) -> Router {
    let cfg = Config::default();
    gateway_router(AppState::new(&cfg, invoker))
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("failed to build request")
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not JSON")
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body was not utf-8")
}

#[tokio::test]
async fn text_input_forwards_prompt_and_returns_output() {
    let invoker = StubInvoker::returning(Some(text_response("ok")));
    let app = app_with(invoker.clone());

    let resp = app
        .oneshot(post("/text-input", "hello"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let (model, upstream_body) = invoker.last_request().expect("model was never invoked");
    assert_eq!(model, "@cf/openai/gpt-oss-120b");
    assert_eq!(upstream_body, json!({"input": "hello"}));

    assert_eq!(
        body_json(resp).await,
        json!([{
            "type": "message",
            "content": [{"type": "output_text", "text": "ok"}],
        }])
    );
}

#[tokio::test]
async fn text_input_rejects_empty_body() {
    let invoker = StubInvoker::returning(Some(text_response("ok")));
    let app = app_with(invoker.clone());

    let resp = app
        .oneshot(post("/text-input", Body::empty()))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "No prompt provided");
    assert!(invoker.last_request().is_none());
}

#[tokio::test]
async fn text_input_object_forwards_exactly_the_recognized_fields() {
    let invoker = StubInvoker::returning(Some(text_response("ok")));
    let app = app_with(invoker.clone());

    let resp = app
        .oneshot(post(
            "/text-input-object",
            r#"{"instructions":"be terse","input":"hi","session":"abc"}"#,
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let (_, upstream_body) = invoker.last_request().expect("model was never invoked");
    assert_eq!(
        upstream_body,
        json!({"instructions": "be terse", "input": "hi"})
    );
}

#[tokio::test]
async fn text_input_object_rejects_non_string_input_with_details() {
    let invoker = StubInvoker::returning(Some(text_response("ok")));
    let app = app_with(invoker.clone());

    let resp = app
        .oneshot(post("/text-input-object", r#"{"input":42}"#))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = body_json(resp).await;
    assert_eq!(body["error"], json!("Invalid prompt"));
    assert_eq!(
        body["details"]["properties"]["input"]["errors"],
        json!(["expected a string or an array of messages"])
    );
    assert!(invoker.last_request().is_none());
}

#[tokio::test]
async fn text_input_object_rejects_undecodable_and_non_object_payloads() {
    let invoker = StubInvoker::returning(Some(text_response("ok")));
    let app = app_with(invoker);

    for body in ["not-json", "[1,2]", "null"] {
        let resp = app
            .clone()
            .oneshot(post("/text-input-object", body))
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(resp).await, "Invalid payload");
    }
}

#[tokio::test]
async fn absent_model_result_yields_500() {
    let invoker = StubInvoker::returning(None);
    let app = app_with(invoker);

    let resp = app
        .oneshot(post("/text-input", "hello"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(resp).await, "No response from model");
}

#[tokio::test]
async fn structured_output_returns_the_parsed_value() {
    let answer = json!({
        "user_request": "sum 1 and 2",
        "thought_process": ["1 + 2", "= 3"],
        "final_answer": "3",
    });
    let invoker = StubInvoker::returning(Some(text_response(&answer.to_string())));
    let app = app_with(invoker.clone());

    let resp = app
        .oneshot(post("/structured-output", r#"{"input":"sum 1 and 2"}"#))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, answer);

    // The handler forces the example schema onto `text.format`.
    let (_, upstream_body) = invoker.last_request().expect("model was never invoked");
    let format = &upstream_body["text"]["format"];
    assert_eq!(format["type"], json!("json_schema"));
    assert_eq!(format["name"], json!("structured_answer"));
    assert!(
        format["schema"]["properties"]
            .as_object()
            .is_some_and(|props| props.contains_key("final_answer"))
    );
}

#[tokio::test]
async fn structured_output_with_invalid_output_text_yields_500() {
    let invoker = StubInvoker::returning(Some(text_response("not json at all")));
    let app = app_with(invoker);

    let resp = app
        .oneshot(post("/structured-output", r#"{"input":"hi"}"#))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(resp).await, "Failed to parse model output");
}

#[tokio::test]
async fn structured_output_without_output_text_yields_500() {
    let invoker = StubInvoker::returning(Some(GenerationResponse {
        output: vec![OutputItem::Reasoning {
            content: vec![ReasoningPart::ReasoningText {
                text: "thinking only".to_string(),
            }],
        }],
    }));
    let app = app_with(invoker);

    let resp = app
        .oneshot(post("/structured-output", r#"{"input":"hi"}"#))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(resp).await, "No output text in response");
}

#[tokio::test]
async fn unknown_routes_and_methods_yield_404() {
    let invoker = StubInvoker::returning(Some(text_response("ok")));
    let app = app_with(invoker);

    let resp = app
        .clone()
        .oneshot(post("/no-such-route", "x"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/text-input")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
