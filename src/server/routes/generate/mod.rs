use crate::server::router::AppState;
use axum::{Router, routing::post};

pub mod extract;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/text-input", post(handlers::text_input_handler))
        .route(
            "/text-input-object",
            post(handlers::text_input_object_handler),
        )
        .route(
            "/structured-output",
            post(handlers::structured_output_handler),
        )
}
