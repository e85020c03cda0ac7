//! Axum router wiring.
//!
//! `/poll` and `/sse` go through the dispatch adapter; `/`, `/health`, and
//! `/metrics` are immediate responses; everything else is a plain 404.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde_json::json;

use crate::{app_state::AppState, dispatch};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/poll", get(dispatch::poll))
        .route("/sse", get(dispatch::sse))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(app): State<AppState>) -> String {
    app.metrics().render()
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
