//! End-to-end router tests (in-process, no socket).

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use pollpulse_server::{app_state::AppState, config::ServerConfig, router};

const BODY_LIMIT: usize = 64 * 1024;

fn app() -> Router {
    router::build_router(AppState::new(ServerConfig::default()))
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Pull the `data:` payloads out of an SSE body.
fn sse_data_lines(body: &str) -> Vec<serde_json::Value> {
    body.lines()
        .filter_map(|l| l.strip_prefix("data: "))
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[tokio::test]
async fn health_endpoints_reply_ok() {
    for uri in ["/", "/health"] {
        let resp = get(app(), uri).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }
}

#[tokio::test]
async fn unmatched_path_is_404_not_found() {
    let resp = get(app(), "/bogus").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(&body[..], b"Not Found");
}

#[tokio::test]
async fn zero_timeout_long_poll_replies_immediately() {
    let resp = get(app(), "/poll?timeout=0").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "Long poll completed");
    assert_eq!(json["timeout"], 0);
    assert!(json["timestamp"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn short_long_poll_echoes_requested_timeout() {
    let resp = get(app(), "/poll?timeout=50").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["timeout"], 50);
}

#[tokio::test]
async fn poll_with_interval_streams_events() {
    let resp = get(app(), "/poll?timeout=300&interval=100").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-cache");

    // collecting the body runs the stream to completion
    let body = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert_eq!(text.matches("event: message").count(), 3);
    let events = sse_data_lines(&text);
    let elapsed: Vec<u64> = events.iter().map(|e| e["elapsed"].as_u64().unwrap()).collect();
    assert_eq!(elapsed, vec![0, 100, 200]);
    assert_eq!(events[0]["message"], "Message at 0ms");
}

#[tokio::test]
async fn sse_route_always_streams() {
    let resp = get(app(), "/sse?timeout=200&interval=100").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );

    let body = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    let events = sse_data_lines(&String::from_utf8(body.to_vec()).unwrap());
    assert_eq!(events.len(), 2);
    assert_eq!(events[1]["elapsed"], 100);
}

#[tokio::test]
async fn metrics_endpoint_scrapes_after_traffic() {
    let app = app();
    let resp = get(app.clone(), "/poll?timeout=0").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let _ = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();

    let resp = get(app, "/metrics").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("pollpulse_sessions_started_total{mode=\"wait\"} 1"));
    assert!(text.contains("pollpulse_session_outcomes_total"));
}
