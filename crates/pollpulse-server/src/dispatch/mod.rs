//! Dispatch adapter: query parameters -> poll session -> transport bytes.
//!
//! Resolves the session mode once per request, applies lenient defaults to
//! the `timeout`/`interval` parameters, and bridges session output to the
//! transport: a single buffered JSON document for long-poll, incremental
//! SSE records for streaming. The streaming session runs in a spawned task
//! behind a bounded channel; the response body is the receiver side, so a
//! disconnected client fails the session's next send.

use std::convert::Infallible;
use std::time::Instant;

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json, Response};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::sync::OwnedSemaphorePermit;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;

use pollpulse_core::wire::{StreamEvent, WaitReply};
use pollpulse_core::{
    EmittedMessage, EventSink, PollConfig, PollError, PollMode, PollSession, Result,
};

use crate::app_state::AppState;
use crate::config::PollSection;
use crate::obs::ActiveSession;

// --------------------
// Query parsing
// --------------------

/// Raw query parameters. Values stay `String` so that unparsable input
/// falls back to the documented defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PollQuery {
    pub timeout: Option<String>,
    pub interval: Option<String>,
    pub mode: Option<String>,
}

fn parse_ms(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.parse::<u64>().ok()).unwrap_or(default)
}

/// Like `parse_ms`, but a zero value also falls back: the `interval > 0`
/// invariant must hold for every stream session.
fn parse_interval_ms(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

/// Resolve the request into a session config. Mode is decided exactly once:
/// `/sse` forces streaming; `/poll` streams on an explicit `mode=stream` or
/// when an `interval` parameter is present, and long-polls otherwise.
fn resolve_config(q: &PollQuery, defaults: &PollSection, force_stream: bool) -> PollConfig {
    let total_ms = parse_ms(q.timeout.as_deref(), defaults.default_timeout_ms);
    let interval_ms = parse_interval_ms(q.interval.as_deref(), defaults.default_interval_ms);

    let mode = if force_stream {
        PollMode::Stream
    } else {
        match q.mode.as_deref() {
            Some("stream") => PollMode::Stream,
            Some("wait") => PollMode::Wait,
            _ if q.interval.is_some() => PollMode::Stream,
            _ => PollMode::Wait,
        }
    };

    PollConfig {
        mode,
        total_ms,
        interval_ms,
    }
}

// --------------------
// Handlers
// --------------------

pub async fn poll(State(app): State<AppState>, Query(q): Query<PollQuery>) -> Response {
    let cfg = resolve_config(&q, &app.cfg().poll, false);
    run_session(app, cfg).await
}

pub async fn sse(State(app): State<AppState>, Query(q): Query<PollQuery>) -> Response {
    let cfg = resolve_config(&q, &app.cfg().poll, true);
    run_session(app, cfg).await
}

async fn run_session(app: AppState, cfg: PollConfig) -> Response {
    let Some(permit) = app.try_begin_session() else {
        app.metrics()
            .capacity_rejections
            .inc(&[("mode", cfg.mode.as_str())]);
        tracing::warn!(mode = cfg.mode.as_str(), "session limit reached");
        return error_response(PollError::CapacityExceeded);
    };

    match cfg.mode {
        PollMode::Wait => long_poll(app, cfg, permit).await,
        PollMode::Stream => stream(app, cfg, permit),
    }
}

/// Wait the full duration on the request task, then reply once. A client
/// that disconnects mid-wait cancels the handler future; the permit and
/// timer registration are released by drop.
async fn long_poll(app: AppState, cfg: PollConfig, permit: OwnedSemaphorePermit) -> Response {
    let mut session = match PollSession::new(cfg, app.timer(), app.observer()) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    // Gauge slot released on any exit, including a dropped handler future
    // when the client disconnects mid-wait.
    let _active = ActiveSession::begin(app.metrics(), "wait");
    let started = Instant::now();
    let msg = session.run_wait().await;
    app.metrics()
        .session_duration
        .observe(&[("mode", "wait")], started.elapsed());
    drop(permit);

    Json(WaitReply::from_message(&msg)).into_response()
}

/// Spawn the session behind a bounded channel and stream the receiver out
/// as SSE. Completion drops the sender, which ends the stream and finalizes
/// the response exactly once; a gone client drops the receiver, which fails
/// the session's next send within one tick.
fn stream(app: AppState, cfg: PollConfig, permit: OwnedSemaphorePermit) -> Response {
    let span = tracing::info_span!(
        "poll_session",
        mode = "stream",
        timeout_ms = cfg.total_ms,
        interval_ms = cfg.interval_ms,
    );
    let session = match PollSession::new(cfg, app.timer(), app.observer()) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    // Capacity 1: at most one frame in flight, each tick is flushed to the
    // transport before the next wait begins.
    let (tx, rx) = mpsc::channel::<EmittedMessage>(1);
    let metrics = app.metrics();
    let active = ActiveSession::begin(app.metrics(), "stream");
    tokio::spawn(
        async move {
            let _active = active;
            let mut session = session;
            let mut sink = ChannelSink { tx };
            let started = Instant::now();
            session.run_stream(&mut sink).await;
            metrics
                .session_duration
                .observe(&[("mode", "stream")], started.elapsed());
            drop(permit);
        }
        .instrument(span),
    );

    let events = ReceiverStream::new(rx).map(|msg| {
        let data = serde_json::to_string(&StreamEvent::from_message(&msg))
            .unwrap_or_else(|_| "{}".into());
        Ok::<_, Infallible>(Event::default().event("message").data(data))
    });

    let mut resp = Sse::new(events).keep_alive(KeepAlive::default()).into_response();
    let headers = resp.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    resp
}

fn error_response(e: PollError) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, e.to_string()).into_response()
}

// --------------------
// Transport bridge
// --------------------

struct ChannelSink {
    tx: mpsc::Sender<EmittedMessage>,
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn emit(&mut self, msg: &EmittedMessage) -> Result<()> {
        self.tx
            .send(msg.clone())
            .await
            .map_err(|_| PollError::TransportClosed)
    }
}
