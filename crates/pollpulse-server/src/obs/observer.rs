//! Bridges session lifecycle hooks into tracing and metrics.

use std::sync::Arc;

use pollpulse_core::{EmittedMessage, PollConfig, PollObserver};

use crate::obs::metrics::PollMetrics;

/// The server's `PollObserver`: structured log events plus counter updates
/// at session start, per emission, on abort, and on completion. Hooks are
/// infallible, so nothing here can interfere with a running session.
///
/// The `sessions_active` gauge is deliberately not touched here: a request
/// future dropped mid-session never reaches a terminal hook, so the gauge
/// lives in an RAII guard ([`crate::obs::ActiveSession`]) owned by the
/// handling context instead.
pub struct ServerObserver {
    metrics: Arc<PollMetrics>,
}

impl ServerObserver {
    pub fn new(metrics: Arc<PollMetrics>) -> Self {
        Self { metrics }
    }
}

impl PollObserver for ServerObserver {
    fn session_started(&self, cfg: &PollConfig) {
        let mode = cfg.mode.as_str();
        tracing::info!(
            mode,
            timeout_ms = cfg.total_ms,
            interval_ms = cfg.interval_ms,
            "poll session started"
        );
        self.metrics.sessions_started.inc(&[("mode", mode)]);
    }

    fn message_emitted(&self, cfg: &PollConfig, msg: &EmittedMessage) {
        let mode = cfg.mode.as_str();
        tracing::debug!(mode, elapsed_ms = msg.elapsed_ms, "message emitted");
        self.metrics.messages_emitted.inc(&[("mode", mode)]);
    }

    fn session_aborted(&self, cfg: &PollConfig, elapsed_ms: u64) {
        let mode = cfg.mode.as_str();
        tracing::info!(mode, elapsed_ms, "client gone, session aborted");
        self.metrics
            .session_outcomes
            .inc(&[("mode", mode), ("outcome", "aborted")]);
    }

    fn session_completed(&self, cfg: &PollConfig, elapsed_ms: u64) {
        let mode = cfg.mode.as_str();
        tracing::info!(mode, elapsed_ms, "poll session completed");
        self.metrics
            .session_outcomes
            .inc(&[("mode", mode), ("outcome", "completed")]);
    }
}
