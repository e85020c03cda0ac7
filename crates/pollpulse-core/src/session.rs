//! Poll session state machine.
//!
//! One session per request, owned exclusively by the request's handling
//! context. The session produces a bounded sequence of timestamped messages
//! through an [`EventSink`], paced by a [`Timer`], and terminates exactly
//! once: `Completed` when the requested duration is exhausted, `Aborted`
//! when a sink write fails. Disconnect detection is purely a side effect of
//! the next write attempt; nothing polls the transport proactively.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::error::{PollError, Result};
use crate::observer::PollObserver;
use crate::timer::Timer;

/// How a session delivers its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Wait the full duration, then produce a single buffered reply.
    Wait,
    /// Emit one framed message per tick over a live stream.
    Stream,
}

impl PollMode {
    /// Stable label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            PollMode::Wait => "wait",
            PollMode::Stream => "stream",
        }
    }
}

/// Resolved per-request session parameters.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub mode: PollMode,
    /// Total requested duration in milliseconds. Zero is valid: a stream
    /// session emits nothing, a wait session replies immediately.
    pub total_ms: u64,
    /// Tick spacing in milliseconds. Only meaningful in `Stream` mode,
    /// where it must be positive.
    pub interval_ms: u64,
}

impl PollConfig {
    pub fn validate(&self) -> Result<()> {
        if self.mode == PollMode::Stream && self.interval_ms == 0 {
            return Err(PollError::BadRequest(
                "interval_ms must be positive in stream mode".into(),
            ));
        }
        Ok(())
    }
}

/// Session lifecycle. `Completed` and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Running,
    Completed,
    Aborted,
}

/// One unit of session output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedMessage {
    pub text: String,
    /// Wall-clock epoch milliseconds, captured at emission.
    pub timestamp_ms: u64,
    /// Logical progress: accumulated interval ticks, not wall time.
    pub elapsed_ms: u64,
}

/// Write side of the transport bridge.
///
/// `emit` must resolve only once the message has been handed to the
/// transport; an `Err` means the client is gone and aborts the session.
#[async_trait]
pub trait EventSink: Send {
    async fn emit(&mut self, msg: &EmittedMessage) -> Result<()>;
}

/// The live unit of work for one request.
pub struct PollSession {
    cfg: PollConfig,
    elapsed_ms: u64,
    state: SessionState,
    timer: Arc<dyn Timer>,
    observer: Arc<dyn PollObserver>,
}

// Manual impl: the timer/observer capabilities are trait objects with no
// `Debug` bound of their own.
impl fmt::Debug for PollSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollSession")
            .field("cfg", &self.cfg)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl PollSession {
    pub fn new(
        cfg: PollConfig,
        timer: Arc<dyn Timer>,
        observer: Arc<dyn PollObserver>,
    ) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            elapsed_ms: 0,
            state: SessionState::Created,
            timer,
            observer,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Logical elapsed time. Accumulates by `interval_ms` per tick, so it
    /// drifts from wall time by the per-tick scheduling overhead. Accepted.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn config(&self) -> &PollConfig {
        &self.cfg
    }

    /// Run a `Stream` session to a terminal state.
    ///
    /// Emits one message per tick while `elapsed_ms < total_ms` (the guard
    /// is checked strictly before each emission, so no message ever carries
    /// `elapsed >= total`). A failed emission aborts immediately: no elapsed
    /// increment, no further wait, no further writes.
    pub async fn run_stream<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> SessionState {
        self.state = SessionState::Running;
        self.observer.session_started(&self.cfg);

        while self.elapsed_ms < self.cfg.total_ms {
            let msg = EmittedMessage {
                text: format!("Message at {}ms", self.elapsed_ms),
                timestamp_ms: now_epoch_ms(),
                elapsed_ms: self.elapsed_ms,
            };
            if let Err(e) = sink.emit(&msg).await {
                tracing::debug!(elapsed_ms = self.elapsed_ms, error = %e, "emit failed, aborting session");
                self.state = SessionState::Aborted;
                self.observer.session_aborted(&self.cfg, self.elapsed_ms);
                return self.state;
            }
            self.observer.message_emitted(&self.cfg, &msg);

            self.timer
                .after(Duration::from_millis(self.cfg.interval_ms))
                .await;
            self.elapsed_ms += self.cfg.interval_ms;
        }

        self.state = SessionState::Completed;
        self.observer.session_completed(&self.cfg, self.elapsed_ms);
        self.state
    }

    /// Run a `Wait` session: one unconditional wait for the full duration,
    /// then exactly one message. No writes happen during the wait, so there
    /// is no early exit on disconnect.
    pub async fn run_wait(&mut self) -> EmittedMessage {
        self.state = SessionState::Running;
        self.observer.session_started(&self.cfg);

        self.timer
            .after(Duration::from_millis(self.cfg.total_ms))
            .await;
        self.elapsed_ms = self.cfg.total_ms;

        let msg = EmittedMessage {
            text: "Long poll completed".into(),
            timestamp_ms: now_epoch_ms(),
            elapsed_ms: self.elapsed_ms,
        };
        self.observer.message_emitted(&self.cfg, &msg);

        self.state = SessionState::Completed;
        self.observer.session_completed(&self.cfg, self.elapsed_ms);
        msg
    }
}

/// Wall-clock epoch milliseconds.
fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}
