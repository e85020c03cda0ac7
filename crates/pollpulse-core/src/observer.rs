//! Observability seam for poll sessions.
//!
//! The session reports lifecycle hooks to an injected [`PollObserver`]
//! rather than to process-wide singletons. Hooks are infallible by
//! signature: an observer cannot abort a session, which is the contract the
//! engine needs ("always available, failures ignored") enforced by
//! construction. Implementations must not panic.

use crate::session::{EmittedMessage, PollConfig};

/// Lifecycle hooks reported by a [`crate::session::PollSession`].
pub trait PollObserver: Send + Sync {
    /// Called once, when the session enters `Running`.
    fn session_started(&self, cfg: &PollConfig);
    /// Called after each successful emission.
    fn message_emitted(&self, cfg: &PollConfig, msg: &EmittedMessage);
    /// Called when a transport write fails and the session aborts.
    fn session_aborted(&self, cfg: &PollConfig, elapsed_ms: u64);
    /// Called when the session runs its full duration.
    fn session_completed(&self, cfg: &PollConfig, elapsed_ms: u64);
}

/// Observer that discards everything. Default for tests and embedding.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PollObserver for NoopObserver {
    fn session_started(&self, _cfg: &PollConfig) {}
    fn message_emitted(&self, _cfg: &PollConfig, _msg: &EmittedMessage) {}
    fn session_aborted(&self, _cfg: &PollConfig, _elapsed_ms: u64) {}
    fn session_completed(&self, _cfg: &PollConfig, _elapsed_ms: u64) {}
}
