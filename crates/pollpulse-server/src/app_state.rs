//! Shared application state for the poll server.
//!
//! Cheap to clone (`Arc` inner). Holds the config, the metrics registry,
//! and the timer/observer capabilities handed to every session. Sessions
//! themselves share nothing with each other; the only cross-request
//! coordination is the max-sessions semaphore.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use pollpulse_core::{PollObserver, Timer};

use crate::config::ServerConfig;
use crate::obs::{PollMetrics, ServerObserver};
use crate::timer::TokioTimer;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    metrics: Arc<PollMetrics>,
    timer: Arc<dyn Timer>,
    observer: Arc<dyn PollObserver>,
    session_permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(cfg: ServerConfig) -> Self {
        let metrics = Arc::new(PollMetrics::default());
        let observer = Arc::new(ServerObserver::new(Arc::clone(&metrics)));
        let session_permits = Arc::new(Semaphore::new(cfg.server.max_sessions));
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                metrics,
                timer: Arc::new(TokioTimer),
                observer,
                session_permits,
            }),
        }
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<PollMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn timer(&self) -> Arc<dyn Timer> {
        Arc::clone(&self.inner.timer)
    }

    pub fn observer(&self) -> Arc<dyn PollObserver> {
        Arc::clone(&self.inner.observer)
    }

    /// Claim a session slot. `None` means the server is at capacity; the
    /// caller answers 503 without constructing a session. The permit is
    /// owned by the session's handling context and released on any exit
    /// path, including abort and task drop.
    pub fn try_begin_session(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.inner.session_permits).try_acquire_owned().ok()
    }
}
