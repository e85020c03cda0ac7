//! Observability: in-process metrics and the session observer bridge.
//!
//! The metrics registry is dependency-free (atomics behind `DashMap`),
//! rendered in Prometheus text format by the `/metrics` handler. The
//! observer bridges session lifecycle hooks into `tracing` events and
//! metric updates; it can never fail back into the session.

pub mod metrics;
pub mod observer;

pub use metrics::{ActiveSession, PollMetrics};
pub use observer::ServerObserver;
