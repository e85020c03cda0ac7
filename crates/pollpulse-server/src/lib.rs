//! pollpulse server library entry.
//!
//! Wires the poll engine from `pollpulse-core` into an axum HTTP surface:
//! router, config loader, dispatch adapter (long-poll JSON vs. SSE
//! streaming), tokio timer, and the observability stack (tracing observer +
//! in-process metrics). Consumed by the binary (`main.rs`) and by the
//! integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod router;
pub mod timer;
