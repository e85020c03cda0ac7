//! pollpulse core: the streaming poll engine.
//!
//! This crate defines the session state machine, the timer/sink/observer
//! seams, the wire-level reply types, and the shared error surface. It
//! intentionally carries no transport or runtime dependencies so the engine
//! can be driven by any executor and tested without a server.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `PollError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod observer;
pub mod session;
pub mod timer;
pub mod wire;

/// Shared result type.
pub use error::{PollError, Result};
pub use observer::{NoopObserver, PollObserver};
pub use session::{EmittedMessage, EventSink, PollConfig, PollMode, PollSession, SessionState};
pub use timer::Timer;
