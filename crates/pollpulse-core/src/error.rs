//! Shared error type across pollpulse crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, PollError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The transport rejected a write; the client is gone. Never surfaced to
    /// a caller (there is none left), only logged.
    #[error("transport closed")]
    TransportClosed,
    #[error("session limit reached")]
    CapacityExceeded,
    #[error("internal: {0}")]
    Internal(String),
}

impl PollError {
    /// Map to a stable HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            PollError::BadRequest(_) => 400,
            PollError::CapacityExceeded => 503,
            PollError::TransportClosed | PollError::Internal(_) => 500,
        }
    }
}
