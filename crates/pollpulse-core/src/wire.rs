//! JSON reply bodies.
//!
//! Field names are part of the public HTTP contract and must not change:
//! streaming records carry `message`/`timestamp`/`elapsed`, the long-poll
//! reply carries `message`/`timestamp`/`timeout`.

use serde::{Deserialize, Serialize};

use crate::session::EmittedMessage;

/// One server-sent event payload (`data:` line of a `message` event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamEvent {
    pub message: String,
    /// Epoch milliseconds at emission.
    pub timestamp: u64,
    /// Logical elapsed milliseconds.
    pub elapsed: u64,
}

impl StreamEvent {
    pub fn from_message(msg: &EmittedMessage) -> Self {
        Self {
            message: msg.text.clone(),
            timestamp: msg.timestamp_ms,
            elapsed: msg.elapsed_ms,
        }
    }
}

/// The single buffered reply of a long-poll request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitReply {
    pub message: String,
    /// Epoch milliseconds at emission.
    pub timestamp: u64,
    /// The requested total duration, echoed back.
    pub timeout: u64,
}

impl WaitReply {
    pub fn from_message(msg: &EmittedMessage) -> Self {
        Self {
            message: msg.text.clone(),
            timestamp: msg.timestamp_ms,
            timeout: msg.elapsed_ms,
        }
    }
}
