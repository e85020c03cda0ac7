//! Wire body field-name tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use pollpulse_core::wire::{StreamEvent, WaitReply};
use pollpulse_core::EmittedMessage;

#[test]
fn stream_event_field_names() {
    let ev = StreamEvent::from_message(&EmittedMessage {
        text: "Message at 500ms".into(),
        timestamp_ms: 1_700_000_000_123,
        elapsed_ms: 500,
    });
    let v: serde_json::Value = serde_json::to_value(&ev).unwrap();

    assert_eq!(v["message"], "Message at 500ms");
    assert_eq!(v["timestamp"], 1_700_000_000_123u64);
    assert_eq!(v["elapsed"], 500);
    assert_eq!(v.as_object().unwrap().len(), 3);
}

#[test]
fn wait_reply_field_names() {
    let reply = WaitReply::from_message(&EmittedMessage {
        text: "Long poll completed".into(),
        timestamp_ms: 1_700_000_000_456,
        elapsed_ms: 10_000,
    });
    let v: serde_json::Value = serde_json::to_value(&reply).unwrap();

    assert_eq!(v["message"], "Long poll completed");
    assert_eq!(v["timestamp"], 1_700_000_000_456u64);
    assert_eq!(v["timeout"], 10_000);
    assert_eq!(v.as_object().unwrap().len(), 3);
}

#[test]
fn stream_event_round_trips() {
    let s = r#"{"message":"Message at 0ms","timestamp":123,"elapsed":0}"#;
    let ev: StreamEvent = serde_json::from_str(s).unwrap();
    assert_eq!(ev.elapsed, 0);
    assert_eq!(ev.message, "Message at 0ms");
}
