//! Tokio-backed timer.

use std::time::Duration;

use async_trait::async_trait;

use pollpulse_core::Timer;

/// `Timer` impl over `tokio::time::sleep`. Dropping the pending future
/// deregisters the wakeup, which is exactly the cancellation contract the
/// session needs on teardown.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn after(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
