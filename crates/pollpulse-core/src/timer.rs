//! Timer seam for the poll engine.

use std::time::Duration;

use async_trait::async_trait;

/// One-shot wakeup scheduler.
///
/// `after` resolves once at least `duration` has elapsed. Each tick schedules
/// its next wait independently, so no drift correction accumulates across a
/// session. Cancellation is by drop: a pending `after` future that is dropped
/// must release its registration immediately, so tearing down a session never
/// leaves an orphaned wakeup behind.
#[async_trait]
pub trait Timer: Send + Sync {
    async fn after(&self, duration: Duration);
}
