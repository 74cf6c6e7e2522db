/*!
 * Global request pacing.
 *
 * One `RequestPacer` is shared by every worker so the configured delay holds
 * between any two provider calls, not just calls from the same file.
 */

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between provider requests
#[derive(Debug, Clone)]
pub struct RequestPacer {
    interval: Duration,
    /// When the next request may start; `None` before the first one
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// A pacer that never waits
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for this caller's slot
    ///
    /// The lock is held while sleeping, so waiters are served one interval
    /// apart in arrival order.
    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }

        let mut next_slot = self.next_slot.lock().await;
        if let Some(slot) = *next_slot {
            if slot > Instant::now() {
                tokio::time::sleep_until(slot).await;
            }
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::unlimited()
    }
}
