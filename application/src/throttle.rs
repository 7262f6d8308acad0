use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Shared minimum-interval gate in front of the upstream provider. One
/// instance for the whole process; every upstream attempt must pass through
/// `acquire`, whichever key it is for.
///
/// The mutex is held across the wait on purpose: callers are serialized for
/// the full wait, not just the timestamp update, which is what enforces the
/// spacing between call starts. Wakeup order is whatever the mutex provides;
/// callers must not rely on strict FIFO fairness. This spaces call
/// initiations only; it is not a token bucket and ignores how long the
/// upstream call itself takes.
pub struct CallSpacer {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl CallSpacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until at least `min_interval` has elapsed since the previously
    /// granted slot, then record and return the new grant time. A caller
    /// dropped mid-wait releases the mutex and does not stall the queue.
    pub async fn acquire(&self) -> Instant {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            tokio::time::sleep_until(previous + self.min_interval).await;
        }
        let granted = Instant::now();
        *last_call = Some(granted);
        granted
    }
}
