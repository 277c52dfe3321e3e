//! Admission gate — bounds how many update downloads run at once.
//!
//! Waiters poll the shared [`ReservationStore`] with randomized jitter
//! rather than queueing on a semaphore: grant order is whoever observes
//! a free slot first, deliberately not FIFO. The jitter spreads retries
//! from a thundering herd of agents across the window.

use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

use crate::reservations::ReservationStore;

/// Bounds for the randomized retry sleep while waiting for a slot.
const POLL_MIN: Duration = Duration::from_millis(100);
const POLL_MAX: Duration = Duration::from_millis(10_000);

#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("no download slot freed within {0:?}")]
    WaitTimeout(Duration),
}

/// Grants download slots against a shared reservation store.
#[derive(Clone)]
pub struct AdmissionGate {
    store: ReservationStore,
    max_concurrent: usize,
    max_wait: Option<Duration>,
}

impl AdmissionGate {
    /// A gate that waits indefinitely for a slot.
    pub fn new(store: ReservationStore, max_concurrent: usize) -> Self {
        Self {
            store,
            max_concurrent,
            max_wait: None,
        }
    }

    /// Bound the total wait. `None` waits forever.
    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn store(&self) -> &ReservationStore {
        &self.store
    }

    /// Wait for a free slot, then reserve it for `id` with the given TTL.
    ///
    /// Cancel-safe: dropping the future before it resolves reserves
    /// nothing. The returned guard releases the reservation when
    /// dropped; call [`SlotGuard::keep`] once the download is underway
    /// to leave the slot held until the client clears it or the TTL
    /// runs out.
    pub async fn acquire(&self, id: &str, ttl: Duration) -> Result<SlotGuard, AdmissionError> {
        let started = Instant::now();
        let deadline = self.max_wait.map(|w| started + w);

        while self.store.count() >= self.max_concurrent {
            let mut wait = poll_jitter();
            if let Some(deadline) = deadline {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(AdmissionError::WaitTimeout(
                        self.max_wait.unwrap_or_default(),
                    ));
                }
                wait = wait.min(remaining);
            }
            tokio::time::sleep(wait).await;
        }

        self.store.reserve(id, ttl);
        Ok(SlotGuard {
            store: self.store.clone(),
            id: id.to_string(),
            waited: started.elapsed(),
            armed: true,
        })
    }
}

fn poll_jitter() -> Duration {
    // rng is dropped before the caller awaits; ThreadRng is not Send.
    let ms = rand::thread_rng().gen_range(POLL_MIN.as_millis()..POLL_MAX.as_millis());
    Duration::from_millis(ms as u64)
}

/// A granted download slot.
///
/// Dropping the guard releases the reservation, which covers every
/// early-exit path after admission (unknown platform, open failure,
/// panic). The one path that must not release — a download successfully
/// handed to the client — calls [`SlotGuard::keep`].
#[derive(Debug)]
pub struct SlotGuard {
    store: ReservationStore,
    id: String,
    waited: Duration,
    armed: bool,
}

impl SlotGuard {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// How long admission waited before this slot was granted.
    pub fn waited(&self) -> Duration {
        self.waited
    }

    /// Disarm the guard, leaving the reservation in the store.
    pub fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if self.armed {
            self.store.release(&self.id);
        }
    }
}
