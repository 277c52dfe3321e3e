//! Download reservation store — a pseudo-semaphore over an expiring map.
//!
//! One entry per in-flight update download, keyed by the caller-supplied
//! download id. A true semaphore is the wrong tool here: a crashed or
//! disconnected client must not hold a slot forever, so every entry
//! carries a TTL and the store reclaims it with or without an explicit
//! release.
//!
//! Expiry has three triggers:
//!   - lazy purge on access (`count` always evaluates expiry first)
//!   - a detached timer per entry firing at `ttl + 15s`
//!   - an optional background sweeper (`spawn_sweeper`)
//!
//! Any one of them is sufficient; together they bound a reservation's
//! lifetime at `ttl + 15s` even if nobody ever reads the store again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

/// Grace period added to the TTL for the secondary (timer-based) expiry
/// signal. The lazy purge fires at the TTL itself; the timer is the
/// backstop for a store nobody reads.
pub const EXPIRY_GRACE: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
struct Reservation {
    reserved_at: Instant,
    expires_at: Instant,
    /// Guards the detached expiry timer: a stale timer from a released
    /// reservation must not evict a newer one reusing the same id.
    generation: u64,
}

/// Process-wide store of in-flight download reservations.
///
/// Cloning is cheap and every clone observes the same entries. The
/// dashmap's internal sharded locking is the only synchronization.
#[derive(Clone, Default, Debug)]
pub struct ReservationStore {
    entries: Arc<DashMap<String, Reservation>>,
    generation: Arc<AtomicU64>,
}

impl ReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) reservations.
    ///
    /// Counting purges expired entries first — eviction here is lazy,
    /// triggered by access, so the count is authoritative at the moment
    /// it is taken.
    pub fn count(&self) -> usize {
        self.purge_expired();
        self.entries.len()
    }

    /// Insert a reservation for `id` with the given TTL.
    ///
    /// Inside a tokio runtime a detached timer also removes the entry at
    /// `ttl + 15s`; outside one, the lazy purge and the sweeper still
    /// reclaim it.
    pub fn reserve(&self, id: &str, ttl: Duration) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();
        self.entries.insert(
            id.to_string(),
            Reservation {
                reserved_at: now,
                expires_at: now + ttl,
                generation,
            },
        );

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let store = self.clone();
            let id = id.to_string();
            handle.spawn(async move {
                tokio::time::sleep(ttl + EXPIRY_GRACE).await;
                if store.remove_if_generation(&id, generation) {
                    tracing::debug!(id, "reservation reclaimed by expiry timer");
                }
            });
        }
    }

    /// Remove the reservation for `id`. Idempotent — releasing an
    /// unknown or already-released id is a no-op, never an error.
    pub fn release(&self, id: &str) {
        self.entries.remove(id);
    }

    /// Is `id` currently reserved and unexpired?
    pub fn contains(&self, id: &str) -> bool {
        self.purge_expired();
        self.entries.contains_key(id)
    }

    /// How long the reservation for `id` has existed, if it is live.
    pub fn age(&self, id: &str) -> Option<Duration> {
        self.purge_expired();
        self.entries.get(id).map(|r| r.reserved_at.elapsed())
    }

    /// Drop every entry whose absolute deadline has passed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, r| now < r.expires_at);
    }

    /// Spawn a background task purging expired entries every `interval`,
    /// so slot accounting does not depend on incidental reads.
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.purge_expired();
            }
        })
    }

    fn remove_if_generation(&self, id: &str, generation: u64) -> bool {
        self.entries
            .remove_if(id, |_, r| r.generation == generation)
            .is_some()
    }
}
