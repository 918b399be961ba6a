//! Per-destination probe admission.
//!
//! A fixed-interval debounce keyed by destination IP: a destination is
//! admitted at most once per `min_interval`. There is no burst allowance and
//! no decay. The read-decide-write sequence runs inside a single critical
//! section so two concurrent senders for the same destination cannot both be
//! admitted.

use lru::LruCache;
use std::collections::HashMap;
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Decides whether a probe towards `dst` may fire now.
///
/// Implementations must make `admit` atomic per key: check and conditional
/// update happen under the same lock.
pub trait AdmissionGate: Send + Sync {
    /// Returns `true` and records the admission, or `false` without mutation.
    fn admit(&self, dst: IpAddr) -> bool;
}

impl<G: AdmissionGate + ?Sized> AdmissionGate for Arc<G> {
    fn admit(&self, dst: IpAddr) -> bool {
        (**self).admit(dst)
    }
}

impl<G: AdmissionGate + ?Sized> AdmissionGate for Box<G> {
    fn admit(&self, dst: IpAddr) -> bool {
        (**self).admit(dst)
    }
}

/// `true` when a key last fired at `last` may fire again at `now`.
#[inline]
fn interval_elapsed(last: Option<Instant>, now: Instant, min_interval: Duration) -> bool {
    match last {
        None => true,
        Some(last) => now.saturating_duration_since(last) >= min_interval,
    }
}

/// Recover the guard from a poisoned lock; admission state is a plain map
/// of timestamps and stays consistent even if a holder panicked.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ─── Unbounded ledger ────────────────────────────────────────────────────────

/// Interval limiter over an unbounded `destination -> last fired` ledger.
///
/// The ledger holds one entry per destination ever admitted and is never
/// trimmed on its own. Destination cardinality is bounded by the number of
/// configured peers; long-lived processes talking to churning peers can call
/// [`IntervalLimiter::purge_stale`] or use [`LruIntervalLimiter`].
#[derive(Debug)]
pub struct IntervalLimiter {
    min_interval: Duration,
    last_sent: Mutex<HashMap<IpAddr, Instant>>,
}

impl IntervalLimiter {
    /// Limiter admitting each destination at most once per `min_interval`.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_sent: Mutex::new(HashMap::new()),
        }
    }

    /// Minimum spacing between admissions for one destination.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Number of destinations currently in the ledger.
    pub fn tracked(&self) -> usize {
        lock(&self.last_sent).len()
    }

    /// Drop ledger entries that last fired more than `max_age` ago.
    /// Returns the number of entries removed.
    ///
    /// Purging an entry younger than `min_interval` would let that
    /// destination fire early, so `max_age` is raised to `min_interval`.
    pub fn purge_stale(&self, max_age: Duration) -> usize {
        let max_age = max_age.max(self.min_interval);
        let now = Instant::now();
        let mut ledger = lock(&self.last_sent);
        let before = ledger.len();
        ledger.retain(|_, last| now.saturating_duration_since(*last) < max_age);
        let removed = before - ledger.len();
        if removed > 0 {
            log::debug!("Purged {} stale preflight ledger entries", removed);
        }
        removed
    }
}

impl AdmissionGate for IntervalLimiter {
    fn admit(&self, dst: IpAddr) -> bool {
        let now = Instant::now();
        let mut ledger = lock(&self.last_sent);
        if !interval_elapsed(ledger.get(&dst).copied(), now, self.min_interval) {
            return false;
        }
        ledger.insert(dst, now);
        true
    }
}

// ─── Bounded ledger ──────────────────────────────────────────────────────────

/// Interval limiter whose ledger is capped at `capacity` destinations.
///
/// Identical to [`IntervalLimiter`] until the cap is hit; then the least
/// recently admitted destination is evicted and, if seen again, is treated as
/// never fired.
#[derive(Debug)]
pub struct LruIntervalLimiter {
    min_interval: Duration,
    last_sent: Mutex<LruCache<IpAddr, Instant>>,
}

impl LruIntervalLimiter {
    /// A zero `capacity` is raised to one.
    pub fn new(min_interval: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            min_interval,
            last_sent: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of destinations currently in the ledger.
    pub fn tracked(&self) -> usize {
        lock(&self.last_sent).len()
    }

    /// Maximum number of destinations the ledger holds.
    pub fn capacity(&self) -> usize {
        lock(&self.last_sent).cap().get()
    }
}

impl AdmissionGate for LruIntervalLimiter {
    fn admit(&self, dst: IpAddr) -> bool {
        let now = Instant::now();
        let mut ledger = lock(&self.last_sent);
        // peek: a rejected admission must not refresh the key's LRU position
        if !interval_elapsed(ledger.peek(&dst).copied(), now, self.min_interval) {
            return false;
        }
        ledger.put(dst, now);
        true
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
