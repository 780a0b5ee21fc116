//! Single-slot upstream response cache.
//!
//! Stores the most recently fetched flight-state snapshot. Readers
//! within the freshness window are answered without touching upstream;
//! after a failed fetch the entry doubles as a degraded fallback
//! regardless of age.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde_json::Value;

/// One cached upstream payload and when it was stored.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// Upstream JSON body, shared between the slot and readers.
    pub payload: Arc<Value>,
    /// Wall-clock store time in epoch milliseconds, reported to clients.
    pub cached_at_ms: u64,
    /// Monotonic store time, drives the freshness check.
    fetched_at: Instant,
}

impl CachedResponse {
    /// Time elapsed since the entry was stored.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    /// Fresh iff strictly younger than `window`.
    pub fn is_fresh(&self, now: Instant, window: Duration) -> bool {
        self.age(now) < window
    }
}

/// Holds at most one snapshot of the upstream resource.
///
/// There is no per-query keying: requests with different query filters
/// share the slot, so a filtered query can be answered from a snapshot
/// stored by a differently filtered one. Coarse granularity is a known
/// limitation of the single-resource design, kept intentionally.
#[derive(Clone, Default)]
pub struct ResponseCache {
    slot: Arc<RwLock<Option<CachedResponse>>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached entry if it is still within `window`.
    pub fn fresh(&self, now: Instant, window: Duration) -> Option<CachedResponse> {
        self.slot
            .read()
            .expect("response cache lock poisoned")
            .as_ref()
            .filter(|entry| entry.is_fresh(now, window))
            .cloned()
    }

    /// The cached entry regardless of age, for stale fallback.
    pub fn any(&self) -> Option<CachedResponse> {
        self.slot
            .read()
            .expect("response cache lock poisoned")
            .clone()
    }

    /// Overwrites the slot with a freshly fetched payload.
    ///
    /// Only called after a successful upstream fetch; failures never
    /// touch the slot.
    pub fn store(&self, payload: Value) -> CachedResponse {
        let entry = CachedResponse {
            payload: Arc::new(payload),
            cached_at_ms: epoch_ms(),
            fetched_at: Instant::now(),
        };
        *self.slot.write().expect("response cache lock poisoned") = Some(entry.clone());
        entry
    }
}

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
