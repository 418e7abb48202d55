//! Statistics for the synthetic response store

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque payload type served by the default store
pub type Payload = serde_json::Value;

/// Point-in-time statistics of a fake store
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FakeStats {
    /// Lookups answered with a live synthetic response
    pub hits: u64,

    /// Lookups that found nothing live
    pub misses: u64,

    /// Successful `set` calls
    pub sets: u64,

    /// `set` calls that replaced an existing entry
    pub overwrites: u64,

    /// Entries deleted by `remove` or `clear`
    pub removals: u64,

    /// Expired entries removed by lazy eviction
    pub evictions_lazy: u64,

    /// Expired entries removed by a sweep
    pub evictions_swept: u64,

    /// Entries currently held, live or not yet reclaimed
    pub entries: usize,
}

impl FakeStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    pub fn miss_rate(&self) -> f64 {
        100.0 - self.hit_rate()
    }

    /// Expired entries reclaimed by any mechanism
    pub fn total_evictions(&self) -> u64 {
        self.evictions_lazy + self.evictions_swept
    }
}

impl fmt::Display for FakeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FakeStats {{ hits: {}, misses: {}, hit_rate: {:.2}%, entries: {}, sets: {}, \
             evictions: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.entries,
            self.sets,
            self.total_evictions()
        )
    }
}

/// Lock-free counters; lookups only hold the read lock
#[derive(Debug, Default)]
pub(crate) struct StoreCounters {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub sets: AtomicU64,
    pub overwrites: AtomicU64,
    pub removals: AtomicU64,
    pub evictions_lazy: AtomicU64,
    pub evictions_swept: AtomicU64,
}

impl StoreCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self, entries: usize) -> FakeStats {
        FakeStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            overwrites: self.overwrites.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            evictions_lazy: self.evictions_lazy.load(Ordering::Relaxed),
            evictions_swept: self.evictions_swept.load(Ordering::Relaxed),
            entries,
        }
    }
}
