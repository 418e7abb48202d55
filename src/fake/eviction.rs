//! Eviction reasons and events
//!
//! Entries leave the store through one of four doors: lazy eviction on an
//! expired read, a periodic sweep, an explicit remove, or a clear.

use crate::fake::key::FakeKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why entries were taken out of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionReason {
    /// Expired entry reclaimed after a read found it stale
    Expired,

    /// Expired entries reclaimed by the periodic sweeper
    Swept,

    /// Removed explicitly by key or descriptor
    Removed,

    /// Dropped by `clear` or session teardown
    Cleared,
}

impl std::fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionReason::Expired => write!(f, "lifetime expired"),
            EvictionReason::Swept => write!(f, "periodic sweep"),
            EvictionReason::Removed => write!(f, "explicit removal"),
            EvictionReason::Cleared => write!(f, "store cleared"),
        }
    }
}

/// Record of entries leaving the store, published by `FakeStore::subscribe`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvictionEvent {
    pub reason: EvictionReason,

    /// When the eviction happened
    pub timestamp: DateTime<Utc>,

    /// Keys that were evicted
    pub keys: Vec<FakeKey>,
}

impl EvictionEvent {
    pub fn new(reason: EvictionReason, keys: Vec<FakeKey>) -> Self {
        Self {
            reason,
            timestamp: Utc::now(),
            keys,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
