//! Concurrent synthetic response store with lazy eviction

use crate::fake::{
    entry::{FakeEntry, Lifetime},
    eviction::{EvictionEvent, EvictionReason},
    key::{FakeKey, KeyDeriver, RequestDescriptor, StructuralKeyDeriver},
    types::{FakeStats, Payload, StoreCounters},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Eviction events buffered per subscriber before the oldest are dropped
const EVENT_CAPACITY: usize = 256;

/// Expiring key → payload map shared by all callers of a faking session
///
/// - Lookups hold the read lock only while inspecting the entry
/// - `set`, `remove`, `clear` and sweeps hold the write lock
/// - An expired entry found by a lookup is reported as a miss and handed
///   to a detached task that removes it after the read lock is gone
/// - Every removal is published as an [`EvictionEvent`] to subscribers
///
/// Cloning is cheap and yields a handle to the same entries.
pub struct FakeStore<V = Payload> {
    inner: Arc<StoreInner<V>>,
}

struct StoreInner<V> {
    /// Main storage: key -> entry
    entries: RwLock<HashMap<FakeKey, FakeEntry<V>>>,

    deriver: Arc<dyn KeyDeriver>,

    counters: StoreCounters,

    events: broadcast::Sender<EvictionEvent>,
}

enum Lookup<V> {
    Hit(V),
    Expired,
    Absent,
}

impl<V> Clone for FakeStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Default for FakeStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FakeStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty store using structural key derivation
    pub fn new() -> Self {
        Self::with_key_deriver(Arc::new(StructuralKeyDeriver))
    }

    /// Create an empty store with a custom key deriver
    pub fn with_key_deriver(deriver: Arc<dyn KeyDeriver>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                entries: RwLock::new(HashMap::new()),
                deriver,
                counters: StoreCounters::default(),
                events,
            }),
        }
    }

    /// Receive an event for every entry that leaves the store from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EvictionEvent> {
        self.inner.events.subscribe()
    }

    /// Canonical key this store uses for `descriptor`
    ///
    /// Prefer this over [`RequestDescriptor::key`], which always uses the
    /// structural deriver.
    pub fn key_for(&self, descriptor: &RequestDescriptor) -> FakeKey {
        self.inner.deriver.derive(descriptor)
    }

    /// Insert or overwrite the response for `descriptor`
    pub async fn set(
        &self,
        descriptor: &RequestDescriptor,
        payload: V,
        lifetime: Lifetime,
    ) -> FakeKey {
        let key = self.key_for(descriptor);
        self.set_by_key(key.clone(), payload, lifetime).await;
        key
    }

    /// Insert or overwrite the response stored under `key`
    pub async fn set_by_key(&self, key: FakeKey, payload: V, lifetime: Lifetime) {
        let entry = FakeEntry::new(payload, lifetime);
        let counters = &self.inner.counters;

        let mut entries = self.inner.entries.write().await;
        let lifetime = lifetime.as_duration();
        if entries.insert(key.clone(), entry).is_some() {
            debug!("Replaced synthetic response: {} (lifetime {:?})", key, lifetime);
            StoreCounters::bump(&counters.overwrites);
        } else {
            debug!("Stored synthetic response: {} (lifetime {:?})", key, lifetime);
        }
        StoreCounters::bump(&counters.sets);
    }

    /// Look up the live response for `descriptor`
    pub async fn get(&self, descriptor: &RequestDescriptor) -> Option<V> {
        let key = self.key_for(descriptor);
        self.get_by_key(&key).await
    }

    /// Look up the live response stored under `key`
    pub async fn get_by_key(&self, key: &FakeKey) -> Option<V> {
        let lookup = {
            let entries = self.inner.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live_at(Instant::now()) => {
                    Lookup::Hit(entry.payload.clone())
                }
                Some(_) => Lookup::Expired,
                None => Lookup::Absent,
            }
        };

        let counters = &self.inner.counters;
        match lookup {
            Lookup::Hit(payload) => {
                debug!("Synthetic response hit: {}", key);
                StoreCounters::bump(&counters.hits);
                Some(payload)
            }
            Lookup::Expired => {
                debug!("Synthetic response expired: {}", key);
                StoreCounters::bump(&counters.misses);
                self.schedule_eviction(key.clone());
                None
            }
            Lookup::Absent => {
                debug!("Synthetic response miss: {}", key);
                StoreCounters::bump(&counters.misses);
                None
            }
        }
    }

    /// Remove `key` if it is still expired
    ///
    /// Safe to run any number of times for the same key: an absent key or an
    /// entry refreshed by a later `set` is left alone.
    pub async fn evict_expired(&self, key: &FakeKey) -> bool {
        self.inner.evict_expired(key).await
    }

    /// Delete the entry under `key`; absent keys are a no-op
    pub async fn remove(&self, key: &FakeKey) -> bool {
        let removed = self.inner.entries.write().await.remove(key).is_some();
        if removed {
            StoreCounters::bump(&self.inner.counters.removals);
            debug!("Removed synthetic response: {}", key);
            self.inner.publish(EvictionEvent::new(EvictionReason::Removed, vec![key.clone()]));
        }
        removed
    }

    /// Delete the entry addressed by `descriptor`
    pub async fn remove_descriptor(&self, descriptor: &RequestDescriptor) -> bool {
        let key = self.key_for(descriptor);
        self.remove(&key).await
    }

    /// Remove every entry, returning how many were dropped
    pub async fn clear(&self) -> usize {
        let mut entries = self.inner.entries.write().await;
        let mut keys: Vec<FakeKey> = entries.drain().map(|(key, _)| key).collect();
        drop(entries);

        let count = keys.len();
        StoreCounters::add(&self.inner.counters.removals, count as u64);
        info!("Cleared {} synthetic responses", count);

        if !keys.is_empty() {
            keys.sort();
            self.inner.publish(EvictionEvent::new(EvictionReason::Cleared, keys));
        }
        count
    }

    /// Remove every expired entry in one pass
    pub async fn sweep_expired(&self) -> EvictionEvent {
        let mut entries = self.inner.entries.write().await;
        let now = Instant::now();

        let expired: Vec<FakeKey> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.remove(key);
        }
        drop(entries);

        if !expired.is_empty() {
            StoreCounters::add(&self.inner.counters.evictions_swept, expired.len() as u64);
            debug!("Swept {} expired synthetic responses", expired.len());
        }

        let event = EvictionEvent::new(EvictionReason::Swept, expired);
        if !event.is_empty() {
            self.inner.publish(event.clone());
        }
        event
    }

    /// Whether a live entry exists under `key` (does not count as a lookup)
    pub async fn contains_key(&self, key: &FakeKey) -> bool {
        let entries = self.inner.entries.read().await;
        entries
            .get(key)
            .map(|entry| entry.is_live_at(Instant::now()))
            .unwrap_or(false)
    }

    /// Number of held entries, including expired ones not yet reclaimed
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }

    /// Keys of all held entries, sorted
    pub async fn keys(&self) -> Vec<FakeKey> {
        let entries = self.inner.entries.read().await;
        let mut keys: Vec<FakeKey> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn stats(&self) -> FakeStats {
        let entries = self.inner.entries.read().await.len();
        self.inner.counters.snapshot(entries)
    }

    /// Hand an expired key to a detached removal task
    fn schedule_eviction(&self, key: FakeKey) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(&self.inner);
                handle.spawn(async move {
                    inner.evict_expired(&key).await;
                });
            }
            Err(_) => {
                debug!(
                    "No runtime for lazy eviction of {}, leaving it to the sweeper",
                    key
                );
            }
        }
    }
}

impl<V> StoreInner<V> {
    async fn evict_expired(&self, key: &FakeKey) -> bool {
        let mut entries = self.entries.write().await;
        let still_expired = entries
            .get(key)
            .map(|entry| entry.is_expired_at(Instant::now()))
            .unwrap_or(false);

        if still_expired {
            entries.remove(key);
            drop(entries);
            StoreCounters::bump(&self.counters.evictions_lazy);
            debug!("Evicted expired synthetic response: {}", key);
            self.publish(EvictionEvent::new(EvictionReason::Expired, vec![key.clone()]));
        }
        still_expired
    }

    fn publish(&self, event: EvictionEvent) {
        // No subscribers is the common case
        let _ = self.events.send(event);
    }
}

/// Background loop that periodically sweeps expired entries
pub async fn run_sweeper<V>(store: FakeStore<V>, interval: Duration)
where
    V: Clone + Send + Sync + 'static,
{
    if interval.is_zero() {
        warn!("Sweep interval is zero, periodic sweeping disabled");
        return;
    }

    info!("Starting synthetic response sweeper (interval: {:?})", interval);

    loop {
        tokio::time::sleep(interval).await;

        let event = store.sweep_expired().await;
        if !event.is_empty() {
            debug!("Sweeper reclaimed {} entries ({})", event.len(), event.reason);
        }
    }
}
