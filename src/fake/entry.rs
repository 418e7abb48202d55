//! Synthetic response entries and their lifetimes

use crate::error::{FakeError, Result};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

/// Fallback horizon when `now + lifetime` overflows the clock
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// A strictly positive duration for which a synthetic response is served
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lifetime(Duration);

impl Lifetime {
    /// Validate a lifetime; zero is rejected
    pub fn new(duration: Duration) -> Result<Self> {
        if duration.is_zero() {
            return Err(FakeError::InvalidLifetime(duration));
        }
        Ok(Self(duration))
    }

    pub fn from_secs(secs: u64) -> Result<Self> {
        Self::new(Duration::from_secs(secs))
    }

    pub fn from_millis(millis: u64) -> Result<Self> {
        Self::new(Duration::from_millis(millis))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl TryFrom<Duration> for Lifetime {
    type Error = FakeError;

    fn try_from(duration: Duration) -> Result<Self> {
        Self::new(duration)
    }
}

impl From<Lifetime> for Duration {
    fn from(lifetime: Lifetime) -> Self {
        lifetime.0
    }
}

/// A stored synthetic response
#[derive(Debug, Clone)]
pub struct FakeEntry<V> {
    /// The payload, served verbatim
    pub payload: V,

    /// Entry metadata
    pub metadata: FakeMetadata,
}

/// Timing metadata of a synthetic response
#[derive(Debug, Clone)]
pub struct FakeMetadata {
    /// Monotonic creation instant
    pub created_at: Instant,

    /// Monotonic expiry instant (`created_at + lifetime`)
    pub expires_at: Instant,

    /// Configured lifetime
    pub lifetime: Lifetime,

    /// Wall-clock time the entry was recorded, for introspection only
    pub recorded_at: DateTime<Utc>,
}

impl<V> FakeEntry<V> {
    /// Create an entry that expires `lifetime` from now
    pub fn new(payload: V, lifetime: Lifetime) -> Self {
        Self::created_at(payload, lifetime, Instant::now())
    }

    /// Create an entry relative to an explicit creation instant
    pub fn created_at(payload: V, lifetime: Lifetime, now: Instant) -> Self {
        let expires_at = now
            .checked_add(lifetime.as_duration())
            .unwrap_or_else(|| now + FAR_FUTURE);

        Self {
            payload,
            metadata: FakeMetadata {
                created_at: now,
                expires_at,
                lifetime,
                recorded_at: Utc::now(),
            },
        }
    }

    /// Whether the entry may be served at `now` (strictly before expiry)
    pub fn is_live_at(&self, now: Instant) -> bool {
        now < self.metadata.expires_at
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        !self.is_live_at(now)
    }

    /// Check expiry against a fresh reading of the clock
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Remaining time until expiry, `None` once expired
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Instant::now();
        if self.is_expired_at(now) {
            None
        } else {
            Some(self.metadata.expires_at - now)
        }
    }

    /// Age of the entry
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.metadata.created_at)
    }
}
