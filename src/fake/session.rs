//! Faking session: owns the store, the gate and the sweeper
//!
//! A session is constructed explicitly by the harness and shared with the
//! interception wrapper through an `Arc`. There is no process-wide state.

use crate::error::{FakeError, Result};
use crate::fake::{
    config::FakerConfig,
    entry::Lifetime,
    key::{FakeKey, RequestDescriptor},
    store::{run_sweeper, FakeStore},
    types::{FakeStats, Payload},
};
use crate::mocks::MockFile;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What `clear_fake_data` should remove
#[derive(Debug, Clone, PartialEq)]
pub enum FakeTarget {
    Key(FakeKey),
    Descriptor(RequestDescriptor),
}

impl From<FakeKey> for FakeTarget {
    fn from(key: FakeKey) -> Self {
        FakeTarget::Key(key)
    }
}

impl From<RequestDescriptor> for FakeTarget {
    fn from(descriptor: RequestDescriptor) -> Self {
        FakeTarget::Descriptor(descriptor)
    }
}

impl From<&RequestDescriptor> for FakeTarget {
    fn from(descriptor: &RequestDescriptor) -> Self {
        FakeTarget::Descriptor(descriptor.clone())
    }
}

/// One faking session
pub struct FakeSession {
    id: Uuid,
    config: FakerConfig,
    store: FakeStore<Payload>,
    enabled: AtomicBool,
    closed: AtomicBool,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl FakeSession {
    /// Create a session with an empty store
    ///
    /// The sweeper is started when `enable_auto_sweep` is set and a tokio
    /// runtime is available.
    pub fn new(config: FakerConfig) -> Result<Self> {
        Self::with_store(config, FakeStore::new())
    }

    /// Create a session around a prepared (usually empty) store
    pub fn with_store(config: FakerConfig, store: FakeStore<Payload>) -> Result<Self> {
        config.validate()?;

        let id = Uuid::new_v4();
        info!("Starting faking session {} (enabled: {})", id, config.enabled);

        let sweeper = if config.enable_auto_sweep {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    Some(handle.spawn(run_sweeper(store.clone(), config.sweep_interval)))
                }
                Err(_) => {
                    warn!("No tokio runtime, session {} runs without a sweeper", id);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            id,
            enabled: AtomicBool::new(config.enabled),
            config,
            store,
            closed: AtomicBool::new(false),
            sweeper: Mutex::new(sweeper),
        })
    }

    /// Create a session and load the configured mock file, if any
    pub async fn bootstrap(config: FakerConfig) -> Result<Arc<Self>> {
        let mocks_path = config.mocks_path.clone();
        let session = Arc::new(Self::new(config)?);

        if let Some(path) = mocks_path {
            let mocks = MockFile::load(&path)?;
            let keys = mocks.apply(&session).await?;
            info!("Loaded {} mocks from {}", keys.len(), path.display());
        }

        Ok(session)
    }

    /// Session built from `PROVIDER_FAKER_*` environment variables
    pub async fn from_env() -> Result<Arc<Self>> {
        Self::bootstrap(FakerConfig::from_env()?).await
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &FakerConfig {
        &self.config
    }

    /// Handle to the underlying store
    pub fn store(&self) -> &FakeStore<Payload> {
        &self.store
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            let state = if enabled { "enabled" } else { "disabled" };
            info!("Faking session {} {}", self.id, state);
        }
    }

    pub fn enable(&self) {
        self.set_enabled(true);
    }

    pub fn disable(&self) {
        self.set_enabled(false);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Key under which `descriptor` is stored in this session
    pub fn key_for(&self, descriptor: &RequestDescriptor) -> FakeKey {
        self.store.key_for(descriptor)
    }

    /// Register a synthetic response for `descriptor`
    pub async fn set_fake_data(
        &self,
        descriptor: &RequestDescriptor,
        payload: Payload,
        lifetime: Duration,
    ) -> Result<FakeKey> {
        let lifetime = Lifetime::new(lifetime)?;
        self.ensure_open()?;
        let key = self.store.set(descriptor, payload, lifetime).await;

        // A teardown racing the insert may have cleared the store before it landed
        if self.is_closed() {
            self.store.remove(&key).await;
            return Err(FakeError::SessionClosed(self.id));
        }
        Ok(key)
    }

    /// Register a synthetic response with the configured default lifetime
    pub async fn set_fake_data_default(
        &self,
        descriptor: &RequestDescriptor,
        payload: Payload,
    ) -> Result<FakeKey> {
        self.set_fake_data(descriptor, payload, self.config.default_lifetime)
            .await
    }

    /// Remove one synthetic response by key or descriptor
    pub async fn clear_fake_data(&self, target: impl Into<FakeTarget>) -> bool {
        match target.into() {
            FakeTarget::Key(key) => self.store.remove(&key).await,
            FakeTarget::Descriptor(descriptor) => {
                self.store.remove_descriptor(&descriptor).await
            }
        }
    }

    /// Remove every synthetic response
    pub async fn clear_all(&self) -> usize {
        self.store.clear().await
    }

    /// Gate-aware lookup used by the interception wrapper
    pub async fn lookup(&self, descriptor: &RequestDescriptor) -> Option<Payload> {
        if !self.is_enabled() || self.is_closed() {
            debug!(
                "Faking bypassed for {} {}",
                descriptor.operation, descriptor.resource_type
            );
            return None;
        }
        self.store.get(descriptor).await
    }

    pub async fn stats(&self) -> FakeStats {
        self.store.stats().await
    }

    /// Stop the sweeper, drop every entry and close the session
    pub async fn teardown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.stop_sweeper();

        let dropped = self.store.clear().await;
        info!("Faking session {} torn down ({} entries dropped)", self.id, dropped);
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(FakeError::SessionClosed(self.id));
        }
        Ok(())
    }

    fn stop_sweeper(&self) {
        let handle = match self.sweeper.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
            debug!("Stopped sweeper of faking session {}", self.id);
        }
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.stop_sweeper();
    }
}
