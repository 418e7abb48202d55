//! # provider-faker
//!
//! Transparent interception layer for infrastructure resource providers.
//! Selected operations are answered with deterministic, time-bounded
//! synthetic responses; every other call passes through to the real
//! provider unchanged.
//!
//! ## Components
//!
//! - [`provider::Provider`]: the capability set shared by real providers and the wrapper
//! - [`fake::FakingProvider`]: the interception wrapper
//! - [`fake::FakeStore`]: concurrent expiring store with lazy eviction
//! - [`fake::FakeSession`]: session lifecycle, enable/disable gate and admin surface
//! - [`mocks::MockFile`]: declarative mock definitions loaded at session start
//!
//! ## Wrapping a provider
//!
//! ```no_run
//! use provider_faker::{FakeSession, FakerConfig, FakingProvider, Provider, ReadResourceRequest};
//! use std::sync::Arc;
//!
//! async fn run(real: Arc<dyn Provider>) -> anyhow::Result<()> {
//!     let session = FakeSession::bootstrap(FakerConfig::from_env()?).await?;
//!     let provider = FakingProvider::new(real, session.clone());
//!
//!     let state = provider
//!         .read_resource(ReadResourceRequest::new(
//!             "aws_instance",
//!             serde_json::json!({"id": "i-fake123"}),
//!         ))
//!         .await?;
//!     println!("{}", state);
//!
//!     session.teardown().await;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod fake;
pub mod mocks;
pub mod provider;

// Re-export main types for convenience
pub use error::{FakeError, ProviderError, ProviderResult, Result};
pub use fake::{
    EvictionEvent, EvictionReason, FakeEntry, FakeKey, FakeStats, FakeSession, FakeStore,
    FakeTarget, FakerConfig, FakerConfigBuilder, FakingProvider, KeyDeriver, Lifetime, Operation,
    Payload, RequestDescriptor, StructuralKeyDeriver,
};
pub use mocks::{MockDefinition, MockFile};
pub use provider::{
    ApplyResourceChangeRequest, ConfigureProviderRequest, Describe, ImportResourceStateRequest,
    PlanResourceChangeRequest, Provider, ReadDataSourceRequest, ReadResourceRequest,
    ValidateResourceConfigRequest,
};
