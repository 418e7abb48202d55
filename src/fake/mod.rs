//! # Synthetic Response Layer
//!
//! Time-bounded fake responses served in front of a real provider.
//!
//! ## Features
//!
//! - **Structural keys**: descriptors map to canonical keys independent of parameter order
//! - **Lazy eviction**: an expired entry is reported as a miss and removed by a detached task
//! - **Periodic sweep**: optional background task reclaiming expired entries nobody reads
//! - **Reader–writer locking**: concurrent lookups never block each other
//! - **Session gate**: faking can be switched off without touching stored entries
//!
//! ## Example
//!
//! ```rust
//! use provider_faker::fake::{FakeSession, FakerConfig, RequestDescriptor};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! # async fn example() -> provider_faker::Result<()> {
//! let session = FakeSession::new(FakerConfig::for_tests())?;
//!
//! let descriptor = RequestDescriptor::read("aws_instance").with_param("id", "i-fake123");
//! session
//!     .set_fake_data(
//!         &descriptor,
//!         json!({"id": "i-fake123", "state": "running"}),
//!         Duration::from_secs(1800),
//!     )
//!     .await?;
//!
//! if let Some(payload) = session.lookup(&descriptor).await {
//!     println!("Synthetic response: {}", payload);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod eviction;
pub mod key;
pub mod session;
pub mod store;
pub mod types;
pub mod wrapper;

pub use config::{FakerConfig, FakerConfigBuilder};
pub use entry::{FakeEntry, FakeMetadata, Lifetime};
pub use eviction::{EvictionEvent, EvictionReason};
pub use key::{FakeKey, KeyDeriver, Operation, RequestDescriptor, StructuralKeyDeriver};
pub use session::{FakeSession, FakeTarget};
pub use store::{run_sweeper, FakeStore};
pub use types::{FakeStats, Payload};
pub use wrapper::FakingProvider;
