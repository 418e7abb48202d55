//! Faking Provider Demo
//!
//! Wraps a small in-memory provider, registers synthetic responses and shows
//! hits, misses, the enable/disable gate and teardown.
//!
//! Usage:
//!   cargo run --example fake_provider_demo
//!
//! Environment variables:
//!   PROVIDER_FAKER_MOCKS_PATH - optional YAML/JSON mock file loaded at start
//!   RUST_LOG                  - log filter (default: info)

use async_trait::async_trait;
use provider_faker::{
    ApplyResourceChangeRequest, ConfigureProviderRequest, FakeSession, FakerConfig, FakingProvider,
    ImportResourceStateRequest, Payload, PlanResourceChangeRequest, Provider, ProviderError,
    ProviderResult, ReadDataSourceRequest, ReadResourceRequest, RequestDescriptor,
    ValidateResourceConfigRequest,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Provider that keeps resource state in memory
#[derive(Default)]
struct InMemoryProvider {
    resources: Mutex<HashMap<String, Payload>>,
}

impl InMemoryProvider {
    fn state_of(&self, type_name: &str, id: &str) -> ProviderResult<Payload> {
        let resources = self
            .resources
            .lock()
            .map_err(|_| ProviderError::Other("state lock poisoned".to_string()))?;
        resources
            .get(&format!("{}/{}", type_name, id))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                type_name: type_name.to_string(),
                id: id.to_string(),
            })
    }
}

#[async_trait]
impl Provider for InMemoryProvider {
    async fn configure(&self, _req: ConfigureProviderRequest) -> ProviderResult<()> {
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        _req: ValidateResourceConfigRequest,
    ) -> ProviderResult<Payload> {
        Ok(json!({"diagnostics": []}))
    }

    async fn read_resource(&self, req: ReadResourceRequest) -> ProviderResult<Payload> {
        let id = req.current_state["id"].as_str().unwrap_or_default().to_string();
        self.state_of(&req.type_name, &id)
    }

    async fn plan_resource_change(
        &self,
        req: PlanResourceChangeRequest,
    ) -> ProviderResult<Payload> {
        Ok(req.proposed_new_state)
    }

    async fn apply_resource_change(
        &self,
        req: ApplyResourceChangeRequest,
    ) -> ProviderResult<Payload> {
        let id = req.planned_state["id"].as_str().unwrap_or("generated").to_string();
        let mut state = req.planned_state;
        if let Some(attributes) = state.as_object_mut() {
            attributes.insert("id".to_string(), json!(id));
        }

        let mut resources = self
            .resources
            .lock()
            .map_err(|_| ProviderError::Other("state lock poisoned".to_string()))?;
        resources.insert(format!("{}/{}", req.type_name, id), state.clone());
        Ok(state)
    }

    async fn import_resource_state(
        &self,
        req: ImportResourceStateRequest,
    ) -> ProviderResult<Payload> {
        self.state_of(&req.type_name, &req.id)
    }

    async fn read_data_source(&self, req: ReadDataSourceRequest) -> ProviderResult<Payload> {
        Err(ProviderError::InvalidRequest(format!(
            "data source {} is not supported",
            req.type_name
        )))
    }

    async fn stop(&self) -> ProviderResult<()> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("=== Faking Provider Demo ===");

    let session = FakeSession::bootstrap(FakerConfig::from_env()?).await?;
    let provider = FakingProvider::new(InMemoryProvider::default(), session.clone());

    let read = || ReadResourceRequest::new("aws_instance", json!({"id": "i-fake123"}));

    info!("\n--- Real provider (no fake registered) ---");
    match provider.read_resource(read()).await {
        Ok(state) => info!("✓ Real state: {}", state),
        Err(e) => info!("✗ Real provider error: {}", e),
    }

    info!("\n--- Synthetic response ---");
    let key = session
        .set_fake_data(
            &RequestDescriptor::read("aws_instance").with_param("id", "i-fake123"),
            json!({"id": "i-fake123", "state": "running"}),
            Duration::from_secs(30 * 60),
        )
        .await?;
    info!("Registered fake under {}", key);
    info!("✓ Served: {}", provider.read_resource(read()).await?);

    info!("\n--- Gate disabled ---");
    session.disable();
    match provider.read_resource(read()).await {
        Ok(state) => info!("✓ Real state: {}", state),
        Err(e) => info!("✗ Real provider error: {}", e),
    }
    session.enable();

    info!("\n--- Short-lived fake ---");
    session
        .set_fake_data(
            &RequestDescriptor::read("aws_instance").with_param("id", "i-fake123"),
            json!({"id": "i-fake123", "state": "stopping"}),
            Duration::from_millis(200),
        )
        .await?;
    info!("✓ Before expiry: {}", provider.read_resource(read()).await?);
    tokio::time::sleep(Duration::from_millis(250)).await;
    match provider.read_resource(read()).await {
        Ok(state) => info!("✓ After expiry: {}", state),
        Err(e) => info!("✓ After expiry the real provider answered: {}", e),
    }

    info!("\n{}", session.stats().await);
    session.teardown().await;

    Ok(())
}
