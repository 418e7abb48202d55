//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use provider_faker::{
    ApplyResourceChangeRequest, ConfigureProviderRequest, ImportResourceStateRequest, Payload,
    PlanResourceChangeRequest, Provider, ProviderError, ProviderResult, ReadDataSourceRequest,
    ReadResourceRequest, ValidateResourceConfigRequest,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Stand-in for a real provider that records every call it receives
#[derive(Default)]
pub struct RecordingProvider {
    calls: AtomicUsize,
    operations: Mutex<Vec<String>>,
    fail_with: Option<ProviderError>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose resource operations all fail with `error`
    pub fn failing(error: ProviderError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn operations(&self) -> Vec<String> {
        self.operations.lock().unwrap().clone()
    }

    fn record(&self, operation: &str, type_name: &str) -> ProviderResult<Payload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.operations
            .lock()
            .unwrap()
            .push(format!("{}:{}", operation, type_name));

        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(json!({"source": "real", "operation": operation, "type": type_name})),
        }
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    async fn configure(&self, _req: ConfigureProviderRequest) -> ProviderResult<()> {
        self.record("configure", "provider").map(|_| ())
    }

    async fn validate_resource_config(
        &self,
        req: ValidateResourceConfigRequest,
    ) -> ProviderResult<Payload> {
        self.record("validate", &req.type_name)
    }

    async fn read_resource(&self, req: ReadResourceRequest) -> ProviderResult<Payload> {
        self.record("read", &req.type_name)
    }

    async fn plan_resource_change(
        &self,
        req: PlanResourceChangeRequest,
    ) -> ProviderResult<Payload> {
        self.record("plan", &req.type_name)
    }

    async fn apply_resource_change(
        &self,
        req: ApplyResourceChangeRequest,
    ) -> ProviderResult<Payload> {
        self.record("apply", &req.type_name)
    }

    async fn import_resource_state(
        &self,
        req: ImportResourceStateRequest,
    ) -> ProviderResult<Payload> {
        self.record("import", &req.type_name)
    }

    async fn read_data_source(&self, req: ReadDataSourceRequest) -> ProviderResult<Payload> {
        self.record("read_data_source", &req.type_name)
    }

    async fn stop(&self) -> ProviderResult<()> {
        self.record("stop", "provider").map(|_| ())
    }
}

/// Install a test subscriber honouring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
