//! Interception wrapper around a real provider

use crate::error::ProviderResult;
use crate::fake::{session::FakeSession, types::Payload};
use crate::provider::{
    ApplyResourceChangeRequest, ConfigureProviderRequest, Describe, ImportResourceStateRequest,
    PlanResourceChangeRequest, Provider, ReadDataSourceRequest, ReadResourceRequest,
    ValidateResourceConfigRequest,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Provider that serves synthetic responses from a [`FakeSession`] and
/// delegates everything else to the wrapped provider
///
/// A hit is returned verbatim without touching the real provider. A miss,
/// or any call while the session gate is off, goes to the real provider and
/// its result (errors included) is returned unchanged. `configure` and
/// `stop` target no resource and always delegate.
pub struct FakingProvider<P> {
    inner: P,
    session: Arc<FakeSession>,
}

impl<P: Provider> FakingProvider<P> {
    pub fn new(inner: P, session: Arc<FakeSession>) -> Self {
        Self { inner, session }
    }

    /// The wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn session(&self) -> &Arc<FakeSession> {
        &self.session
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    async fn synthetic<R: Describe>(&self, req: &R) -> Option<Payload> {
        let descriptor = req.descriptor();
        let hit = self.session.lookup(&descriptor).await;
        if hit.is_some() {
            debug!(
                "Serving synthetic {} for {}",
                descriptor.operation, descriptor.resource_type
            );
        }
        hit
    }
}

#[async_trait]
impl<P: Provider> Provider for FakingProvider<P> {
    async fn configure(&self, req: ConfigureProviderRequest) -> ProviderResult<()> {
        self.inner.configure(req).await
    }

    async fn validate_resource_config(
        &self,
        req: ValidateResourceConfigRequest,
    ) -> ProviderResult<Payload> {
        if let Some(payload) = self.synthetic(&req).await {
            return Ok(payload);
        }
        self.inner.validate_resource_config(req).await
    }

    async fn read_resource(&self, req: ReadResourceRequest) -> ProviderResult<Payload> {
        if let Some(payload) = self.synthetic(&req).await {
            return Ok(payload);
        }
        self.inner.read_resource(req).await
    }

    async fn plan_resource_change(
        &self,
        req: PlanResourceChangeRequest,
    ) -> ProviderResult<Payload> {
        if let Some(payload) = self.synthetic(&req).await {
            return Ok(payload);
        }
        self.inner.plan_resource_change(req).await
    }

    async fn apply_resource_change(
        &self,
        req: ApplyResourceChangeRequest,
    ) -> ProviderResult<Payload> {
        if let Some(payload) = self.synthetic(&req).await {
            return Ok(payload);
        }
        self.inner.apply_resource_change(req).await
    }

    async fn import_resource_state(
        &self,
        req: ImportResourceStateRequest,
    ) -> ProviderResult<Payload> {
        if let Some(payload) = self.synthetic(&req).await {
            return Ok(payload);
        }
        self.inner.import_resource_state(req).await
    }

    async fn read_data_source(&self, req: ReadDataSourceRequest) -> ProviderResult<Payload> {
        if let Some(payload) = self.synthetic(&req).await {
            return Ok(payload);
        }
        self.inner.read_data_source(req).await
    }

    async fn stop(&self) -> ProviderResult<()> {
        self.inner.stop().await
    }
}
