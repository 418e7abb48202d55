//! Provider capability contract
//!
//! Real providers and the interception wrapper implement the same
//! [`Provider`] trait, so the wrapper can stand in anywhere a provider is
//! accepted. Every resource-targeting request knows how to describe itself
//! as a [`RequestDescriptor`].

use crate::error::ProviderResult;
use crate::fake::{Operation, Payload, RequestDescriptor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Attribute that identifies a resource instance inside a state object
pub const IDENTITY_ATTRIBUTE: &str = "id";

/// Resource lifecycle operations offered by a provider
#[async_trait]
pub trait Provider: Send + Sync {
    /// Configure the provider itself (credentials, region, ...)
    async fn configure(&self, req: ConfigureProviderRequest) -> ProviderResult<()>;

    async fn validate_resource_config(
        &self,
        req: ValidateResourceConfigRequest,
    ) -> ProviderResult<Payload>;

    /// Refresh the state of an existing resource
    async fn read_resource(&self, req: ReadResourceRequest) -> ProviderResult<Payload>;

    /// Compute the planned state for a change
    async fn plan_resource_change(&self, req: PlanResourceChangeRequest) -> ProviderResult<Payload>;

    /// Carry out a planned change and return the new state
    async fn apply_resource_change(
        &self,
        req: ApplyResourceChangeRequest,
    ) -> ProviderResult<Payload>;

    async fn import_resource_state(
        &self,
        req: ImportResourceStateRequest,
    ) -> ProviderResult<Payload>;

    async fn read_data_source(&self, req: ReadDataSourceRequest) -> ProviderResult<Payload>;

    /// Ask the provider to abort in-flight work
    async fn stop(&self) -> ProviderResult<()>;
}

/// Builds the lookup descriptor for a request
pub trait Describe {
    fn descriptor(&self) -> RequestDescriptor;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigureProviderRequest {
    #[serde(default)]
    pub config: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateResourceConfigRequest {
    pub type_name: String,
    #[serde(default)]
    pub config: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResourceRequest {
    pub type_name: String,
    #[serde(default)]
    pub current_state: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResourceChangeRequest {
    pub type_name: String,
    #[serde(default)]
    pub prior_state: Value,
    #[serde(default)]
    pub proposed_new_state: Value,
    #[serde(default)]
    pub config: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyResourceChangeRequest {
    pub type_name: String,
    #[serde(default)]
    pub prior_state: Value,
    #[serde(default)]
    pub planned_state: Value,
    #[serde(default)]
    pub config: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResourceStateRequest {
    pub type_name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadDataSourceRequest {
    pub type_name: String,
    #[serde(default)]
    pub config: Value,
}

impl ReadResourceRequest {
    pub fn new(type_name: impl Into<String>, current_state: Value) -> Self {
        Self {
            type_name: type_name.into(),
            current_state,
        }
    }
}

impl ImportResourceStateRequest {
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }
}

/// Identity parameters of a state object: its non-null `id`, if any
fn identity_of(state: &Value) -> Option<BTreeMap<String, Value>> {
    let id = state.get(IDENTITY_ATTRIBUTE).filter(|v| !v.is_null())?;
    Some(BTreeMap::from([(IDENTITY_ATTRIBUTE.to_string(), id.clone())]))
}

/// Every top-level attribute of a configuration object
fn attributes_of(config: &Value) -> BTreeMap<String, Value> {
    match config {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Null => BTreeMap::new(),
        other => BTreeMap::from([("config".to_string(), other.clone())]),
    }
}

impl Describe for ValidateResourceConfigRequest {
    fn descriptor(&self) -> RequestDescriptor {
        RequestDescriptor::new(Operation::Validate, &self.type_name)
            .with_params(attributes_of(&self.config))
    }
}

impl Describe for ReadResourceRequest {
    fn descriptor(&self) -> RequestDescriptor {
        RequestDescriptor::new(Operation::Read, &self.type_name)
            .with_params(identity_of(&self.current_state).unwrap_or_default())
    }
}

impl Describe for PlanResourceChangeRequest {
    fn descriptor(&self) -> RequestDescriptor {
        let identity = identity_of(&self.prior_state)
            .or_else(|| identity_of(&self.proposed_new_state))
            .unwrap_or_default();
        RequestDescriptor::new(Operation::Plan, &self.type_name).with_params(identity)
    }
}

impl Describe for ApplyResourceChangeRequest {
    fn descriptor(&self) -> RequestDescriptor {
        let identity = identity_of(&self.prior_state)
            .or_else(|| identity_of(&self.planned_state))
            .unwrap_or_default();
        RequestDescriptor::new(Operation::Apply, &self.type_name).with_params(identity)
    }
}

impl Describe for ImportResourceStateRequest {
    fn descriptor(&self) -> RequestDescriptor {
        RequestDescriptor::new(Operation::Import, &self.type_name)
            .with_param(IDENTITY_ATTRIBUTE, self.id.clone())
    }
}

impl Describe for ReadDataSourceRequest {
    fn descriptor(&self) -> RequestDescriptor {
        RequestDescriptor::new(Operation::ReadDataSource, &self.type_name)
            .with_params(attributes_of(&self.config))
    }
}

macro_rules! forward_provider {
    ($target:ty) => {
        #[async_trait]
        impl<P: Provider + ?Sized> Provider for $target {
            async fn configure(&self, req: ConfigureProviderRequest) -> ProviderResult<()> {
                (**self).configure(req).await
            }

            async fn validate_resource_config(
                &self,
                req: ValidateResourceConfigRequest,
            ) -> ProviderResult<Payload> {
                (**self).validate_resource_config(req).await
            }

            async fn read_resource(&self, req: ReadResourceRequest) -> ProviderResult<Payload> {
                (**self).read_resource(req).await
            }

            async fn plan_resource_change(
                &self,
                req: PlanResourceChangeRequest,
            ) -> ProviderResult<Payload> {
                (**self).plan_resource_change(req).await
            }

            async fn apply_resource_change(
                &self,
                req: ApplyResourceChangeRequest,
            ) -> ProviderResult<Payload> {
                (**self).apply_resource_change(req).await
            }

            async fn import_resource_state(
                &self,
                req: ImportResourceStateRequest,
            ) -> ProviderResult<Payload> {
                (**self).import_resource_state(req).await
            }

            async fn read_data_source(
                &self,
                req: ReadDataSourceRequest,
            ) -> ProviderResult<Payload> {
                (**self).read_data_source(req).await
            }

            async fn stop(&self) -> ProviderResult<()> {
                (**self).stop().await
            }
        }
    };
}

forward_provider!(Arc<P>);
forward_provider!(Box<P>);
