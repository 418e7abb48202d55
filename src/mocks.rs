//! Declarative mock definitions
//!
//! A mock file lists per-resource-type synthetic responses:
//!
//! ```yaml
//! mocks:
//!   - name: aws_instance
//!     operation: read
//!     params:
//!       id: i-fake123
//!     lifetime_secs: 1800
//!     response:
//!       id: i-fake123
//!       state: running
//! ```
//!
//! The whole file is validated before anything reaches the session, so a
//! single malformed mock leaves the store untouched.

use crate::error::{FakeError, Result};
use crate::fake::{FakeKey, FakeSession, Lifetime, Operation, RequestDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// A parsed mock file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MockFile {
    #[serde(default)]
    pub mocks: Vec<MockDefinition>,
}

/// One synthetic response definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockDefinition {
    /// Resource type the mock applies to
    pub name: String,

    #[serde(default)]
    pub operation: Operation,

    /// Parameters identifying the target instance
    #[serde(default)]
    pub params: BTreeMap<String, Value>,

    /// Lifetime in seconds; the session default applies when absent
    #[serde(default)]
    pub lifetime_secs: Option<u64>,

    /// Static response body, served verbatim
    pub response: Value,
}

impl MockDefinition {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("name must not be empty"));
        }
        if self.lifetime_secs == Some(0) {
            return Err(self.invalid("lifetime_secs must be greater than 0"));
        }
        if self.response.is_null() {
            return Err(self.invalid("response must not be null"));
        }
        Ok(())
    }

    pub fn descriptor(&self) -> RequestDescriptor {
        RequestDescriptor::new(self.operation, &self.name).with_params(self.params.clone())
    }

    /// Effective lifetime given the session default
    pub fn lifetime(&self, default: Duration) -> Result<Lifetime> {
        let duration = self.lifetime_secs.map(Duration::from_secs).unwrap_or(default);
        Lifetime::new(duration).map_err(|_| self.invalid("lifetime must be greater than 0"))
    }

    fn invalid(&self, reason: &str) -> FakeError {
        FakeError::InvalidMock {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

impl MockFile {
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let file: MockFile = serde_yaml::from_str(source)?;
        file.validate()?;
        Ok(file)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let file: MockFile = serde_json::from_str(source)?;
        file.validate()?;
        Ok(file)
    }

    /// Read a mock file; `.json` files are parsed as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&source)
        } else {
            Self::from_yaml_str(&source)
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.mocks.iter().try_for_each(MockDefinition::validate)
    }

    /// Register every mock with `session`
    pub async fn apply(&self, session: &FakeSession) -> Result<Vec<FakeKey>> {
        let default = session.config().default_lifetime;

        let prepared = self
            .mocks
            .iter()
            .map(|mock| -> Result<(&MockDefinition, Lifetime)> {
                mock.validate()?;
                Ok((mock, mock.lifetime(default)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut keys = Vec::with_capacity(prepared.len());
        for (mock, lifetime) in prepared {
            let key = session
                .set_fake_data(&mock.descriptor(), mock.response.clone(), lifetime.as_duration())
                .await?;
            debug!("Registered mock '{}' as {}", mock.name, key);
            keys.push(key);
        }
        Ok(keys)
    }
}
