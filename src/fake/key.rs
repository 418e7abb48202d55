//! Request descriptors and canonical key derivation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Provider operation kinds that can be faked
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Validate a resource configuration
    Validate,

    /// Read the current state of a resource
    #[default]
    Read,

    /// Plan a change to a resource
    Plan,

    /// Apply a planned change
    Apply,

    /// Import an existing resource by id
    Import,

    /// Read a data source
    ReadDataSource,
}

impl Operation {
    /// Stable name used in keys and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Validate => "validate",
            Operation::Read => "read",
            Operation::Plan => "plan",
            Operation::Apply => "apply",
            Operation::Import => "import",
            Operation::ReadDataSource => "read_data_source",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one provider operation invocation
///
/// Two descriptors with the same operation, resource type and parameter set
/// (compared structurally, independent of insertion order) address the same
/// synthetic response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Operation kind
    pub operation: Operation,

    /// Resource or data source type name, e.g. `aws_instance`
    pub resource_type: String,

    /// Parameters that distinguish one target instance from another
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

impl RequestDescriptor {
    /// Create a descriptor without parameters
    pub fn new(operation: Operation, resource_type: impl Into<String>) -> Self {
        Self {
            operation,
            resource_type: resource_type.into(),
            params: BTreeMap::new(),
        }
    }

    /// Shorthand for a `read` descriptor
    pub fn read(resource_type: impl Into<String>) -> Self {
        Self::new(Operation::Read, resource_type)
    }

    /// Shorthand for a `plan` descriptor
    pub fn plan(resource_type: impl Into<String>) -> Self {
        Self::new(Operation::Plan, resource_type)
    }

    /// Shorthand for an `apply` descriptor
    pub fn apply(resource_type: impl Into<String>) -> Self {
        Self::new(Operation::Apply, resource_type)
    }

    /// Add a distinguishing parameter
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Replace the parameter set
    pub fn with_params(mut self, params: BTreeMap<String, Value>) -> Self {
        self.params = params;
        self
    }

    /// Derive the canonical key with the structural deriver
    ///
    /// Only matches entries of stores using [`StructuralKeyDeriver`]; use
    /// `FakeStore::key_for` or `FakeSession::key_for` otherwise.
    pub fn key(&self) -> FakeKey {
        StructuralKeyDeriver.derive(self)
    }
}

/// Canonical lookup key for a synthetic response
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FakeKey(String);

impl FakeKey {
    /// Wrap an already-canonical key string
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FakeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structural key, see [`RequestDescriptor::key`]
impl From<&RequestDescriptor> for FakeKey {
    fn from(descriptor: &RequestDescriptor) -> Self {
        descriptor.key()
    }
}

/// Maps descriptors to canonical keys
///
/// Implementations must be deterministic: no clock, randomness or
/// insertion order may influence the result.
pub trait KeyDeriver: Send + Sync {
    fn derive(&self, descriptor: &RequestDescriptor) -> FakeKey;
}

/// Structural-equality key derivation
///
/// Layout: `<operation>:<resource type as JSON string>:<params as canonical JSON>`.
/// Canonical JSON sorts object keys at every depth and carries no whitespace.
/// Numbers are compared by their JSON text, so `1` and `1.0` are distinct.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralKeyDeriver;

impl KeyDeriver for StructuralKeyDeriver {
    fn derive(&self, descriptor: &RequestDescriptor) -> FakeKey {
        let mut key = String::with_capacity(64);
        key.push_str(descriptor.operation.as_str());
        key.push(':');
        write_json_string(&descriptor.resource_type, &mut key);
        key.push(':');

        key.push('{');
        for (i, (name, value)) in descriptor.params.iter().enumerate() {
            if i > 0 {
                key.push(',');
            }
            write_json_string(name, &mut key);
            key.push(':');
            write_canonical(value, &mut key);
        }
        key.push('}');

        FakeKey(key)
    }
}

/// Write `value` as JSON with recursively sorted object keys
pub fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(&String, &Value)> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (name, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(name, out);
                out.push(':');
                write_canonical(field, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_json_string(s: &str, out: &mut String) {
    out.push_str(&Value::String(s.to_string()).to_string());
}
