//! Error types for the faking layer and the provider contract
//!
//! `FakeError` covers the administrative and configuration surface. Store
//! operations never fail. `ProviderError` is what real providers raise; the
//! interception wrapper forwards it untouched.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by the administrative and configuration surface
#[derive(Error, Debug)]
pub enum FakeError {
    /// A synthetic response was given a zero lifetime
    #[error("Invalid lifetime {0:?}: lifetime must be greater than zero")]
    InvalidLifetime(Duration),

    /// A declarative mock definition failed validation
    #[error("Invalid mock '{name}': {reason}")]
    InvalidMock { name: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Reading a mock file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session has been torn down
    #[error("Faking session {0} is closed")]
    SessionClosed(uuid::Uuid),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for faking-layer operations
pub type Result<T> = std::result::Result<T, FakeError>;

impl From<String> for FakeError {
    fn from(s: String) -> Self {
        FakeError::Other(s)
    }
}

impl From<&str> for FakeError {
    fn from(s: &str) -> Self {
        FakeError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for FakeError {
    fn from(e: serde_json::Error) -> Self {
        FakeError::SerializationError(e.to_string())
    }
}

impl From<serde_yaml::Error> for FakeError {
    fn from(e: serde_yaml::Error) -> Self {
        FakeError::SerializationError(e.to_string())
    }
}

/// Errors raised by a provider implementation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The addressed resource does not exist upstream
    #[error("Resource not found: {type_name} '{id}'")]
    NotFound { type_name: String, id: String },

    /// The request was rejected by the provider
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream API failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The provider has not been configured yet
    #[error("Provider not configured")]
    NotConfigured,

    /// Generic error with context
    #[error("Provider error: {0}")]
    Other(String),
}

/// Result type alias for provider operations
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

impl From<String> for ProviderError {
    fn from(s: String) -> Self {
        ProviderError::Other(s)
    }
}

impl From<&str> for ProviderError {
    fn from(s: &str) -> Self {
        ProviderError::Other(s.to_string())
    }
}
