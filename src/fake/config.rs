//! Configuration for a faking session

use crate::error::{FakeError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const ENV_ENABLED: &str = "PROVIDER_FAKER_ENABLED";
pub const ENV_DEFAULT_LIFETIME_SECS: &str = "PROVIDER_FAKER_DEFAULT_LIFETIME_SECS";
pub const ENV_AUTO_SWEEP: &str = "PROVIDER_FAKER_AUTO_SWEEP";
pub const ENV_SWEEP_INTERVAL_SECS: &str = "PROVIDER_FAKER_SWEEP_INTERVAL_SECS";
pub const ENV_MOCKS_PATH: &str = "PROVIDER_FAKER_MOCKS_PATH";

/// Configuration for a faking session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FakerConfig {
    /// Initial state of the enable/disable gate
    pub enabled: bool,

    /// Lifetime applied to mocks that do not declare one
    pub default_lifetime: Duration,

    /// Run a background task that sweeps expired entries
    pub enable_auto_sweep: bool,

    /// Interval between sweeps
    pub sweep_interval: Duration,

    /// Declarative mock file loaded by `FakeSession::bootstrap`
    pub mocks_path: Option<PathBuf>,
}

impl Default for FakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 30 minutes
            default_lifetime: Duration::from_secs(1800),
            enable_auto_sweep: true,
            sweep_interval: Duration::from_secs(60),
            mocks_path: None,
        }
    }
}

impl FakerConfig {
    /// Create a new builder for faker configuration
    pub fn builder() -> FakerConfigBuilder {
        FakerConfigBuilder::default()
    }

    /// Configuration for tests: a frequent sweeper
    pub fn for_tests() -> Self {
        Self {
            sweep_interval: Duration::from_secs(1),
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_lifetime.is_zero() {
            return Err(FakeError::ConfigError(
                "default_lifetime must be greater than 0".to_string(),
            ));
        }

        if self.enable_auto_sweep && self.sweep_interval.is_zero() {
            return Err(FakeError::ConfigError(
                "sweep_interval must be greater than 0 when auto sweep is enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from the environment, reading `.env` if present
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenv::dotenv() {
            if !e.not_found() {
                warn!("Ignoring unreadable .env file: {}", e);
            }
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(value) = lookup(ENV_ENABLED) {
            builder = builder.enabled(parse_bool(ENV_ENABLED, &value)?);
        }
        if let Some(value) = lookup(ENV_DEFAULT_LIFETIME_SECS) {
            builder = builder.default_lifetime(Duration::from_secs(parse_secs(
                ENV_DEFAULT_LIFETIME_SECS,
                &value,
            )?));
        }
        if let Some(value) = lookup(ENV_AUTO_SWEEP) {
            builder = builder.enable_auto_sweep(parse_bool(ENV_AUTO_SWEEP, &value)?);
        }
        if let Some(value) = lookup(ENV_SWEEP_INTERVAL_SECS) {
            builder = builder.sweep_interval(Duration::from_secs(parse_secs(
                ENV_SWEEP_INTERVAL_SECS,
                &value,
            )?));
        }
        if let Some(value) = lookup(ENV_MOCKS_PATH) {
            if !value.trim().is_empty() {
                builder = builder.mocks_path(value.trim());
            }
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(FakeError::ConfigError(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        FakeError::ConfigError(format!(
            "{} must be a whole number of seconds, got '{}'",
            name, value
        ))
    })
}

/// Builder for faker configuration
#[derive(Debug, Default)]
pub struct FakerConfigBuilder {
    enabled: Option<bool>,
    default_lifetime: Option<Duration>,
    enable_auto_sweep: Option<bool>,
    sweep_interval: Option<Duration>,
    mocks_path: Option<PathBuf>,
}

impl FakerConfigBuilder {
    /// Set the initial state of the gate
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Set the lifetime used when a mock declares none
    pub fn default_lifetime(mut self, lifetime: Duration) -> Self {
        self.default_lifetime = Some(lifetime);
        self
    }

    /// Enable or disable the background sweeper
    pub fn enable_auto_sweep(mut self, enable: bool) -> Self {
        self.enable_auto_sweep = Some(enable);
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Set the declarative mock file
    pub fn mocks_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.mocks_path = Some(path.into());
        self
    }

    /// Build the faker configuration
    pub fn build(self) -> FakerConfig {
        let defaults = FakerConfig::default();

        FakerConfig {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            default_lifetime: self.default_lifetime.unwrap_or(defaults.default_lifetime),
            enable_auto_sweep: self
                .enable_auto_sweep
                .unwrap_or(defaults.enable_auto_sweep),
            sweep_interval: self.sweep_interval.unwrap_or(defaults.sweep_interval),
            mocks_path: self.mocks_path.or(defaults.mocks_path),
        }
    }
}
