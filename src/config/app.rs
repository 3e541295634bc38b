//! Application configuration structures.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{ConnectOptions, DEFAULT_API_PORT, Device};
use crate::engine::EngineOptions;

use super::features::FeaturesConfig;
use super::validation::{ConfigError, expand_env_vars};

// =============================================================================
// Constants
// =============================================================================

/// Default per-device timeout (10 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default scrape deadline when Prometheus sends no timeout header (30 seconds).
pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default safety margin subtracted from the Prometheus scrape timeout.
pub const DEFAULT_SCRAPE_TIMEOUT_OFFSET: Duration = Duration::from_millis(500);

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_scrape_timeout() -> Duration {
    DEFAULT_SCRAPE_TIMEOUT
}

fn default_scrape_timeout_offset() -> Duration {
    DEFAULT_SCRAPE_TIMEOUT_OFFSET
}

// =============================================================================
// Options
// =============================================================================

/// Process-wide collection options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Per-device budget for connect, login and queries (default: 10s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Use API-SSL unless a device overrides it.
    #[serde(default)]
    pub tls: bool,

    /// Skip certificate verification unless a device overrides it.
    #[serde(default)]
    pub insecure: bool,

    /// Keep device sessions open between scrapes.
    #[serde(default)]
    pub reuse_connections: bool,

    /// Upper bound on devices collected at once (default: unbounded).
    #[serde(default)]
    pub max_concurrent_devices: Option<usize>,

    /// Scrape deadline without a Prometheus timeout header (default: 30s).
    #[serde(default = "default_scrape_timeout", with = "humantime_serde")]
    pub scrape_timeout: Duration,

    /// Subtracted from the Prometheus scrape timeout (default: 500ms).
    #[serde(default = "default_scrape_timeout_offset", with = "humantime_serde")]
    pub scrape_timeout_offset: Duration,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            tls: false,
            insecure: false,
            reuse_connections: false,
            max_concurrent_devices: None,
            scrape_timeout: DEFAULT_SCRAPE_TIMEOUT,
            scrape_timeout_offset: DEFAULT_SCRAPE_TIMEOUT_OFFSET,
        }
    }
}

impl OptionsConfig {
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            timeout: self.timeout,
            max_concurrent_devices: self.max_concurrent_devices,
            reuse_connections: self.reuse_connections,
        }
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            tls: self.tls,
            insecure: self.insecure,
        }
    }
}

// =============================================================================
// Single Device Mode
// =============================================================================

/// Device parameters given on the command line instead of a config file.
#[derive(Debug, Clone, Default)]
pub struct DeviceFlags {
    pub name: Option<String>,
    pub address: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub port: Option<u16>,
}

impl DeviceFlags {
    /// Build the device, failing on the first missing parameter.
    pub fn into_device(self) -> Result<Device, ConfigError> {
        fn required(value: Option<String>, flag: &str) -> Result<String, ConfigError> {
            value.filter(|v| !v.is_empty()).ok_or_else(|| {
                ConfigError::ValidationError(format!("missing required param '{flag}'"))
            })
        }

        let name = required(self.name, "device")?;
        let address = required(self.address, "address")?;
        let user = required(self.user, "user")?;
        let password = required(self.password, "password")?;

        Ok(Device::new(name, address)
            .with_credentials(user, password)
            .with_port(self.port.unwrap_or(DEFAULT_API_PORT)))
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Devices to scrape.
    #[serde(default)]
    pub devices: Vec<Device>,

    /// Optional feature switches.
    #[serde(default)]
    pub features: FeaturesConfig,

    /// Collection options.
    #[serde(default)]
    pub options: OptionsConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration text. Credentials may reference
    /// environment variables as `${VAR}` or `${VAR:-default}`.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(content)?;
        for device in &mut config.devices {
            device.user = expand_env_vars(&device.user);
            device.password = expand_env_vars(&device.password);
        }
        config.validate()?;
        Ok(config)
    }

    /// Configuration for one device given on the command line.
    pub fn single_device(flags: DeviceFlags) -> Result<Self, ConfigError> {
        let config = Self {
            devices: vec![flags.into_device()?],
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.devices.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one device must be configured".to_string(),
            ));
        }

        let mut seen_names = HashSet::new();
        for device in &self.devices {
            if device.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "device name cannot be empty".to_string(),
                ));
            }
            if !seen_names.insert(device.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate device name: '{}'",
                    device.name
                )));
            }

            let has_address = device.address.as_deref().is_some_and(|a| !a.trim().is_empty());
            let has_srv = device.srv.as_ref().is_some_and(|s| !s.record.trim().is_empty());
            match (has_address, has_srv) {
                (true, true) => {
                    return Err(ConfigError::ValidationError(format!(
                        "device '{}': address and srv are mutually exclusive",
                        device.name
                    )));
                }
                (false, false) => {
                    return Err(ConfigError::ValidationError(format!(
                        "device '{}': either address or srv is required",
                        device.name
                    )));
                }
                _ => {}
            }

            if device.port == Some(0) {
                return Err(ConfigError::ValidationError(format!(
                    "device '{}': port must be non-zero",
                    device.name
                )));
            }
        }

        if self.options.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "options timeout must be non-zero".to_string(),
            ));
        }
        if self.options.scrape_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "options scrape_timeout must be non-zero".to_string(),
            ));
        }
        if self.options.max_concurrent_devices == Some(0) {
            return Err(ConfigError::ValidationError(
                "options max_concurrent_devices must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
