//! Configuration module for the exporter.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Devices (static address or SRV discovery, credentials, transport overrides)
//! - Feature switches, merged with command line flags
//! - Collection options (timeouts, TLS, connection reuse, concurrency)

mod app;
mod features;
mod validation;

pub use app::{AppConfig, DeviceFlags, OptionsConfig};
pub use features::FeaturesConfig;
pub use validation::{ConfigError, expand_env_vars, parse_duration, parse_listen_address};

// Re-export constants
pub use app::{DEFAULT_SCRAPE_TIMEOUT, DEFAULT_SCRAPE_TIMEOUT_OFFSET, DEFAULT_TIMEOUT};
