//! MikroTik Exporter Library
//!
//! Collects telemetry from MikroTik RouterOS devices over the RouterOS API
//! and exposes it in the Prometheus text format. The binary
//! `mikrotik-exporter` wires these pieces to an HTTP server.
//!
//! # Architecture
//!
//! - **Client**: RouterOS API sessions (plain or TLS), SRV discovery, session pool
//! - **Collectors**: One collector per RouterOS feature domain
//! - **Engine**: Concurrent per-scrape collection with per-device isolation
//! - **Metrics**: Observations and Prometheus text rendering
//! - **Server**: Scrape endpoint, liveness probe and landing page
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use mikrotik_exporter::{AppConfig, CollectorRegistry, Engine, ObservationBuffer, RouterOsConnector};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load("configs/config.yaml")?;
//! let features = config.features.merge(&Default::default());
//! let engine = Engine::new(
//!     config.devices.clone(),
//!     CollectorRegistry::from_features(&features),
//!     Arc::new(RouterOsConnector::new(config.options.connect_options())?),
//!     config.options.engine_options(),
//! );
//!
//! let sink = ObservationBuffer::new();
//! let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
//! engine.collect_all(deadline, &sink).await;
//! let text = mikrotik_exporter::metrics::render(&sink.drain(), &prometheus::Registry::new())?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod collector;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod server;

pub use client::{ClientError, ConnectOptions, Device, RouterOsConnector};
pub use collector::{CollectorRegistry, Feature, FeatureSet};
pub use config::{AppConfig, ConfigError};
pub use engine::{Engine, EngineOptions, ScrapeSummary};
pub use metrics::{Observation, ObservationBuffer};
