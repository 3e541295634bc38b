//! Collection Engine
//!
//! Runs one scrape: every configured device is collected concurrently, and
//! within a device every enabled feature runs concurrently over the device's
//! single session. Failures stay scoped to the feature or device that hit
//! them, and every device is reported exactly once per scrape.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use mikrotik_exporter::client::{ConnectOptions, Device, RouterOsConnector};
//! use mikrotik_exporter::collector::{CollectorRegistry, FeatureSet};
//! use mikrotik_exporter::engine::{Engine, EngineOptions};
//! use mikrotik_exporter::metrics::ObservationBuffer;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let device = Device::new("edge", "192.168.88.1").with_credentials("prometheus", "secret");
//! let engine = Engine::new(
//!     vec![device],
//!     CollectorRegistry::from_features(&FeatureSet::new()),
//!     Arc::new(RouterOsConnector::new(ConnectOptions::default())?),
//!     EngineOptions::default(),
//! );
//!
//! let sink = ObservationBuffer::new();
//! let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
//! let summary = engine.collect_all(deadline, &sink).await;
//! println!("{} of {} devices up", summary.up, summary.devices);
//! # Ok(())
//! # }
//! ```

mod report;
mod worker;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::client::{Connector, Device, SessionPool};
use crate::collector::CollectorRegistry;
use crate::metrics::MetricSink;

pub use report::{DeviceError, DeviceReport, FeatureError, FeatureOutcome};
use worker::DeviceWorker;

/// Default bound on connect and login per device (10 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Engine settings, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Budget for one device: connect, login and all queries.
    pub timeout: Duration,
    /// Upper bound on devices collected at the same time.
    pub max_concurrent_devices: Option<usize>,
    /// Keep sessions open between scrapes.
    pub reuse_connections: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_concurrent_devices: None,
            reuse_connections: false,
        }
    }
}

/// Outcome of one scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub devices: usize,
    pub up: usize,
    pub duration: Duration,
}

/// The collection engine. Cheap to share behind an `Arc`.
pub struct Engine {
    devices: Vec<Arc<Device>>,
    registry: Arc<CollectorRegistry>,
    connector: Arc<dyn Connector>,
    pool: Arc<SessionPool>,
    limiter: Option<Arc<Semaphore>>,
    options: EngineOptions,
}

impl Engine {
    pub fn new(
        devices: Vec<Device>,
        registry: CollectorRegistry,
        connector: Arc<dyn Connector>,
        options: EngineOptions,
    ) -> Self {
        let limiter = options
            .max_concurrent_devices
            .filter(|&n| n > 0)
            .map(|n| Arc::new(Semaphore::new(n)));

        Self {
            devices: devices.into_iter().map(Arc::new).collect(),
            registry: Arc::new(registry),
            connector,
            pool: Arc::new(SessionPool::new(options.reuse_connections)),
            limiter,
            options,
        }
    }

    pub fn devices(&self) -> &[Arc<Device>] {
        &self.devices
    }

    pub fn registry(&self) -> &CollectorRegistry {
        &self.registry
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Collect every device and write the results to `sink`.
    ///
    /// Returns once every device has a result. Devices still running at
    /// `deadline` are reported down and their partial results dropped.
    pub async fn collect_all(&self, deadline: Instant, sink: &dyn MetricSink) -> ScrapeSummary {
        let started = Instant::now();
        let reports = self.run_devices(deadline).await;

        let summary = ScrapeSummary {
            devices: reports.len(),
            up: reports.iter().filter(|r| r.up).count(),
            duration: started.elapsed(),
        };
        for report in reports {
            sink.record_all(report.into_observations());
        }

        tracing::debug!(
            devices = summary.devices,
            up = summary.up,
            duration_ms = summary.duration.as_millis(),
            "Scrape completed"
        );
        summary
    }

    /// Close pooled sessions.
    pub async fn shutdown(&self) {
        self.pool.close_all().await;
        tracing::info!("Engine shutdown complete");
    }

    async fn run_devices(&self, deadline: Instant) -> Vec<DeviceReport> {
        let mut tasks = JoinSet::new();
        let mut names = HashMap::with_capacity(self.devices.len());
        for device in &self.devices {
            let worker = DeviceWorker {
                device: Arc::clone(device),
                registry: Arc::clone(&self.registry),
                connector: Arc::clone(&self.connector),
                pool: Arc::clone(&self.pool),
                limiter: self.limiter.clone(),
                timeout: self.options.timeout,
            };
            let handle = tasks.spawn(worker.run(deadline));
            names.insert(handle.id(), device.name.clone());
        }

        let started = Instant::now();
        let mut reports: HashMap<String, DeviceReport> = HashMap::with_capacity(self.devices.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, report)) => {
                    reports.insert(report.device.clone(), report);
                }
                Err(e) => {
                    let Some(name) = names.get(&e.id()) else {
                        continue;
                    };
                    tracing::error!(device = %name, error = %e, "Device worker failed");
                    reports.insert(
                        name.clone(),
                        DeviceReport::down(name.as_str(), started.elapsed(), DeviceError::Panicked),
                    );
                }
            }
        }

        // One report per configured device, in configuration order.
        self.devices
            .iter()
            .map(|device| {
                reports.remove(&device.name).unwrap_or_else(|| {
                    DeviceReport::down(device.name.as_str(), started.elapsed(), DeviceError::DeadlineExceeded)
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("devices", &self.devices.len())
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
