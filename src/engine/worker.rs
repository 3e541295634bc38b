//! Collection of one device: session acquisition, feature fan-out, release.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};

use crate::client::{ClientError, Connector, Device, Lease, Session, SessionPool};
use crate::collector::{CollectContext, CollectorRegistry};
use crate::engine::report::{DeviceError, DeviceReport, FeatureError, FeatureOutcome};
use crate::metrics::Observation;

/// Everything needed to collect one device, cloned into its task.
pub(crate) struct DeviceWorker {
    pub device: Arc<Device>,
    pub registry: Arc<CollectorRegistry>,
    pub connector: Arc<dyn Connector>,
    pub pool: Arc<SessionPool>,
    pub limiter: Option<Arc<Semaphore>>,
    pub timeout: Duration,
}

/// A finished collection, plus the session still to be released.
struct Collected {
    report: DeviceReport,
    release: Option<(Lease, Box<dyn Session>)>,
}

impl DeviceWorker {
    /// Collect the device, never running past `deadline`.
    ///
    /// The session is released on a detached task once the report is built.
    /// The lease travels with it, so the next scrape of this device waits for
    /// the release instead of this one.
    pub async fn run(self, deadline: Instant) -> DeviceReport {
        let started = Instant::now();
        match timeout_at(deadline, self.collect(started)).await {
            Ok(Collected { report, release }) => {
                if let Some((lease, session)) = release {
                    tokio::spawn(async move {
                        lease.release(session).await;
                    });
                }
                report
            }
            Err(_) => {
                tracing::warn!(device = %self.device.name, "Scrape deadline exceeded, discarding partial results");
                DeviceReport::down(
                    self.device.name.as_str(),
                    started.elapsed(),
                    DeviceError::DeadlineExceeded,
                )
            }
        }
    }

    async fn collect(&self, started: Instant) -> Collected {
        let name = self.device.name.as_str();

        // Waiting for a slot does not count against the device timeout.
        let _permit = match &self.limiter {
            Some(limiter) => Arc::clone(limiter).acquire_owned().await.ok(),
            None => None,
        };

        // Budget for the device: connect and login, then every query. The
        // scrape deadline is enforced by `run`.
        let device_deadline = Instant::now() + self.timeout;

        let (lease, session) = match self.acquire(device_deadline).await {
            Ok(acquired) => acquired,
            Err(e) => {
                tracing::warn!(device = %name, error = %e, kind = e.kind(), "Device unreachable");
                return Collected {
                    report: DeviceReport::down(name, started.elapsed(), e.into()),
                    release: None,
                };
            }
        };

        let shared = Arc::new(Mutex::new(session));
        let ctx = CollectContext::new(Arc::clone(&self.device), Arc::clone(&shared), device_deadline);
        // A feature that ran out of device budget may finish just before the
        // outer timer fires; both cases mark the whole device down.
        let collected = timeout_at(device_deadline, self.run_features(ctx))
            .await
            .ok()
            .filter(|(features, _)| !features.iter().any(FeatureOutcome::is_timeout));
        let Some((features, observations)) = collected else {
            // Aborted feature tasks drop the session with them.
            tracing::warn!(device = %name, timeout_ms = self.timeout.as_millis(), "Device timeout exceeded, discarding partial results");
            return Collected {
                report: DeviceReport::down(name, started.elapsed(), ClientError::Timeout.into()),
                release: None,
            };
        };

        let release = match Arc::try_unwrap(shared) {
            Ok(session) => Some((lease, session.into_inner())),
            // Every feature task has been joined; nothing else holds the session.
            Err(_) => None,
        };

        let failed = features.iter().filter(|f| !f.is_success()).count();
        tracing::debug!(
            device = %name,
            duration_ms = started.elapsed().as_millis(),
            features = features.len(),
            failed,
            observations = observations.len(),
            "Device collected"
        );

        Collected {
            report: DeviceReport::up(name, started.elapsed(), features, observations),
            release,
        }
    }

    async fn acquire(&self, device_deadline: Instant) -> Result<(Lease, Box<dyn Session>), ClientError> {
        let attempt = async {
            let mut lease = self.pool.lease(&self.device.name).await;
            if let Some(session) = lease.take().await {
                tracing::debug!(device = %self.device.name, "Reusing pooled session");
                return Ok((lease, session));
            }
            let budget = device_deadline.saturating_duration_since(Instant::now());
            let session = self.connector.connect(&self.device, budget).await?;
            Ok::<_, ClientError>((lease, session))
        };

        match timeout_at(device_deadline, attempt).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout),
        }
    }

    async fn run_features(&self, ctx: CollectContext) -> (Vec<FeatureOutcome>, Vec<Observation>) {
        let mut tasks = JoinSet::new();
        for collector in self.registry.collectors() {
            let collector = Arc::clone(collector);
            let ctx = ctx.clone();
            tasks.spawn(async move {
                let started = Instant::now();
                let result = AssertUnwindSafe(collector.collect(&ctx)).catch_unwind().await;
                (collector.feature(), started.elapsed(), result)
            });
        }
        drop(ctx);

        let mut outcomes = Vec::with_capacity(self.registry.len());
        let mut observations = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (feature, duration, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!(device = %self.device.name, error = %e, "Feature task failed to join");
                    continue;
                }
            };

            let result = match result {
                Ok(Ok(mut collected)) => {
                    let count = collected.len();
                    observations.append(&mut collected);
                    Ok(count)
                }
                Ok(Err(e)) => {
                    tracing::warn!(device = %self.device.name, feature = %feature, error = %e, "Feature collection failed");
                    Err(FeatureError::from(e))
                }
                Err(_) => {
                    tracing::error!(device = %self.device.name, feature = %feature, "Feature collector panicked");
                    Err(FeatureError::Panicked)
                }
            };
            outcomes.push(FeatureOutcome {
                feature,
                duration,
                result,
            });
        }

        outcomes.sort_by_key(|o| o.feature);
        (outcomes, observations)
    }
}
