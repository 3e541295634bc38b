//! Per-device collection results.

use std::time::Duration;

use thiserror::Error;

use crate::client::ClientError;
use crate::collector::{CollectorError, Feature};
use crate::metrics::{Labels, MetricDesc, Observation};

const UP: MetricDesc = MetricDesc::gauge(
    "mikrotik_up",
    "Whether the device could be reached and authenticated (1 = up)",
);
const DURATION: MetricDesc = MetricDesc::gauge(
    "mikrotik_scrape_collector_duration_seconds",
    "Time spent collecting metrics from the device",
);
const SUCCESS: MetricDesc = MetricDesc::gauge(
    "mikrotik_scrape_collector_success",
    "Whether a feature collector succeeded for the device",
);

/// Why a device is reported down.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The scrape deadline passed before the device finished.
    #[error("scrape deadline exceeded")]
    DeadlineExceeded,

    #[error("device worker panicked")]
    Panicked,
}

impl DeviceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Client(e) => e.kind(),
            Self::DeadlineExceeded => "deadline",
            Self::Panicked => "panic",
        }
    }
}

/// Why a feature produced no observations.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error(transparent)]
    Collector(#[from] CollectorError),

    #[error("collector panicked")]
    Panicked,
}

/// Outcome of one feature for one device.
#[derive(Debug)]
pub struct FeatureOutcome {
    pub feature: Feature,
    pub duration: Duration,
    /// Number of observations on success.
    pub result: Result<usize, FeatureError>,
}

impl FeatureOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Whether the feature was cut off by the device timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self.result, Err(FeatureError::Collector(CollectorError::Timeout)))
    }
}

/// Collection result for one device in one scrape.
#[derive(Debug)]
pub struct DeviceReport {
    pub device: String,
    pub up: bool,
    pub duration: Duration,
    pub error: Option<DeviceError>,
    pub features: Vec<FeatureOutcome>,
    pub observations: Vec<Observation>,
}

impl DeviceReport {
    /// A device that was reached; observations come from successful features.
    pub fn up(
        device: impl Into<String>,
        duration: Duration,
        features: Vec<FeatureOutcome>,
        observations: Vec<Observation>,
    ) -> Self {
        Self {
            device: device.into(),
            up: true,
            duration,
            error: None,
            features,
            observations,
        }
    }

    /// A device that could not be collected. Carries no domain observations.
    pub fn down(device: impl Into<String>, duration: Duration, error: DeviceError) -> Self {
        Self {
            device: device.into(),
            up: false,
            duration,
            error: Some(error),
            features: Vec::new(),
            observations: Vec::new(),
        }
    }

    /// Device-level observations followed by the domain observations.
    pub fn into_observations(self) -> Vec<Observation> {
        let labels = Labels::new().with("device", self.device.as_str());
        let mut out = Vec::with_capacity(self.observations.len() + self.features.len() + 2);

        out.push(UP.observe(if self.up { 1.0 } else { 0.0 }, labels.clone()));
        out.push(DURATION.observe(self.duration.as_secs_f64(), labels.clone()));
        for outcome in &self.features {
            out.push(SUCCESS.observe(
                if outcome.is_success() { 1.0 } else { 0.0 },
                labels.clone().with("collector", outcome.feature.as_ref()),
            ));
        }
        out.extend(self.observations);
        out
    }
}
