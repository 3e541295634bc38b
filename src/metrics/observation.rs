//! Observation and label types.

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// Prometheus metric type of an observation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Monotonically increasing value (bytes, packets, errors).
    Counter,
    /// Point-in-time value (temperature, load, state).
    Gauge,
}

/// Ordered label pairs.
///
/// Order is part of the metric identity: observations of one metric must
/// carry the same label names in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Labels(Vec<(String, String)>);

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn values(&self) -> Vec<&str> {
        self.0.iter().map(|(_, v)| v.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Labels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One metric sample produced by a scrape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub value: f64,
    pub labels: Labels,
}

impl Observation {
    pub fn gauge(name: impl Into<String>, help: impl Into<String>, value: f64, labels: Labels) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            kind: MetricKind::Gauge,
            value,
            labels,
        }
    }

    pub fn counter(
        name: impl Into<String>,
        help: impl Into<String>,
        value: f64,
        labels: Labels,
    ) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            kind: MetricKind::Counter,
            value,
            labels,
        }
    }

    /// Metric name plus label set: the series this sample belongs to.
    pub fn series(&self) -> (&str, &Labels) {
        (&self.name, &self.labels)
    }
}

/// Static description of a metric a collector emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
}

impl MetricDesc {
    pub const fn gauge(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Gauge,
        }
    }

    pub const fn counter(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Counter,
        }
    }

    /// Build an observation of this metric.
    pub fn observe(&self, value: f64, labels: Labels) -> Observation {
        Observation {
            name: self.name.to_string(),
            help: self.help.to_string(),
            kind: self.kind,
            value,
            labels,
        }
    }
}
