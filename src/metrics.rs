//! Metric Sink
//!
//! Observations produced by collectors and the engine, the sink they are
//! written to, and rendering to the Prometheus text format.

mod exposition;
mod observation;
mod sink;

pub use exposition::{ExpositionError, exporter_registry, render};
pub use observation::{Labels, MetricDesc, MetricKind, Observation};
pub use sink::{MetricSink, ObservationBuffer};
