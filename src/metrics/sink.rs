//! Destination for observations produced during a scrape.

use std::sync::{Mutex, PoisonError};

use crate::metrics::Observation;

/// Receives observations. Implementations must accept concurrent writers.
pub trait MetricSink: Send + Sync {
    fn record(&self, observation: Observation);

    fn record_all(&self, observations: Vec<Observation>) {
        for observation in observations {
            self.record(observation);
        }
    }
}

/// Sink that keeps every observation in memory for one scrape.
#[derive(Debug, Default)]
pub struct ObservationBuffer {
    observations: Mutex<Vec<Observation>>,
}

impl ObservationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the buffered observations, leaving the buffer empty.
    pub fn drain(&self) -> Vec<Observation> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Observation>> {
        // A panicking writer cannot leave the Vec half-updated.
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetricSink for ObservationBuffer {
    fn record(&self, observation: Observation) {
        self.lock().push(observation);
    }

    fn record_all(&self, mut observations: Vec<Observation>) {
        self.lock().append(&mut observations);
    }
}
