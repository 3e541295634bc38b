//! Helpers shared by collector tests.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::client::mock::MockSession;
use crate::client::{Device, Session};
use crate::collector::CollectContext;
use crate::metrics::Observation;

/// Context for device `edge` at `10.0.0.1` with a generous deadline.
pub(crate) fn context(session: MockSession) -> CollectContext {
    let device = Arc::new(Device::new("edge", "10.0.0.1"));
    let session: Box<dyn Session> = Box::new(session);
    CollectContext::new(
        device,
        Arc::new(Mutex::new(session)),
        Instant::now() + Duration::from_secs(5),
    )
}

/// First observation named `name` with any label equal to `label_value`.
pub(crate) fn find<'a>(
    observations: &'a [Observation],
    name: &str,
    label_value: &str,
) -> Option<&'a Observation> {
    observations
        .iter()
        .find(|o| o.name == name && o.labels.iter().any(|(_, v)| v == label_value))
}

pub(crate) fn value_of(observations: &[Observation], name: &str, label_value: &str) -> Option<f64> {
    find(observations, name, label_value).map(|o| o.value)
}
