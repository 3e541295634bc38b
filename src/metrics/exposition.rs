//! Prometheus text exposition.

use std::collections::BTreeMap;

use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use thiserror::Error;

use crate::metrics::{MetricKind, Observation};

/// Errors while rendering the exposition.
#[derive(Debug, Error)]
pub enum ExpositionError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("exposition is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Registry for the exporter's own metrics: build info and, on Linux,
/// process statistics.
pub fn exporter_registry() -> Result<Registry, ExpositionError> {
    let registry = Registry::new();

    let build_info = GaugeVec::new(
        Opts::new(
            "mikrotik_exporter_build_info",
            "A metric with a constant '1' value labeled by version",
        ),
        &["version"],
    )?;
    build_info
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .set(1.0);
    registry.register(Box::new(build_info))?;

    #[cfg(target_os = "linux")]
    registry.register(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))?;

    Ok(registry)
}

/// Render one scrape's observations, followed by the exporter registry.
///
/// Observations are grouped by metric name. The first observation of a name
/// fixes its help text, kind and label names; later observations that
/// disagree are dropped with a warning instead of failing the scrape.
pub fn render(observations: &[Observation], exporter: &Registry) -> Result<String, ExpositionError> {
    let scrape = Registry::new();

    let mut families: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for observation in observations {
        families.entry(&observation.name).or_default().push(observation);
    }

    for (name, samples) in families {
        if let Err(e) = register_family(&scrape, name, &samples) {
            tracing::warn!(metric = %name, error = %e, "Skipping metric family");
        }
    }

    let mut metric_families = scrape.gather();
    metric_families.extend(exporter.gather());

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

fn register_family(
    registry: &Registry,
    name: &str,
    samples: &[&Observation],
) -> Result<(), ExpositionError> {
    let Some(first) = samples.first() else {
        return Ok(());
    };
    let label_names = first.labels.names();
    let opts = Opts::new(name, first.help.as_str());

    let consistent = samples.iter().filter(|s| {
        let ok = s.kind == first.kind && s.labels.names() == label_names;
        if !ok {
            tracing::warn!(metric = %name, labels = ?s.labels, "Dropping sample with inconsistent kind or labels");
        }
        ok
    });

    match first.kind {
        MetricKind::Gauge => {
            let vec = GaugeVec::new(opts, &label_names)?;
            for sample in consistent {
                vec.get_metric_with_label_values(&sample.labels.values())?
                    .set(sample.value);
            }
            registry.register(Box::new(vec))?;
        }
        MetricKind::Counter => {
            let vec = CounterVec::new(opts, &label_names)?;
            for sample in consistent {
                if !sample.value.is_finite() || sample.value < 0.0 {
                    tracing::warn!(metric = %name, value = sample.value, "Dropping invalid counter value");
                    continue;
                }
                let counter = vec.get_metric_with_label_values(&sample.labels.values())?;
                // Duplicate series report the latest value.
                counter.reset();
                counter.inc_by(sample.value);
            }
            registry.register(Box::new(vec))?;
        }
    }
    Ok(())
}
