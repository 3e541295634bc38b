//! Board sensors from `/system/health/print`.
//!
//! RouterOS 6 returns one row with a column per sensor; RouterOS 7 returns
//! one `name`/`value` row per sensor. Both become `mikrotik_health_<sensor>`.

use crate::client::{Command, Row};
use crate::collector::parse::{metric_name, parse_number};
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{Labels, Observation};

/// Columns that describe a v7 row rather than a sensor.
const METADATA_COLUMNS: &[&str] = &[".id", "name", "value", "type"];

#[derive(Debug, Default)]
pub struct HealthCollector;

#[async_trait::async_trait]
impl FeatureCollector for HealthCollector {
    fn feature(&self) -> Feature {
        Feature::Health
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let rows = ctx.rows(Command::new("/system/health/print")).await?;
        let labels = ctx.labels();

        let mut out = Vec::new();
        for row in &rows {
            match (row.get("name"), row.get("value")) {
                (Some(name), Some(value)) => {
                    push_sensor(name, value, row.get("type"), &labels, &mut out)
                }
                _ => collect_columns(row, &labels, &mut out),
            }
        }
        Ok(out)
    }
}

fn collect_columns(row: &Row, labels: &Labels, out: &mut Vec<Observation>) {
    for (column, value) in row.iter() {
        if !METADATA_COLUMNS.contains(&column) {
            push_sensor(column, value, None, labels, out);
        }
    }
}

fn push_sensor(sensor: &str, value: &str, unit: Option<&str>, labels: &Labels, out: &mut Vec<Observation>) {
    let fragment = metric_name(sensor);
    let Some(parsed) = parse_number(value) else {
        tracing::trace!(sensor, value, "Skipping non-numeric health sensor");
        return;
    };
    if fragment.is_empty() {
        return;
    }

    let help = match unit.filter(|u| !u.is_empty()) {
        Some(unit) => format!("{sensor} reported by system health ({unit})"),
        None => format!("{sensor} reported by system health"),
    };
    out.push(Observation::gauge(
        format!("mikrotik_health_{fragment}"),
        help,
        parsed,
        labels.clone(),
    ));
}
