//! Connection tracking table usage.

use crate::client::Command;
use crate::collector::parse::observe_numbers;
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const GAUGES: &[(&str, MetricDesc)] = &[
    ("total-entries", MetricDesc::gauge("mikrotik_conntrack_entries", "Number of tracked connections")),
    ("max-entries", MetricDesc::gauge("mikrotik_conntrack_max_entries", "Conntrack table capacity")),
];

#[derive(Debug, Default)]
pub struct ConntrackCollector;

#[async_trait::async_trait]
impl FeatureCollector for ConntrackCollector {
    fn feature(&self) -> Feature {
        Feature::Conntrack
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let rows = ctx
            .rows(
                Command::new("/ip/firewall/connection/tracking/print")
                    .proplist(&["total-entries", "max-entries"]),
            )
            .await?;

        let labels = ctx.labels();
        let mut out = Vec::new();
        for row in &rows {
            observe_numbers(row, GAUGES, &labels, &mut out);
        }
        Ok(out)
    }
}
