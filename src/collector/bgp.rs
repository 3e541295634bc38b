//! BGP peer state from `/routing/bgp/peer/print`.

use crate::client::Command;
use crate::collector::parse::{bool_value, observe_numbers};
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const PROPS: &[&str] = &[
    "name",
    "remote-as",
    "state",
    "prefix-count",
    "updates-sent",
    "updates-received",
    "withdrawn-sent",
    "withdrawn-received",
];

const UP: MetricDesc = MetricDesc::gauge("mikrotik_bgp_up", "BGP session is established (up = 1)");

const VALUES: &[(&str, MetricDesc)] = &[
    ("prefix-count", MetricDesc::gauge("mikrotik_bgp_prefix_count", "number of prefixes received")),
    ("updates-sent", MetricDesc::counter("mikrotik_bgp_updates_sent", "number of updates sent")),
    ("updates-received", MetricDesc::counter("mikrotik_bgp_updates_received", "number of updates received")),
    ("withdrawn-sent", MetricDesc::counter("mikrotik_bgp_withdrawn_sent", "number of withdrawals sent")),
    ("withdrawn-received", MetricDesc::counter("mikrotik_bgp_withdrawn_received", "number of withdrawals received")),
];

#[derive(Debug, Default)]
pub struct BgpCollector;

#[async_trait::async_trait]
impl FeatureCollector for BgpCollector {
    fn feature(&self) -> Feature {
        Feature::Bgp
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let rows = ctx
            .rows(Command::new("/routing/bgp/peer/print").proplist(PROPS))
            .await?;

        let mut out = Vec::new();
        for row in &rows {
            let labels = ctx
                .labels()
                .with("session", row.get_or_empty("name"))
                .with("asn", row.get_or_empty("remote-as"));

            let state = row.get_or_empty("state");
            out.push(UP.observe(
                bool_value(state == "established"),
                labels.clone().with("state", state),
            ));
            observe_numbers(row, VALUES, &labels, &mut out);
        }
        Ok(out)
    }
}
