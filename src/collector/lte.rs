//! LTE radio quality from `/interface/lte/info`.

use crate::client::Command;
use crate::collector::parse::observe_numbers;
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const VALUES: &[(&str, MetricDesc)] = &[
    ("rssi", MetricDesc::gauge("mikrotik_lte_rssi", "received signal strength indicator (dBm)")),
    ("rsrp", MetricDesc::gauge("mikrotik_lte_rsrp", "reference signal received power (dBm)")),
    ("rsrq", MetricDesc::gauge("mikrotik_lte_rsrq", "reference signal received quality (dB)")),
    ("sinr", MetricDesc::gauge("mikrotik_lte_sinr", "signal to interference plus noise ratio (dB)")),
];

#[derive(Debug, Default)]
pub struct LteCollector;

#[async_trait::async_trait]
impl FeatureCollector for LteCollector {
    fn feature(&self) -> Feature {
        Feature::Lte
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let interfaces = ctx
            .rows(
                Command::new("/interface/lte/print")
                    .query("disabled", "false")
                    .proplist(&["name"]),
            )
            .await?;

        let mut out = Vec::new();
        // `info` only accepts a single interface per call.
        for name in interfaces.iter().filter_map(|row| row.get("name")) {
            let rows = ctx
                .rows(
                    Command::new("/interface/lte/info")
                        .attr("number", name)
                        .once()
                        .proplist(&["current-cellid", "primary-band", "ca-band", "rssi", "rsrp", "rsrq", "sinr"]),
                )
                .await?;

            for row in &rows {
                let labels = ctx
                    .labels()
                    .with("interface", name)
                    .with("cell_id", row.get_or_empty("current-cellid"))
                    .with("primary_band", row.get_or_empty("primary-band"))
                    .with("ca_band", row.get_or_empty("ca-band"));
                observe_numbers(row, VALUES, &labels, &mut out);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockReply, MockSession};
    use crate::collector::testing::{context, find};

    #[tokio::test]
    async fn test_lte_info() {
        let session = MockSession::new("edge")
            .reply("/interface/lte/print", MockReply::row(&[("name", "lte1")]))
            .reply(
                "/interface/lte/info",
                MockReply::row(&[
                    ("current-cellid", "20561921"),
                    ("primary-band", "B3@20Mhz earfcn: 1300"),
                    ("rssi", "-71"),
                    ("rsrp", "-98"),
                    ("rsrq", "-11"),
                    ("sinr", "9"),
                ]),
            );
        let log = session.command_log();

        let obs = LteCollector.collect(&context(session)).await.unwrap();
        assert_eq!(obs.len(), 4);
        let rsrp = find(&obs, "mikrotik_lte_rsrp", "lte1").unwrap();
        assert_eq!(rsrp.value, -98.0);
        assert_eq!(rsrp.labels.get("cell_id"), Some("20561921"));
        assert_eq!(rsrp.labels.get("ca_band"), Some(""));
        assert!(log.lock().unwrap()[1].contains("=number=lte1"));
    }
}
