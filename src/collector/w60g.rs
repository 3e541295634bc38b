//! 60 GHz link state from `/interface/w60g/monitor`.

use crate::client::Command;
use crate::collector::parse::observe_numbers;
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const VALUES: &[(&str, MetricDesc)] = &[
    ("signal", MetricDesc::gauge("mikrotik_w60g_signal", "Signal quality")),
    ("rssi", MetricDesc::gauge("mikrotik_w60g_rssi", "Received signal strength indicator")),
    ("tx-mcs", MetricDesc::gauge("mikrotik_w60g_tx_mcs", "TX modulation and coding scheme index")),
    ("frequency", MetricDesc::gauge("mikrotik_w60g_frequency", "Frequency (MHz)")),
    ("tx-phy-rate", MetricDesc::gauge("mikrotik_w60g_tx_phy_rate", "PHY rate (bps)")),
    ("tx-sector", MetricDesc::gauge("mikrotik_w60g_tx_sector", "TX sector")),
    ("distance", MetricDesc::gauge("mikrotik_w60g_distance", "Distance to remote (m)")),
    ("tx-packet-error-rate", MetricDesc::gauge("mikrotik_w60g_tx_packet_error_rate", "TX packet error rate")),
];

#[derive(Debug, Default)]
pub struct W60gCollector;

#[async_trait::async_trait]
impl FeatureCollector for W60gCollector {
    fn feature(&self) -> Feature {
        Feature::W60g
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let interfaces = ctx
            .rows(Command::new("/interface/w60g/print").proplist(&["name"]))
            .await?;
        let names: Vec<&str> = interfaces.iter().filter_map(|row| row.get("name")).collect();

        let mut props = vec!["name"];
        props.extend(VALUES.iter().map(|(field, _)| *field));
        let rows = ctx
            .monitor_once("/interface/w60g/monitor", &names, &props)
            .await?;

        let mut out = Vec::new();
        for row in &rows {
            let labels = ctx.labels().with("interface", row.get_or_empty("name"));
            observe_numbers(row, VALUES, &labels, &mut out);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockReply, MockSession};
    use crate::collector::testing::{context, value_of};

    #[tokio::test]
    async fn test_w60g_monitor() {
        let session = MockSession::new("edge")
            .reply("/interface/w60g/print", MockReply::row(&[("name", "wlan60-1")]))
            .reply(
                "/interface/w60g/monitor",
                MockReply::row(&[
                    ("name", "wlan60-1"),
                    ("signal", "80"),
                    ("rssi", "-55"),
                    ("frequency", "58320"),
                    ("distance", "210.5m"),
                ]),
            );

        let obs = W60gCollector.collect(&context(session)).await.unwrap();
        assert_eq!(obs.len(), 4);
        assert_eq!(value_of(&obs, "mikrotik_w60g_rssi", "wlan60-1"), Some(-55.0));
        assert_eq!(value_of(&obs, "mikrotik_w60g_distance", "wlan60-1"), Some(210.5));
    }
}
