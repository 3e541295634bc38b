//! Ethernet link state from `/interface/ethernet/monitor`.

use crate::client::Command;
use crate::collector::parse::{bool_value, parse_bool, parse_rate_mbps};
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const STATUS: MetricDesc = MetricDesc::gauge("mikrotik_monitor_status", "whether interface link is up (link-ok = 1)");
const RATE: MetricDesc = MetricDesc::gauge("mikrotik_monitor_rate", "actual link speed (Mbps)");
const FULL_DUPLEX: MetricDesc = MetricDesc::gauge("mikrotik_monitor_full_duplex", "whether link is full duplex");

#[derive(Debug, Default)]
pub struct MonitorCollector;

#[async_trait::async_trait]
impl FeatureCollector for MonitorCollector {
    fn feature(&self) -> Feature {
        Feature::Monitor
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let ports = ctx
            .rows(
                Command::new("/interface/ethernet/print")
                    .query("disabled", "false")
                    .proplist(&["name"]),
            )
            .await?;
        let names: Vec<&str> = ports.iter().filter_map(|row| row.get("name")).collect();

        let rows = ctx
            .monitor_once(
                "/interface/ethernet/monitor",
                &names,
                &["name", "status", "rate", "full-duplex"],
            )
            .await?;

        let mut out = Vec::new();
        for row in &rows {
            let labels = ctx.labels().with("interface", row.get_or_empty("name"));

            if let Some(status) = row.get("status") {
                out.push(STATUS.observe(
                    bool_value(status == "link-ok"),
                    labels.clone().with("status", status),
                ));
            }
            if let Some(rate) = row.get("rate").and_then(parse_rate_mbps) {
                out.push(RATE.observe(rate, labels.clone()));
            }
            if let Some(full) = row.get("full-duplex").and_then(parse_bool) {
                out.push(FULL_DUPLEX.observe(bool_value(full), labels));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockReply, MockSession};
    use crate::collector::testing::{context, find, value_of};

    #[tokio::test]
    async fn test_link_monitor() {
        let session = MockSession::new("edge")
            .reply(
                "/interface/ethernet/print",
                MockReply::rows(vec![vec![("name", "ether1")], vec![("name", "ether2")]]),
            )
            .reply(
                "/interface/ethernet/monitor",
                MockReply::rows(vec![
                    vec![("name", "ether1"), ("status", "link-ok"), ("rate", "1Gbps"), ("full-duplex", "true")],
                    vec![("name", "ether2"), ("status", "no-link")],
                ]),
            );

        let obs = MonitorCollector.collect(&context(session)).await.unwrap();
        assert_eq!(value_of(&obs, "mikrotik_monitor_status", "ether1"), Some(1.0));
        assert_eq!(value_of(&obs, "mikrotik_monitor_rate", "ether1"), Some(1000.0));
        assert_eq!(value_of(&obs, "mikrotik_monitor_full_duplex", "ether1"), Some(1.0));
        let down = find(&obs, "mikrotik_monitor_status", "ether2").unwrap();
        assert_eq!(down.value, 0.0);
        assert_eq!(down.labels.get("status"), Some("no-link"));
        assert!(find(&obs, "mikrotik_monitor_rate", "ether2").is_none());
    }
}
