//! Interface traffic counters from `/interface/print`.

use crate::client::Command;
use crate::collector::parse::{bool_value, observe_numbers, parse_bool, parse_number};
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const PROPS: &[&str] = &[
    "name",
    "type",
    "disabled",
    "comment",
    "running",
    "slave",
    "actual-mtu",
    "rx-byte",
    "tx-byte",
    "rx-packet",
    "tx-packet",
    "rx-error",
    "tx-error",
    "rx-drop",
    "tx-drop",
    "link-downs",
];

const COUNTERS: &[(&str, MetricDesc)] = &[
    ("rx-byte", MetricDesc::counter("mikrotik_interface_rx_byte", "number of received bytes")),
    ("tx-byte", MetricDesc::counter("mikrotik_interface_tx_byte", "number of transmitted bytes")),
    ("rx-packet", MetricDesc::counter("mikrotik_interface_rx_packet", "number of received packets")),
    ("tx-packet", MetricDesc::counter("mikrotik_interface_tx_packet", "number of transmitted packets")),
    ("rx-error", MetricDesc::counter("mikrotik_interface_rx_error", "number of receive errors")),
    ("tx-error", MetricDesc::counter("mikrotik_interface_tx_error", "number of transmit errors")),
    ("rx-drop", MetricDesc::counter("mikrotik_interface_rx_drop", "number of dropped received packets")),
    ("tx-drop", MetricDesc::counter("mikrotik_interface_tx_drop", "number of dropped transmitted packets")),
    ("link-downs", MetricDesc::counter("mikrotik_interface_link_downs", "number of times the link went down")),
];

const ACTUAL_MTU: MetricDesc =
    MetricDesc::gauge("mikrotik_interface_actual_mtu", "effective MTU of the interface");
const RUNNING: MetricDesc =
    MetricDesc::gauge("mikrotik_interface_running", "whether the interface is running");

/// Collects per-interface counters. Always enabled.
#[derive(Debug, Default)]
pub struct InterfaceCollector;

#[async_trait::async_trait]
impl FeatureCollector for InterfaceCollector {
    fn feature(&self) -> Feature {
        Feature::Interface
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let rows = ctx
            .rows(Command::new("/interface/print").proplist(PROPS))
            .await?;

        let mut out = Vec::new();
        for row in &rows {
            let labels = ctx
                .labels()
                .with("interface", row.get_or_empty("name"))
                .with("type", row.get_or_empty("type"))
                .with("disabled", row.get_or_empty("disabled"))
                .with("comment", row.get_or_empty("comment"))
                .with("running", row.get_or_empty("running"))
                .with("slave", row.get_or_empty("slave"));

            observe_numbers(row, COUNTERS, &labels, &mut out);
            if let Some(mtu) = row.get("actual-mtu").and_then(parse_number) {
                out.push(ACTUAL_MTU.observe(mtu, labels.clone()));
            }
            if let Some(running) = row.get("running").and_then(parse_bool) {
                out.push(RUNNING.observe(bool_value(running), labels));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::testing::{context, value_of};
    use crate::client::mock::{MockReply, MockSession};
    use crate::metrics::MetricKind;

    #[tokio::test]
    async fn test_interface_counters_and_labels() {
        let session = MockSession::new("edge").reply(
            "/interface/print",
            MockReply::rows(vec![
                vec![
                    ("name", "ether1"),
                    ("type", "ether"),
                    ("disabled", "false"),
                    ("running", "true"),
                    ("slave", "false"),
                    ("actual-mtu", "1500"),
                    ("rx-byte", "1000"),
                    ("tx-byte", "2000"),
                    ("link-downs", "3"),
                ],
                vec![("name", "wlan1"), ("running", "false"), ("rx-byte", "n/a")],
            ]),
        );

        let obs = InterfaceCollector.collect(&context(session)).await.unwrap();

        let rx = obs
            .iter()
            .find(|o| o.name == "mikrotik_interface_rx_byte")
            .unwrap();
        assert_eq!(rx.kind, MetricKind::Counter);
        assert_eq!(
            rx.labels.names(),
            vec!["name", "address", "interface", "type", "disabled", "comment", "running", "slave"]
        );
        assert_eq!(value_of(&obs, "mikrotik_interface_tx_byte", "ether1"), Some(2000.0));
        assert_eq!(value_of(&obs, "mikrotik_interface_link_downs", "ether1"), Some(3.0));
        assert_eq!(value_of(&obs, "mikrotik_interface_actual_mtu", "ether1"), Some(1500.0));
        assert_eq!(value_of(&obs, "mikrotik_interface_running", "wlan1"), Some(0.0));
        assert_eq!(value_of(&obs, "mikrotik_interface_rx_byte", "wlan1"), None);
    }
}
