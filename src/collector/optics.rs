//! SFP diagnostics from `/interface/ethernet/monitor`.

use crate::client::{Command, Row};
use crate::collector::parse::{bool_value, observe_numbers, parse_bool};
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const MONITOR_PROPS: &[&str] = &[
    "name",
    "sfp-rx-loss",
    "sfp-tx-fault",
    "sfp-temperature",
    "sfp-supply-voltage",
    "sfp-tx-bias-current",
    "sfp-tx-power",
    "sfp-rx-power",
];

const VALUES: &[(&str, MetricDesc)] = &[
    ("sfp-temperature", MetricDesc::gauge("mikrotik_optics_temperature", "optics module temperature (C)")),
    ("sfp-supply-voltage", MetricDesc::gauge("mikrotik_optics_voltage", "optics module supply voltage (V)")),
    ("sfp-tx-bias-current", MetricDesc::gauge("mikrotik_optics_tx_bias", "optics transmit bias current (mA)")),
    ("sfp-tx-power", MetricDesc::gauge("mikrotik_optics_tx_power", "optics transmit power (dBm)")),
    ("sfp-rx-power", MetricDesc::gauge("mikrotik_optics_rx_power", "optics receive power (dBm)")),
];

const RX_STATUS: MetricDesc = MetricDesc::gauge("mikrotik_optics_rx_status", "optics receive signal present (no rx loss = 1)");
const TX_STATUS: MetricDesc = MetricDesc::gauge("mikrotik_optics_tx_status", "optics transmitter healthy (no tx fault = 1)");

#[derive(Debug, Default)]
pub struct OpticsCollector;

fn is_sfp(row: &Row) -> bool {
    ["name", "default-name"]
        .iter()
        .filter_map(|key| row.get(key))
        .any(|name| name.contains("sfp"))
}

#[async_trait::async_trait]
impl FeatureCollector for OpticsCollector {
    fn feature(&self) -> Feature {
        Feature::Optics
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let ports = ctx
            .rows(
                Command::new("/interface/ethernet/print")
                    .query("disabled", "false")
                    .proplist(&["name", "default-name"]),
            )
            .await?;
        let names: Vec<&str> = ports
            .iter()
            .filter(|row| is_sfp(row))
            .filter_map(|row| row.get("name"))
            .collect();

        let rows = ctx
            .monitor_once("/interface/ethernet/monitor", &names, MONITOR_PROPS)
            .await?;

        let mut out = Vec::new();
        for row in &rows {
            // Empty SFP cages report no diagnostics.
            if row.get("sfp-temperature").is_none() {
                continue;
            }
            let labels = ctx.labels().with("interface", row.get_or_empty("name"));

            if let Some(loss) = row.get("sfp-rx-loss").and_then(parse_bool) {
                out.push(RX_STATUS.observe(bool_value(!loss), labels.clone()));
            }
            if let Some(fault) = row.get("sfp-tx-fault").and_then(parse_bool) {
                out.push(TX_STATUS.observe(bool_value(!fault), labels.clone()));
            }
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
    async fn test_sfp_diagnostics() {
        let session = MockSession::new("edge")
            .reply(
                "/interface/ethernet/print",
                MockReply::rows(vec![
                    vec![("name", "ether1"), ("default-name", "ether1")],
                    vec![("name", "uplink"), ("default-name", "sfp-sfpplus1")],
                    vec![("name", "sfp2"), ("default-name", "sfp2")],
                ]),
            )
            .reply(
                "/interface/ethernet/monitor",
                MockReply::rows(vec![
                    vec![
                        ("name", "uplink"),
                        ("sfp-rx-loss", "false"),
                        ("sfp-tx-fault", "true"),
                        ("sfp-temperature", "41C"),
                        ("sfp-rx-power", "-7.2"),
                    ],
                    vec![("name", "sfp2"), ("status", "no-link")],
                ]),
            );
        let log = session.command_log();

        let obs = OpticsCollector.collect(&context(session)).await.unwrap();
        assert_eq!(value_of(&obs, "mikrotik_optics_rx_status", "uplink"), Some(1.0));
        assert_eq!(value_of(&obs, "mikrotik_optics_tx_status", "uplink"), Some(0.0));
        assert_eq!(value_of(&obs, "mikrotik_optics_temperature", "uplink"), Some(41.0));
        assert_eq!(value_of(&obs, "mikrotik_optics_rx_power", "uplink"), Some(-7.2));
        assert!(obs.iter().all(|o| o.labels.get("interface") == Some("uplink")));
        assert!(log.lock().unwrap()[1].contains("=numbers=uplink,sfp2"));
    }
}
