//! CAPsMAN clients from `/caps-man/registration-table/print`.

use crate::client::Command;
use crate::collector::parse::{observe_numbers, observe_pair, parse_duration};
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const PROPS: &[&str] = &[
    "interface",
    "mac-address",
    "ssid",
    "uptime",
    "tx-signal",
    "rx-signal",
    "packets",
    "bytes",
];

const UPTIME: MetricDesc = MetricDesc::gauge("mikrotik_capsman_station_uptime", "station uptime (seconds)");

const SIGNALS: &[(&str, MetricDesc)] = &[
    ("tx-signal", MetricDesc::gauge("mikrotik_capsman_station_tx_signal", "station transmit signal strength (dBm)")),
    ("rx-signal", MetricDesc::gauge("mikrotik_capsman_station_rx_signal", "station receive signal strength (dBm)")),
];

const BYTES: (MetricDesc, MetricDesc) = (
    MetricDesc::counter("mikrotik_capsman_station_tx_bytes", "number of bytes sent to the station"),
    MetricDesc::counter("mikrotik_capsman_station_rx_bytes", "number of bytes received from the station"),
);

const PACKETS: (MetricDesc, MetricDesc) = (
    MetricDesc::counter("mikrotik_capsman_station_tx_packets", "number of packets sent to the station"),
    MetricDesc::counter("mikrotik_capsman_station_rx_packets", "number of packets received from the station"),
);

#[derive(Debug, Default)]
pub struct CapsmanCollector;

#[async_trait::async_trait]
impl FeatureCollector for CapsmanCollector {
    fn feature(&self) -> Feature {
        Feature::Capsman
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let rows = ctx
            .rows(Command::new("/caps-man/registration-table/print").proplist(PROPS))
            .await?;

        let mut out = Vec::new();
        for row in &rows {
            let labels = ctx
                .labels()
                .with("interface", row.get_or_empty("interface"))
                .with("mac_address", row.get_or_empty("mac-address"))
                .with("ssid", row.get_or_empty("ssid"));

            if let Some(uptime) = row.get("uptime").and_then(parse_duration) {
                out.push(UPTIME.observe(uptime, labels.clone()));
            }
            observe_numbers(row, SIGNALS, &labels, &mut out);
            observe_pair(row, "bytes", BYTES, &labels, &mut out);
            observe_pair(row, "packets", PACKETS, &labels, &mut out);
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
    async fn test_capsman_stations() {
        let session = MockSession::new("edge").reply(
            "/caps-man/registration-table/print",
            MockReply::row(&[
                ("interface", "cap1"),
                ("mac-address", "AA:BB:CC:00:11:33"),
                ("ssid", "office"),
                ("uptime", "1h2m3s"),
                ("tx-signal", "-55"),
                ("rx-signal", "-60"),
                ("bytes", "10,20"),
                ("packets", "1,2"),
            ]),
        );

        let obs = CapsmanCollector.collect(&context(session)).await.unwrap();
        assert_eq!(obs.len(), 7);
        assert_eq!(value_of(&obs, "mikrotik_capsman_station_uptime", "office"), Some(3723.0));
        assert_eq!(value_of(&obs, "mikrotik_capsman_station_rx_bytes", "office"), Some(20.0));
        let tx = find(&obs, "mikrotik_capsman_station_tx_signal", "office").unwrap();
        assert_eq!(tx.labels.names(), vec!["name", "address", "interface", "mac_address", "ssid"]);
    }
}
