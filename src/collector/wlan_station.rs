//! Wireless clients from `/interface/wireless/registration-table/print`.

use crate::client::Command;
use crate::collector::parse::{observe_numbers, observe_pair};
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const PROPS: &[&str] = &[
    "interface",
    "mac-address",
    "signal-to-noise",
    "signal-strength",
    "packets",
    "bytes",
    "frames",
];

const SIGNALS: &[(&str, MetricDesc)] = &[
    ("signal-to-noise", MetricDesc::gauge("mikrotik_wlan_station_signal_to_noise", "signal to noise ratio (dB)")),
    ("signal-strength", MetricDesc::gauge("mikrotik_wlan_station_signal_strength", "received signal strength (dBm)")),
];

const PAIRS: &[(&str, (MetricDesc, MetricDesc))] = &[
    (
        "bytes",
        (
            MetricDesc::counter("mikrotik_wlan_station_tx_bytes", "number of bytes sent to the station"),
            MetricDesc::counter("mikrotik_wlan_station_rx_bytes", "number of bytes received from the station"),
        ),
    ),
    (
        "packets",
        (
            MetricDesc::counter("mikrotik_wlan_station_tx_packets", "number of packets sent to the station"),
            MetricDesc::counter("mikrotik_wlan_station_rx_packets", "number of packets received from the station"),
        ),
    ),
    (
        "frames",
        (
            MetricDesc::counter("mikrotik_wlan_station_tx_frames", "number of frames sent to the station"),
            MetricDesc::counter("mikrotik_wlan_station_rx_frames", "number of frames received from the station"),
        ),
    ),
];

#[derive(Debug, Default)]
pub struct WlanStationCollector;

#[async_trait::async_trait]
impl FeatureCollector for WlanStationCollector {
    fn feature(&self) -> Feature {
        Feature::Wlansta
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let rows = ctx
            .rows(Command::new("/interface/wireless/registration-table/print").proplist(PROPS))
            .await?;

        let mut out = Vec::new();
        for row in &rows {
            let labels = ctx
                .labels()
                .with("interface", row.get_or_empty("interface"))
                .with("mac_address", row.get_or_empty("mac-address"));

            observe_numbers(row, SIGNALS, &labels, &mut out);
            for (field, descs) in PAIRS {
                observe_pair(row, field, *descs, &labels, &mut out);
            }
        }
        Ok(out)
    }
}
