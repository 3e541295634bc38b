//! Wireless interface state from `/interface/wireless/monitor`.

use crate::client::Command;
use crate::collector::parse::observe_numbers;
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const VALUES: &[(&str, MetricDesc)] = &[
    ("registered-clients", MetricDesc::gauge("mikrotik_wlan_interface_registered_clients", "number of registered clients")),
    ("noise-floor", MetricDesc::gauge("mikrotik_wlan_interface_noise_floor", "noise floor (dBm)")),
    ("overall-tx-ccq", MetricDesc::gauge("mikrotik_wlan_interface_overall_tx_ccq", "overall transmit CCQ (%)")),
];

#[derive(Debug, Default)]
pub struct WlanInterfaceCollector;

#[async_trait::async_trait]
impl FeatureCollector for WlanInterfaceCollector {
    fn feature(&self) -> Feature {
        Feature::Wlanif
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let interfaces = ctx
            .rows(
                Command::new("/interface/wireless/print")
                    .query("disabled", "false")
                    .proplist(&["name"]),
            )
            .await?;
        let names: Vec<&str> = interfaces.iter().filter_map(|row| row.get("name")).collect();

        let rows = ctx
            .monitor_once(
                "/interface/wireless/monitor",
                &names,
                &["name", "channel", "registered-clients", "noise-floor", "overall-tx-ccq"],
            )
            .await?;

        let mut out = Vec::new();
        for row in &rows {
            let labels = ctx
                .labels()
                .with("interface", row.get_or_empty("name"))
                .with("channel", row.get_or_empty("channel"));
            observe_numbers(row, VALUES, &labels, &mut out);
        }
        Ok(out)
    }
}
