//! PoE output state from `/interface/ethernet/poe/monitor`.

use crate::client::Command;
use crate::collector::parse::{bool_value, observe_numbers};
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const VALUES: &[(&str, MetricDesc)] = &[
    ("poe-out-current", MetricDesc::gauge("mikrotik_poe_out_current", "current drawn by the PoE device (mA)")),
    ("poe-out-voltage", MetricDesc::gauge("mikrotik_poe_out_voltage", "PoE output voltage (V)")),
    ("poe-out-power", MetricDesc::gauge("mikrotik_poe_out_power", "power drawn by the PoE device (W)")),
];

const STATUS: MetricDesc =
    MetricDesc::gauge("mikrotik_poe_out_status", "PoE output is powering a device (powered-on = 1)");

#[derive(Debug, Default)]
pub struct PoeCollector;

#[async_trait::async_trait]
impl FeatureCollector for PoeCollector {
    fn feature(&self) -> Feature {
        Feature::Poe
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let ports = ctx
            .rows(Command::new("/interface/ethernet/poe/print").proplist(&["name"]))
            .await?;
        let names: Vec<&str> = ports.iter().filter_map(|row| row.get("name")).collect();
        let rows = ctx
            .monitor_once(
                "/interface/ethernet/poe/monitor",
                &names,
                &["name", "poe-out-status", "poe-out-voltage", "poe-out-current", "poe-out-power"],
            )
            .await?;

        let mut out = Vec::new();
        for row in &rows {
            let labels = ctx.labels().with("interface", row.get_or_empty("name"));
            if let Some(status) = row.get("poe-out-status") {
                out.push(STATUS.observe(
                    bool_value(status == "powered-on"),
                    labels.clone().with("status", status),
                ));
            }
            observe_numbers(row, VALUES, &labels, &mut out);
        }
        Ok(out)
    }
}
