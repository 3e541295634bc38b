//! Active lease counts per DHCP server.

use crate::client::Command;
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const ACTIVE_LEASES: MetricDesc = MetricDesc::gauge(
    "mikrotik_dhcp_leases_active_count",
    "number of active leases per DHCP server",
);

#[derive(Debug, Default)]
pub struct DhcpCollector;

#[async_trait::async_trait]
impl FeatureCollector for DhcpCollector {
    fn feature(&self) -> Feature {
        Feature::Dhcp
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let servers = ctx
            .rows(Command::new("/ip/dhcp-server/print").proplist(&["name"]))
            .await?;

        let mut out = Vec::new();
        for server in servers.iter().filter_map(|row| row.get("name")) {
            let count = ctx
                .query(
                    Command::new("/ip/dhcp-server/lease/print")
                        .count_only()
                        .query("server", server)
                        .query("status", "bound"),
                )
                .await?
                .count()?;
            out.push(ACTIVE_LEASES.observe(count as f64, ctx.labels().with("server", server)));
        }
        Ok(out)
    }
}
