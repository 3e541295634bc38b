//! Binding counts per DHCPv6 server.

use crate::client::Command;
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const BINDINGS: MetricDesc = MetricDesc::gauge(
    "mikrotik_dhcpv6_binding_count",
    "number of active bindings per DHCPv6 server",
);

#[derive(Debug, Default)]
pub struct Dhcpv6Collector;

#[async_trait::async_trait]
impl FeatureCollector for Dhcpv6Collector {
    fn feature(&self) -> Feature {
        Feature::Dhcpv6
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let servers = ctx
            .rows(Command::new("/ipv6/dhcp-server/print").proplist(&["name"]))
            .await?;

        let mut out = Vec::new();
        for server in servers.iter().filter_map(|row| row.get("name")) {
            let count = ctx
                .query(
                    Command::new("/ipv6/dhcp-server/binding/print")
                        .count_only()
                        .query("server", server),
                )
                .await?
                .count()?;
            out.push(BINDINGS.observe(count as f64, ctx.labels().with("server", server)));
        }
        Ok(out)
    }
}
