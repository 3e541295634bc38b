//! Used addresses per IPv4 and IPv6 pool.

use crate::client::Command;
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

/// `(ip_version, pool menu)` pairs.
const FAMILIES: &[(&str, &str)] = &[("4", "/ip/pool"), ("6", "/ipv6/pool")];

const USED: MetricDesc = MetricDesc::gauge("mikrotik_ip_pool_used", "number of used IP/prefixes in a pool");

#[derive(Debug, Default)]
pub struct PoolsCollector;

#[async_trait::async_trait]
impl FeatureCollector for PoolsCollector {
    fn feature(&self) -> Feature {
        Feature::Pools
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let mut out = Vec::new();
        for (ip_version, menu) in FAMILIES {
            let pools = ctx
                .rows(Command::new(format!("{menu}/print")).proplist(&["name"]))
                .await?;

            for pool in pools.iter().filter_map(|row| row.get("name")) {
                let used = ctx
                    .query(
                        Command::new(format!("{menu}/used/print"))
                            .count_only()
                            .query("pool", pool),
                    )
                    .await?
                    .count()?;
                let labels = ctx
                    .labels()
                    .with("ip_version", *ip_version)
                    .with("pool", pool);
                out.push(USED.observe(used as f64, labels));
            }
        }
        Ok(out)
    }
}
