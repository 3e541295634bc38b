//! Route counts per address family and protocol.

use crate::client::Command;
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const FAMILIES: &[(&str, &str)] = &[("4", "/ip/route/print"), ("6", "/ipv6/route/print")];

const PROTOCOLS: &[&str] = &["bgp", "static", "ospf", "dynamic", "connect", "rip"];

const TOTAL: MetricDesc = MetricDesc::gauge("mikrotik_routes_total_routes", "number of routes in RIB");
const PER_PROTOCOL: MetricDesc =
    MetricDesc::gauge("mikrotik_routes_protocol", "number of routes per protocol in RIB");

#[derive(Debug, Default)]
pub struct RoutesCollector;

#[async_trait::async_trait]
impl FeatureCollector for RoutesCollector {
    fn feature(&self) -> Feature {
        Feature::Routes
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let mut out = Vec::new();
        for (ip_version, path) in FAMILIES {
            let labels = ctx.labels().with("ip_version", *ip_version);

            let total = ctx
                .query(Command::new(*path).count_only().query("disabled", "false"))
                .await?
                .count()?;
            out.push(TOTAL.observe(total as f64, labels.clone()));

            for protocol in PROTOCOLS {
                let count = ctx
                    .query(
                        Command::new(*path)
                            .count_only()
                            .query("disabled", "false")
                            .query(protocol, "true"),
                    )
                    .await?
                    .count()?;
                out.push(PER_PROTOCOL.observe(count as f64, labels.clone().with("protocol", *protocol)));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockReply, MockSession};
    use crate::collector::testing::{context, find};

    #[tokio::test]
    async fn test_route_counts() {
        let session = MockSession::new("edge")
            .reply("/ip/route/print", MockReply::Count(5))
            .reply("/ipv6/route/print", MockReply::Count(2))
            .reply(
                "/ip/route/print =count-only= ?disabled=false",
                MockReply::Count(900_001),
            )
            .reply(
                "/ip/route/print =count-only= ?disabled=false ?bgp=true",
                MockReply::Count(900_000),
            );

        let obs = RoutesCollector.collect(&context(session)).await.unwrap();
        assert_eq!(obs.len(), 2 * (1 + PROTOCOLS.len()));

        let v4_total = obs
            .iter()
            .find(|o| o.name == "mikrotik_routes_total_routes" && o.labels.get("ip_version") == Some("4"))
            .unwrap();
        assert_eq!(v4_total.value, 900_001.0);
        assert_eq!(find(&obs, "mikrotik_routes_protocol", "bgp").unwrap().value, 900_000.0);
        let static_v4 = obs
            .iter()
            .find(|o| o.labels.get("protocol") == Some("static") && o.labels.get("ip_version") == Some("4"))
            .unwrap();
        assert_eq!(static_v4.value, 5.0);
    }
}
