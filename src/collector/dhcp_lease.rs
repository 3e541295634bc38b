//! Bound DHCP leases with their remaining lifetime.

use crate::client::Command;
use crate::collector::parse::parse_duration;
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const PROPS: &[&str] = &[
    "active-mac-address",
    "server",
    "status",
    "expires-after",
    "active-address",
    "host-name",
];

const EXPIRES_AFTER: MetricDesc = MetricDesc::gauge(
    "mikrotik_dhcpl_expires_after",
    "number of seconds until the lease expires",
);

#[derive(Debug, Default)]
pub struct DhcpLeaseCollector;

#[async_trait::async_trait]
impl FeatureCollector for DhcpLeaseCollector {
    fn feature(&self) -> Feature {
        Feature::Dhcpl
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let rows = ctx
            .rows(
                Command::new("/ip/dhcp-server/lease/print")
                    .query("status", "bound")
                    .proplist(PROPS),
            )
            .await?;

        let mut out = Vec::new();
        for row in &rows {
            // Static leases without an expiry have nothing to report.
            let Some(expires) = row.get("expires-after").and_then(parse_duration) else {
                continue;
            };
            let labels = ctx
                .labels()
                .with("active_mac_address", row.get_or_empty("active-mac-address"))
                .with("server", row.get_or_empty("server"))
                .with("status", row.get_or_empty("status"))
                .with("active_address", row.get_or_empty("active-address"))
                .with("hostname", row.get_or_empty("host-name"));
            out.push(EXPIRES_AFTER.observe(expires, labels));
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
    async fn test_bound_leases() {
        let session = MockSession::new("edge").reply(
            "/ip/dhcp-server/lease/print",
            MockReply::rows(vec![
                vec![
                    ("active-mac-address", "AA:BB:CC:DD:EE:01"),
                    ("server", "lan"),
                    ("status", "bound"),
                    ("expires-after", "9m30s"),
                    ("active-address", "192.168.88.10"),
                    ("host-name", "laptop"),
                ],
                vec![("active-mac-address", "AA:BB:CC:DD:EE:02"), ("status", "bound")],
            ]),
        );

        let obs = DhcpLeaseCollector.collect(&context(session)).await.unwrap();
        assert_eq!(obs.len(), 1);
        let lease = find(&obs, "mikrotik_dhcpl_expires_after", "laptop").unwrap();
        assert_eq!(lease.value, 570.0);
        assert_eq!(lease.labels.get("active_address"), Some("192.168.88.10"));
    }
}
