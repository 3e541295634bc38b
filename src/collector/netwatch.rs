//! Netwatch host probes.

use crate::client::Command;
use crate::collector::parse::bool_value;
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const STATUS: MetricDesc = MetricDesc::gauge("mikrotik_netwatch_status", "netwatch host is up (up = 1)");

#[derive(Debug, Default)]
pub struct NetwatchCollector;

#[async_trait::async_trait]
impl FeatureCollector for NetwatchCollector {
    fn feature(&self) -> Feature {
        Feature::Netwatch
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let rows = ctx
            .rows(
                Command::new("/tool/netwatch/print")
                    .query("disabled", "false")
                    .proplist(&["host", "comment", "status"]),
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let status = row.get_or_empty("status");
                let labels = ctx
                    .labels()
                    .with("host", row.get_or_empty("host"))
                    .with("comment", row.get_or_empty("comment"))
                    .with("status", status);
                STATUS.observe(bool_value(status == "up"), labels)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockReply, MockSession};
    use crate::collector::testing::{context, value_of};

    #[tokio::test]
    async fn test_netwatch_hosts() {
        let session = MockSession::new("edge").reply(
            "/tool/netwatch/print",
            MockReply::rows(vec![
                vec![("host", "8.8.8.8"), ("comment", "dns"), ("status", "up")],
                vec![("host", "10.9.9.9"), ("status", "down")],
            ]),
        );

        let obs = NetwatchCollector.collect(&context(session)).await.unwrap();
        assert_eq!(value_of(&obs, "mikrotik_netwatch_status", "8.8.8.8"), Some(1.0));
        assert_eq!(value_of(&obs, "mikrotik_netwatch_status", "10.9.9.9"), Some(0.0));
    }
}
