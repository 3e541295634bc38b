//! System resources from `/system/resource/print`.

use crate::client::Command;
use crate::collector::parse::{observe_numbers, parse_duration};
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const PROPS: &[&str] = &[
    "free-memory",
    "total-memory",
    "cpu-load",
    "free-hdd-space",
    "total-hdd-space",
    "uptime",
    "board-name",
    "version",
];

const GAUGES: &[(&str, MetricDesc)] = &[
    ("free-memory", MetricDesc::gauge("mikrotik_system_free_memory", "Unused amount of RAM")),
    ("total-memory", MetricDesc::gauge("mikrotik_system_total_memory", "Amount of installed RAM")),
    ("cpu-load", MetricDesc::gauge("mikrotik_system_cpu_load", "Percentage of used CPU resources")),
    ("free-hdd-space", MetricDesc::gauge("mikrotik_system_free_hdd_space", "Free space on hard drive or NAND")),
    ("total-hdd-space", MetricDesc::gauge("mikrotik_system_total_hdd_space", "Size of the hard drive or NAND")),
];

const UPTIME: MetricDesc = MetricDesc::gauge("mikrotik_system_uptime", "Time interval since boot-up");

/// Collects memory, CPU, storage and uptime. Always enabled.
#[derive(Debug, Default)]
pub struct ResourceCollector;

#[async_trait::async_trait]
impl FeatureCollector for ResourceCollector {
    fn feature(&self) -> Feature {
        Feature::Resource
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let rows = ctx
            .rows(Command::new("/system/resource/print").proplist(PROPS))
            .await?;

        let mut out = Vec::new();
        for row in &rows {
            let labels = ctx
                .labels()
                .with("version", row.get_or_empty("version"))
                .with("boardname", row.get_or_empty("board-name"));

            observe_numbers(row, GAUGES, &labels, &mut out);
            if let Some(raw) = row.get("uptime") {
                let uptime = parse_duration(raw).ok_or_else(|| CollectorError::Value {
                    field: "uptime".to_string(),
                    value: raw.to_string(),
                })?;
                out.push(UPTIME.observe(uptime, labels));
            }
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
    async fn test_resource_gauges() {
        let session = MockSession::new("edge").reply(
            "/system/resource/print",
            MockReply::row(&[
                ("free-memory", "1048576"),
                ("total-memory", "268435456"),
                ("cpu-load", "7"),
                ("uptime", "1w2d3h4m5s"),
                ("board-name", "CCR2004-16G-2S+"),
                ("version", "7.15.2 (stable)"),
            ]),
        );

        let obs = ResourceCollector.collect(&context(session)).await.unwrap();

        assert_eq!(value_of(&obs, "mikrotik_system_cpu_load", "edge"), Some(7.0));
        assert_eq!(value_of(&obs, "mikrotik_system_uptime", "edge"), Some(788_645.0));
        let free = find(&obs, "mikrotik_system_free_memory", "edge").unwrap();
        assert_eq!(free.labels.get("boardname"), Some("CCR2004-16G-2S+"));
        assert_eq!(free.labels.get("version"), Some("7.15.2 (stable)"));
        assert!(find(&obs, "mikrotik_system_free_hdd_space", "edge").is_none());
    }

    #[tokio::test]
    async fn test_bad_uptime_fails_feature() {
        let session = MockSession::new("edge").reply(
            "/system/resource/print",
            MockReply::row(&[("uptime", "forever")]),
        );
        let err = ResourceCollector.collect(&context(session)).await.unwrap_err();
        assert!(matches!(err, CollectorError::Value { .. }));
    }
}
