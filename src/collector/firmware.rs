//! Installed package versions.

use crate::client::Command;
use crate::collector::parse::{bool_value, parse_bool};
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const PACKAGE_ENABLED: MetricDesc = MetricDesc::gauge(
    "mikrotik_system_package_enabled",
    "system package enabled (1) or disabled (0), labeled by version",
);

#[derive(Debug, Default)]
pub struct FirmwareCollector;

#[async_trait::async_trait]
impl FeatureCollector for FirmwareCollector {
    fn feature(&self) -> Feature {
        Feature::Firmware
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let rows = ctx
            .rows(Command::new("/system/package/print").proplist(&["name", "version", "disabled"]))
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let disabled = row.get("disabled").and_then(parse_bool).unwrap_or(false);
                let labels = ctx
                    .labels()
                    .with("package", row.get_or_empty("name"))
                    .with("version", row.get_or_empty("version"));
                PACKAGE_ENABLED.observe(bool_value(!disabled), labels)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockReply, MockSession};
    use crate::collector::testing::{context, find};

    #[tokio::test]
    async fn test_packages() {
        let session = MockSession::new("edge").reply(
            "/system/package/print",
            MockReply::rows(vec![
                vec![("name", "routeros"), ("version", "7.15.2"), ("disabled", "false")],
                vec![("name", "wireless"), ("version", "7.15.2"), ("disabled", "true")],
            ]),
        );

        let obs = FirmwareCollector.collect(&context(session)).await.unwrap();
        let routeros = find(&obs, "mikrotik_system_package_enabled", "routeros").unwrap();
        assert_eq!(routeros.value, 1.0);
        assert_eq!(routeros.labels.get("version"), Some("7.15.2"));
        assert_eq!(
            find(&obs, "mikrotik_system_package_enabled", "wireless").unwrap().value,
            0.0
        );
    }
}
