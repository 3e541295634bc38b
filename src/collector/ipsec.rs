//! IPsec policy state from `/ip/ipsec/policy/print`.

use crate::client::Command;
use crate::collector::parse::{bool_value, parse_bool};
use crate::collector::{CollectContext, CollectorError, Feature, FeatureCollector};
use crate::metrics::{MetricDesc, Observation};

const PH2_STATE: MetricDesc =
    MetricDesc::gauge("mikrotik_ipsec_ph2_state", "phase 2 state of the policy (established = 1)");
const INVALID: MetricDesc = MetricDesc::gauge("mikrotik_ipsec_invalid", "policy is invalid");
const ACTIVE: MetricDesc = MetricDesc::gauge("mikrotik_ipsec_active", "policy is active");

#[derive(Debug, Default)]
pub struct IpsecCollector;

#[async_trait::async_trait]
impl FeatureCollector for IpsecCollector {
    fn feature(&self) -> Feature {
        Feature::Ipsec
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError> {
        let rows = ctx
            .rows(
                Command::new("/ip/ipsec/policy/print")
                    .query("dynamic", "false")
                    .proplist(&["src-address", "dst-address", "ph2-state", "invalid", "active", "comment"]),
            )
            .await?;

        let mut out = Vec::new();
        for row in &rows {
            let src_dst = format!("{}-{}", row.get_or_empty("src-address"), row.get_or_empty("dst-address"));
            let labels = ctx
                .labels()
                .with("src_dst_address", src_dst)
                .with("comment", row.get_or_empty("comment"));

            if let Some(state) = row.get("ph2-state") {
                out.push(PH2_STATE.observe(
                    bool_value(state == "established"),
                    labels.clone().with("state", state),
                ));
            }
            if let Some(invalid) = row.get("invalid").and_then(parse_bool) {
                out.push(INVALID.observe(bool_value(invalid), labels.clone()));
            }
            if let Some(active) = row.get("active").and_then(parse_bool) {
                out.push(ACTIVE.observe(bool_value(active), labels));
            }
        }
        Ok(out)
    }
}
