//! The `features` section: one switch per optional feature domain.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::collector::{Feature, FeatureSet};

/// Feature switches from the config file, keyed by feature name.
///
/// ```yaml
/// features:
///   bgp: true
///   dhcp: true
/// ```
///
/// Unknown feature names are logged and ignored, so a config written for a
/// newer exporter still loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeaturesConfig(BTreeMap<Feature, bool>);

impl<'de> Deserialize<'de> for FeaturesConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, bool>::deserialize(deserializer)?;
        let mut switches = BTreeMap::new();
        for (key, enabled) in raw {
            match key.parse::<Feature>() {
                Ok(feature) => {
                    switches.insert(feature, enabled);
                }
                Err(_) => tracing::warn!(feature = %key, "Ignoring unknown feature in config"),
            }
        }
        Ok(Self(switches))
    }
}

impl FeaturesConfig {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.0.get(&feature).copied().unwrap_or(false)
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        self.0.insert(feature, enabled);
    }

    /// Merge with command line switches. A feature is on if either source
    /// turns it on; neither can turn off an always-enabled feature.
    pub fn merge(&self, flags: &FeatureSet) -> FeatureSet {
        let mut set = FeatureSet::new();
        for feature in Feature::optional() {
            if self.is_enabled(feature) || flags.contains(feature) {
                set.enable(feature);
            }
        }
        set
    }
}

impl FromIterator<(Feature, bool)> for FeaturesConfig {
    fn from_iter<I: IntoIterator<Item = (Feature, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
