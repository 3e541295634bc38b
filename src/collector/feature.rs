//! Feature domains and the enabled feature set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A category of device telemetry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Interface,
    Resource,
    Bgp,
    Conntrack,
    Dhcp,
    Dhcpl,
    Dhcpv6,
    Firmware,
    Health,
    Routes,
    Poe,
    Pools,
    Optics,
    W60g,
    Wlansta,
    Wlanif,
    Capsman,
    Monitor,
    Ipsec,
    Lte,
    Netwatch,
}

impl Feature {
    /// Features collected regardless of configuration.
    pub fn is_always_enabled(self) -> bool {
        matches!(self, Self::Interface | Self::Resource)
    }

    /// Features that can be switched on by flag or config.
    pub fn optional() -> impl Iterator<Item = Feature> {
        Self::iter().filter(|f| !f.is_always_enabled())
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Interface => "interface traffic counters",
            Self::Resource => "system resource usage",
            Self::Bgp => "BGP routing information",
            Self::Conntrack => "connection tracking metrics",
            Self::Dhcp => "DHCP server metrics",
            Self::Dhcpl => "DHCP server lease metrics",
            Self::Dhcpv6 => "DHCPv6 server metrics",
            Self::Firmware => "firmware versions",
            Self::Health => "board health metrics",
            Self::Routes => "routing table information",
            Self::Poe => "PoE metrics",
            Self::Pools => "IP(v6) pool metrics",
            Self::Optics => "optical diagnostic metrics",
            Self::W60g => "w60g interface metrics",
            Self::Wlansta => "connected wlan station metrics",
            Self::Wlanif => "wlan interface metrics",
            Self::Capsman => "capsman station metrics",
            Self::Monitor => "ethernet interface monitor info",
            Self::Ipsec => "ipsec metrics",
            Self::Lte => "lte metrics",
            Self::Netwatch => "netwatch metrics",
        }
    }
}

/// Enabled features. Always contains the always-enabled ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet(BTreeSet<Feature>);

impl FeatureSet {
    /// Only the always-enabled features.
    pub fn new() -> Self {
        Self(Feature::iter().filter(|f| f.is_always_enabled()).collect())
    }

    /// Every feature.
    pub fn all() -> Self {
        Self(Feature::iter().collect())
    }

    pub fn enable(&mut self, feature: Feature) {
        self.0.insert(feature);
    }

    pub fn with(mut self, feature: Feature) -> Self {
        self.enable(feature);
        self
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.0.contains(&feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut set = Self::new();
        for feature in iter {
            set.enable(feature);
        }
        set
    }
}

impl std::fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|f| f.as_ref()).collect();
        f.write_str(&names.join(","))
    }
}
