//! Registry of the feature collectors enabled for this process.

use std::sync::Arc;

use crate::collector::{
    BgpCollector, CapsmanCollector, ConntrackCollector, DhcpCollector, DhcpLeaseCollector,
    Dhcpv6Collector, Feature, FeatureCollector, FeatureSet, FirmwareCollector, HealthCollector,
    InterfaceCollector, IpsecCollector, LteCollector, MonitorCollector, NetwatchCollector,
    OpticsCollector, PoeCollector, PoolsCollector, ResourceCollector, RoutesCollector,
    W60gCollector, WlanInterfaceCollector, WlanStationCollector,
};

/// Immutable list of collectors, built once at startup.
#[derive(Clone)]
pub struct CollectorRegistry {
    collectors: Vec<Arc<dyn FeatureCollector>>,
}

impl CollectorRegistry {
    /// Wrap an explicit list of collectors.
    pub fn new(collectors: Vec<Arc<dyn FeatureCollector>>) -> Self {
        Self { collectors }
    }

    /// One collector per enabled feature.
    pub fn from_features(features: &FeatureSet) -> Self {
        let collectors = features.iter().map(collector_for).collect();
        let registry = Self::new(collectors);
        tracing::info!(features = %features, "Collectors registered");
        registry
    }

    pub fn collectors(&self) -> &[Arc<dyn FeatureCollector>] {
        &self.collectors
    }

    pub fn features(&self) -> Vec<Feature> {
        self.collectors.iter().map(|c| c.feature()).collect()
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

impl std::fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorRegistry")
            .field("features", &self.features())
            .finish()
    }
}

fn collector_for(feature: Feature) -> Arc<dyn FeatureCollector> {
    match feature {
        Feature::Interface => Arc::new(InterfaceCollector),
        Feature::Resource => Arc::new(ResourceCollector),
        Feature::Bgp => Arc::new(BgpCollector),
        Feature::Conntrack => Arc::new(ConntrackCollector),
        Feature::Dhcp => Arc::new(DhcpCollector),
        Feature::Dhcpl => Arc::new(DhcpLeaseCollector),
        Feature::Dhcpv6 => Arc::new(Dhcpv6Collector),
        Feature::Firmware => Arc::new(FirmwareCollector),
        Feature::Health => Arc::new(HealthCollector),
        Feature::Routes => Arc::new(RoutesCollector),
        Feature::Poe => Arc::new(PoeCollector),
        Feature::Pools => Arc::new(PoolsCollector),
        Feature::Optics => Arc::new(OpticsCollector),
        Feature::W60g => Arc::new(W60gCollector),
        Feature::Wlansta => Arc::new(WlanStationCollector),
        Feature::Wlanif => Arc::new(WlanInterfaceCollector),
        Feature::Capsman => Arc::new(CapsmanCollector),
        Feature::Monitor => Arc::new(MonitorCollector),
        Feature::Ipsec => Arc::new(IpsecCollector),
        Feature::Lte => Arc::new(LteCollector),
        Feature::Netwatch => Arc::new(NetwatchCollector),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_follows_feature_set() {
        let features = FeatureSet::new().with(Feature::Bgp).with(Feature::Health);
        let registry = CollectorRegistry::from_features(&features);

        assert_eq!(registry.len(), 4);
        assert_eq!(
            registry.features(),
            vec![Feature::Interface, Feature::Resource, Feature::Bgp, Feature::Health]
        );
    }

    #[test]
    fn test_every_feature_has_matching_collector() {
        let registry = CollectorRegistry::from_features(&FeatureSet::all());
        let features: Vec<Feature> = FeatureSet::all().iter().collect();
        assert_eq!(registry.features(), features);
    }
}
