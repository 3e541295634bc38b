//! Feature Collectors
//!
//! One collector per RouterOS feature domain. A collector runs its commands
//! through the device session held by a [`CollectContext`] and turns the
//! replies into [`Observation`](crate::metrics::Observation)s.
//!
//! # Architecture
//!
//! - [`FeatureCollector`]: Core trait for implementing a feature domain
//! - [`Feature`] / [`FeatureSet`]: Domain identifiers and the enabled set
//! - [`CollectorRegistry`]: The collectors enabled for this process
//!
//! # Example
//!
//! ```rust
//! use mikrotik_exporter::collector::{CollectorRegistry, Feature, FeatureSet};
//!
//! let features = FeatureSet::new().with(Feature::Bgp);
//! let registry = CollectorRegistry::from_features(&features);
//! assert_eq!(registry.len(), 3);
//! ```

mod bgp;
mod capsman;
mod conntrack;
mod dhcp;
mod dhcp_lease;
mod dhcpv6;
mod feature;
mod firmware;
mod health;
mod interface;
mod ipsec;
mod lte;
mod monitor;
mod netwatch;
mod optics;
pub mod parse;
mod poe;
mod pools;
mod registry;
mod resource;
mod routes;
#[cfg(test)]
mod testing;
mod traits;
mod w60g;
mod wlan_interface;
mod wlan_station;

pub use bgp::BgpCollector;
pub use capsman::CapsmanCollector;
pub use conntrack::ConntrackCollector;
pub use dhcp::DhcpCollector;
pub use dhcp_lease::DhcpLeaseCollector;
pub use dhcpv6::Dhcpv6Collector;
pub use feature::{Feature, FeatureSet};
pub use firmware::FirmwareCollector;
pub use health::HealthCollector;
pub use interface::InterfaceCollector;
pub use ipsec::IpsecCollector;
pub use lte::LteCollector;
pub use monitor::MonitorCollector;
pub use netwatch::NetwatchCollector;
pub use optics::OpticsCollector;
pub use poe::PoeCollector;
pub use pools::PoolsCollector;
pub use registry::CollectorRegistry;
pub use resource::ResourceCollector;
pub use routes::RoutesCollector;
pub use traits::{CollectContext, CollectorError, FeatureCollector, SharedSession};
pub use w60g::W60gCollector;
pub use wlan_interface::WlanInterfaceCollector;
pub use wlan_station::WlanStationCollector;
