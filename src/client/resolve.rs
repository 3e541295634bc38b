//! Endpoint resolution for static and SRV-discovered devices.

use std::net::IpAddr;

use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::{Resolver, TokioResolver};

use crate::client::device::{Device, SrvRecord};
use crate::client::ClientError;

/// A single host/port pair to connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

/// One SRV answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvTarget {
    pub priority: u16,
    pub weight: u16,
    pub host: String,
    pub port: u16,
}

/// Resolve the endpoint for one collection attempt.
///
/// Static addresses use `port` directly; SRV devices take host and port
/// from the selected record.
pub async fn resolve_endpoint(device: &Device, port: u16) -> Result<Endpoint, ClientError> {
    if let Some(address) = device.address.as_deref().filter(|a| !a.is_empty()) {
        return Ok(Endpoint {
            host: address.to_string(),
            port,
        });
    }

    let srv = device.srv.as_ref().ok_or_else(|| {
        ClientError::Resolve(format!("device '{}' has no address or srv record", device.name))
    })?;

    let targets = lookup_srv(srv).await?;
    let endpoint = select_srv_target(&srv.record, targets)?;
    tracing::debug!(device = %device.name, record = %srv.record, host = %endpoint.host, port = endpoint.port, "Resolved SRV record");
    Ok(endpoint)
}

async fn lookup_srv(srv: &SrvRecord) -> Result<Vec<SrvTarget>, ClientError> {
    let resolver = match &srv.dns {
        Some(dns) => {
            let ip: IpAddr = dns.address.parse().map_err(|_| {
                ClientError::Resolve(format!("invalid dns server address '{}'", dns.address))
            })?;
            let servers = NameServerConfigGroup::from_ips_clear(&[ip], dns.port, true);
            let config = ResolverConfig::from_parts(None, Vec::new(), servers);
            Resolver::builder_with_config(config, TokioConnectionProvider::default()).build()
        }
        None => TokioResolver::builder_tokio()
            .map_err(|e| ClientError::Resolve(format!("system resolver unavailable: {e}")))?
            .build(),
    };

    let lookup = resolver
        .srv_lookup(srv.record.as_str())
        .await
        .map_err(|e| ClientError::Resolve(format!("srv lookup for '{}' failed: {e}", srv.record)))?;

    Ok(lookup
        .iter()
        .map(|record| SrvTarget {
            priority: record.priority(),
            weight: record.weight(),
            host: record.target().to_utf8().trim_end_matches('.').to_string(),
            port: record.port(),
        })
        .collect())
}

/// Pick the one endpoint an SRV answer designates.
///
/// The best record has the lowest priority, then the highest weight. An empty
/// answer, or two distinct endpoints sharing the best rank, is an error.
pub fn select_srv_target(record: &str, mut targets: Vec<SrvTarget>) -> Result<Endpoint, ClientError> {
    targets.sort_by(|a, b| a.priority.cmp(&b.priority).then(b.weight.cmp(&a.weight)));
    targets.dedup_by(|a, b| a.host == b.host && a.port == b.port);

    let mut ranked = targets.iter();
    let best = ranked
        .next()
        .ok_or_else(|| ClientError::Resolve(format!("srv record '{record}' has no targets")))?;

    if let Some(rival) = ranked.find(|t| t.priority == best.priority && t.weight == best.weight) {
        return Err(ClientError::Resolve(format!(
            "srv record '{record}' is ambiguous: {}:{} and {}:{}",
            best.host, best.port, rival.host, rival.port
        )));
    }

    if best.host.is_empty() {
        return Err(ClientError::Resolve(format!(
            "srv record '{record}' has an empty target"
        )));
    }

    Ok(Endpoint {
        host: best.host.clone(),
        port: best.port,
    })
}
