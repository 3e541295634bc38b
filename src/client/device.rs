//! Device definitions.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Default RouterOS API port.
pub const DEFAULT_API_PORT: u16 = 8728;

/// Default RouterOS API-SSL port.
pub const DEFAULT_API_TLS_PORT: u16 = 8729;

/// DNS server used for SRV lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsServer {
    /// Server IP address.
    pub address: String,
    /// Server port (default: 53).
    #[serde(default = "default_dns_port")]
    pub port: u16,
}

fn default_dns_port() -> u16 {
    53
}

/// SRV record that locates a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrvRecord {
    /// Record name, e.g. `_mikrotik._tcp.example.net`.
    pub record: String,
    /// DNS server to query; the system resolver is used when absent.
    #[serde(default)]
    pub dns: Option<DnsServer>,
}

/// A monitored RouterOS device.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Unique device name, used as the `name`/`device` label.
    pub name: String,
    /// Static host name or IP address.
    #[serde(default)]
    pub address: Option<String>,
    /// SRV-based discovery, used when `address` is absent.
    #[serde(default)]
    pub srv: Option<SrvRecord>,
    /// API user.
    pub user: String,
    /// API password.
    pub password: String,
    /// API port (default: 8728, or 8729 with TLS).
    #[serde(default, deserialize_with = "deserialize_port")]
    pub port: Option<u16>,
    /// Per-device TLS override.
    #[serde(default)]
    pub tls: Option<bool>,
    /// Per-device override for skipping certificate verification.
    #[serde(default)]
    pub insecure: Option<bool>,
}

impl Device {
    /// Create a device reached at a static address.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: Some(address.into()),
            srv: None,
            user: String::new(),
            password: String::new(),
            port: None,
            tls: None,
            insecure: None,
        }
    }

    /// Create a device discovered through an SRV record.
    pub fn with_srv(name: impl Into<String>, srv: SrvRecord) -> Self {
        Self {
            address: None,
            srv: Some(srv),
            ..Self::new(name, "")
        }
    }

    /// Set login credentials.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// Set the API port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Force TLS on or off for this device.
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Value of the `address` label: the static address or the SRV record.
    pub fn address_label(&self) -> &str {
        match (&self.address, &self.srv) {
            (Some(address), _) => address,
            (None, Some(srv)) => &srv.record,
            (None, None) => "",
        }
    }

    /// Port to connect to, given the effective transport mode.
    pub fn port_or_default(&self, tls: bool) -> u16 {
        self.port.unwrap_or(if tls {
            DEFAULT_API_TLS_PORT
        } else {
            DEFAULT_API_PORT
        })
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("srv", &self.srv)
            .field("user", &self.user)
            .field("password", &"***")
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("insecure", &self.insecure)
            .finish()
    }
}

/// Accept the port as either a YAML number or a quoted string.
fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Number(u16),
        Text(String),
    }

    match Option::<PortValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PortValue::Number(port)) => Ok(Some(port)),
        Some(PortValue::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(PortValue::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid port '{text}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_accepts_number_and_string() {
        let yaml = r#"
- name: a
  address: 10.0.0.1
  user: u
  password: p
  port: 8728
- name: b
  address: 10.0.0.2
  user: u
  password: p
  port: "8729"
- name: c
  address: 10.0.0.3
  user: u
  password: p
"#;
        let devices: Vec<Device> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(devices[0].port, Some(8728));
        assert_eq!(devices[1].port, Some(8729));
        assert_eq!(devices[2].port, None);
        assert_eq!(devices[2].port_or_default(false), DEFAULT_API_PORT);
        assert_eq!(devices[2].port_or_default(true), DEFAULT_API_TLS_PORT);
    }

    #[test]
    fn test_port_rejects_garbage() {
        let yaml = "name: a\naddress: x\nuser: u\npassword: p\nport: \"http\"\n";
        assert!(serde_yaml::from_str::<Device>(yaml).is_err());
    }

    #[test]
    fn test_address_label_falls_back_to_srv_record() {
        let device = Device::with_srv(
            "branch",
            SrvRecord {
                record: "_api._tcp.example.net".to_string(),
                dns: None,
            },
        );
        assert_eq!(device.address_label(), "_api._tcp.example.net");
        assert_eq!(Device::new("edge", "10.0.0.1").address_label(), "10.0.0.1");
    }

    #[test]
    fn test_debug_hides_password() {
        let device = Device::new("edge", "10.0.0.1").with_credentials("admin", "hunter2");
        let shown = format!("{device:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("admin"));
    }
}
