//! Session establishment: resolve, connect, optionally wrap in TLS, log in.

use std::sync::Arc;
use std::time::Duration;

use rustls::ClientConfig;
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};
use tokio_rustls::TlsConnector;

use crate::client::device::Device;
use crate::client::resolve::resolve_endpoint;
use crate::client::session::{ApiSession, Session, Transport};
use crate::client::{ClientError, tls};

/// Opens authenticated sessions to devices.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Establish a session. The whole attempt (resolution, TCP, TLS and
    /// login) must finish within `timeout`.
    async fn connect(
        &self,
        device: &Device,
        timeout: Duration,
    ) -> Result<Box<dyn Session>, ClientError>;
}

/// Transport defaults applied to devices without their own override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Use API-SSL.
    pub tls: bool,
    /// Skip certificate verification for API-SSL.
    pub insecure: bool,
}

/// [`Connector`] for real RouterOS devices.
pub struct RouterOsConnector {
    options: ConnectOptions,
    verified: Arc<ClientConfig>,
    unverified: Arc<ClientConfig>,
}

impl RouterOsConnector {
    pub fn new(options: ConnectOptions) -> Result<Self, ClientError> {
        Ok(Self {
            options,
            verified: tls::client_config(false)?,
            unverified: tls::client_config(true)?,
        })
    }

    async fn establish(
        &self,
        device: &Device,
        use_tls: bool,
        insecure: bool,
    ) -> Result<ApiSession, ClientError> {
        let endpoint = resolve_endpoint(device, device.port_or_default(use_tls)).await?;

        let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port)).await?;
        stream.set_nodelay(true)?;

        let transport: Box<dyn Transport> = if use_tls {
            let config = if insecure {
                Arc::clone(&self.unverified)
            } else {
                Arc::clone(&self.verified)
            };
            let server_name = tls::server_name(&endpoint.host)?;
            let stream = TlsConnector::from(config)
                .connect(server_name, stream)
                .await
                .map_err(|e| ClientError::Tls(e.to_string()))?;
            Box::new(stream)
        } else {
            Box::new(stream)
        };

        let mut session = ApiSession::new(transport, device.name.clone());
        session.login(&device.user, &device.password).await?;
        Ok(session)
    }
}

#[async_trait::async_trait]
impl Connector for RouterOsConnector {
    async fn connect(
        &self,
        device: &Device,
        timeout: Duration,
    ) -> Result<Box<dyn Session>, ClientError> {
        let use_tls = device.tls.unwrap_or(self.options.tls);
        let insecure = device.insecure.unwrap_or(self.options.insecure);
        let deadline = Instant::now() + timeout;

        tracing::debug!(device = %device.name, address = %device.address_label(), tls = use_tls, "Connecting");

        match timeout_at(deadline, self.establish(device, use_tls, insecure)).await {
            Ok(Ok(session)) => Ok(Box::new(session)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ClientError::Timeout),
        }
    }
}

impl std::fmt::Debug for RouterOsConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterOsConnector")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
