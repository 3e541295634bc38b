//! Authenticated RouterOS API sessions.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};
use tokio::time::timeout;

use crate::client::proto::{self, Reply, Response, Row};
use crate::client::{ClientError, Command};

/// How long `close()` waits for the `/quit` exchange.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Byte stream a session runs over (plain TCP or TLS).
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// A live, authenticated connection to one device.
///
/// A session is owned by a single device worker. Feature tasks share it
/// through a lock, so `query` is never entered concurrently.
#[async_trait::async_trait]
pub trait Session: Send + std::fmt::Debug {
    /// Run one command and collect its reply rows.
    async fn query(&mut self, command: &Command) -> Result<Response, ClientError>;

    /// Release transport resources. Idempotent and infallible.
    async fn close(&mut self);

    /// Whether the session can take further commands.
    fn is_healthy(&self) -> bool;
}

/// [`Session`] speaking the RouterOS API over a [`Transport`].
pub struct ApiSession {
    stream: BufStream<Box<dyn Transport>>,
    device: String,
    healthy: bool,
    closed: bool,
}

impl ApiSession {
    /// Wrap an established transport. Call [`ApiSession::login`] next.
    pub fn new(transport: Box<dyn Transport>, device: impl Into<String>) -> Self {
        Self {
            stream: BufStream::new(transport),
            device: device.into(),
            healthy: true,
            closed: false,
        }
    }

    /// Authenticate with the post-6.43 plain login.
    ///
    /// # Errors
    /// Returns `ClientError::Auth` when the device rejects the credentials or
    /// answers with the legacy MD5 challenge.
    pub async fn login(&mut self, user: &str, password: &str) -> Result<(), ClientError> {
        let command = Command::new("/login")
            .attr("name", user)
            .attr("password", password);

        match self.query(&command).await {
            Ok(response) if response.ret().is_some() => Err(ClientError::Auth(
                "device requested legacy challenge login, which is not supported".to_string(),
            )),
            Ok(_) => {
                tracing::debug!(device = %self.device, user, "Logged in");
                Ok(())
            }
            Err(ClientError::Query(message)) => Err(ClientError::Auth(message)),
            Err(e) => Err(e),
        }
    }

    async fn exchange(&mut self, command: &Command) -> Result<Response, ClientError> {
        proto::write_sentence(&mut self.stream, command.words()).await?;

        let mut response = Response::default();
        let mut trap: Option<Row> = None;
        loop {
            let words = proto::read_sentence(&mut self.stream).await?;
            if words.is_empty() {
                continue;
            }
            match Reply::parse(&words)? {
                Reply::Data(row) => response.rows.push(row),
                Reply::Empty => {}
                Reply::Trap(row) => trap = Some(row),
                Reply::Fatal(message) => return Err(ClientError::Protocol(message)),
                Reply::Done(row) => {
                    response.done = row;
                    break;
                }
            }
        }

        match trap {
            Some(row) => Err(ClientError::Query(
                row.get("message").unwrap_or("unknown error").to_string(),
            )),
            None => Ok(response),
        }
    }
}

impl std::fmt::Debug for ApiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSession")
            .field("device", &self.device)
            .field("healthy", &self.healthy)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Session for ApiSession {
    async fn query(&mut self, command: &Command) -> Result<Response, ClientError> {
        if self.closed || !self.healthy {
            return Err(ClientError::Closed);
        }

        // Stays false if this future is dropped before the reply is drained.
        self.healthy = false;
        let result = self.exchange(command).await;
        self.healthy = match &result {
            Ok(_) => true,
            Err(e) => e.is_session_intact(),
        };

        match &result {
            Ok(response) => {
                tracing::trace!(device = %self.device, command = %command, rows = response.rows.len(), "Query completed");
            }
            Err(e) => {
                tracing::debug!(device = %self.device, command = %command, error = %e, "Query failed");
            }
        }
        result
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let healthy = self.healthy;
        let stream = &mut self.stream;
        let quit = async {
            if healthy {
                proto::write_sentence(stream, &["/quit"]).await?;
            }
            stream.shutdown().await?;
            Ok::<_, ClientError>(())
        };

        match timeout(CLOSE_TIMEOUT, quit).await {
            Ok(Ok(())) => tracing::debug!(device = %self.device, "Session closed"),
            Ok(Err(e)) => {
                tracing::debug!(device = %self.device, error = %e, "Error while closing session")
            }
            Err(_) => tracing::debug!(device = %self.device, "Timed out closing session"),
        }
        self.healthy = false;
    }

    fn is_healthy(&self) -> bool {
        self.healthy && !self.closed
    }
}
