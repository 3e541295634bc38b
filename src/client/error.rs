//! Device client error types.

use thiserror::Error;

/// Errors raised while talking to a device.
///
/// Variants split into two groups: connection failures (resolve, network,
/// TLS, auth, timeout) make the device unreachable for the scrape, while
/// query failures (trap, parse, protocol) only affect one feature.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Address or SRV resolution did not produce exactly one endpoint.
    #[error("address resolution failed: {0}")]
    Resolve(String),

    /// Connection refused, reset or unreachable.
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// TLS setup or handshake failed.
    #[error("tls error: {0}")]
    Tls(String),

    /// Login rejected by the device.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Timeout elapsed.
    #[error("timeout elapsed")]
    Timeout,

    /// The device answered a command with `!trap`.
    #[error("device rejected command: {0}")]
    Query(String),

    /// A reply could not be interpreted.
    #[error("failed to parse reply: {0}")]
    Parse(String),

    /// The conversation broke protocol rules or the device sent `!fatal`.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The session was closed or left mid-reply by a cancelled query.
    #[error("session is closed")]
    Closed,
}

impl ClientError {
    /// Short machine-friendly error class, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resolve(_) => "resolve",
            Self::Network(_) => "network",
            Self::Tls(_) => "tls",
            Self::Auth(_) => "auth",
            Self::Timeout => "timeout",
            Self::Query(_) => "query",
            Self::Parse(_) => "parse",
            Self::Protocol(_) => "protocol",
            Self::Closed => "closed",
        }
    }

    /// Whether the session that produced this error can still be used.
    pub fn is_session_intact(&self) -> bool {
        matches!(self, Self::Query(_) | Self::Parse(_))
    }
}
