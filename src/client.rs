//! Device Client
//!
//! RouterOS API access: the wire codec, authenticated sessions over TCP or
//! TLS, endpoint resolution and the optional session pool.
//!
//! # Architecture
//!
//! - [`Connector`]: opens a [`Session`] to a [`Device`] within a time budget
//! - [`Session`]: runs [`Command`]s one at a time and returns [`Response`] rows
//! - [`SessionPool`]: keeps one healthy session per device between scrapes

mod command;
mod connector;
mod device;
mod error;
#[cfg(test)]
pub(crate) mod mock;
mod pool;
pub mod proto;
pub mod resolve;
mod session;
pub mod tls;

pub use command::Command;
pub use connector::{ConnectOptions, Connector, RouterOsConnector};
pub use device::{DEFAULT_API_PORT, DEFAULT_API_TLS_PORT, Device, DnsServer, SrvRecord};
pub use error::ClientError;
pub use pool::{Lease, SessionPool};
pub use proto::{Response, Row};
pub use session::{ApiSession, Session, Transport};
