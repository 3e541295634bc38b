//! Core collector traits and types.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{Instant, timeout_at};

use crate::client::{ClientError, Command, Device, Response, Row, Session};
use crate::collector::Feature;
use crate::metrics::{Labels, Observation};

/// Errors that can occur during collection of one feature.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The device rejected or broke off a query.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The device budget ran out while the feature was running.
    #[error("timeout elapsed")]
    Timeout,

    /// A reply field had an unexpected shape.
    #[error("unexpected value for '{field}': '{value}'")]
    Value { field: String, value: String },
}

/// Session handle shared by the feature tasks of one device.
pub type SharedSession = Arc<Mutex<Box<dyn Session>>>;

/// Everything a feature collector needs for one device in one scrape.
///
/// Queries go through the device's single session one at a time and are
/// bounded by the device deadline. Features of one device are therefore
/// serialized on the session: a query that stalls holds the lock, and its
/// sibling features wait until the device deadline cuts all of them off.
#[derive(Clone)]
pub struct CollectContext {
    device: Arc<Device>,
    session: SharedSession,
    deadline: Instant,
}

impl CollectContext {
    pub fn new(device: Arc<Device>, session: SharedSession, deadline: Instant) -> Self {
        Self {
            device,
            session,
            deadline,
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Run one command on the device session.
    ///
    /// # Errors
    /// `CollectorError::Timeout` when the device deadline passes while waiting
    /// for the session or for the reply.
    pub async fn query(&self, command: Command) -> Result<Response, CollectorError> {
        let run = async {
            let mut session = self.session.lock().await;
            session.query(&command).await
        };
        match timeout_at(self.deadline, run).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CollectorError::Timeout),
        }
    }

    /// Run one command and return its data rows.
    pub async fn rows(&self, command: Command) -> Result<Vec<Row>, CollectorError> {
        Ok(self.query(command).await?.rows)
    }

    /// Run a `monitor` command once for the named items.
    ///
    /// Returns no rows without querying when `names` is empty.
    pub async fn monitor_once(
        &self,
        path: &str,
        names: &[&str],
        props: &[&str],
    ) -> Result<Vec<Row>, CollectorError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        self.rows(
            Command::new(path)
                .attr("numbers", names.join(","))
                .once()
                .proplist(props),
        )
        .await
    }

    /// Labels every domain observation starts with: `name` and `address`.
    pub fn labels(&self) -> Labels {
        Labels::new()
            .with("name", self.device.name.as_str())
            .with("address", self.device.address_label())
    }
}

impl std::fmt::Debug for CollectContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectContext")
            .field("device", &self.device.name)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

/// One feature domain's collector.
///
/// # Error Handling
///
/// - A missing or unparsable field is skipped; the rest of the reply is
///   still reported.
/// - A failed query returns `Err`, which drops this feature's observations
///   for the device without affecting other features or devices.
#[async_trait::async_trait]
pub trait FeatureCollector: Send + Sync + 'static {
    /// Feature this collector implements.
    fn feature(&self) -> Feature;

    /// Query the device and translate replies into observations.
    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<Observation>, CollectorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockReply, MockSession};
    use std::time::Duration;

    fn context(session: MockSession, budget: Duration) -> CollectContext {
        let device = Arc::new(Device::new("edge", "10.0.0.1"));
        let session: Box<dyn Session> = Box::new(session);
        CollectContext::new(device, Arc::new(Mutex::new(session)), Instant::now() + budget)
    }

    #[tokio::test]
    async fn test_query_returns_rows() {
        let session = MockSession::new("edge").reply(
            "/system/identity/print",
            MockReply::row(&[("name", "edge")]),
        );
        let ctx = context(session, Duration::from_secs(1));

        let rows = ctx.rows(Command::new("/system/identity/print")).await.unwrap();
        assert_eq!(rows[0].get("name"), Some("edge"));
    }

    #[tokio::test]
    async fn test_query_trap_is_client_error() {
        let ctx = context(MockSession::new("edge"), Duration::from_secs(1));
        let err = ctx.query(Command::new("/routing/bgp/peer/print")).await.unwrap_err();
        assert!(matches!(err, CollectorError::Client(ClientError::Query(_))));
    }

    #[tokio::test]
    async fn test_query_bounded_by_deadline() {
        let session = MockSession::new("edge").reply("/interface/print", MockReply::Hang);
        let ctx = context(session, Duration::from_millis(50));

        let started = std::time::Instant::now();
        let err = ctx.query(Command::new("/interface/print")).await.unwrap_err();
        assert!(matches!(err, CollectorError::Timeout));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_stalled_query_holds_session_for_siblings() {
        let session = MockSession::new("edge")
            .reply("/interface/print", MockReply::Hang)
            .reply("/system/resource/print", MockReply::row(&[("cpu-load", "3")]));
        let ctx = context(session, Duration::from_millis(100));

        let stalled = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.query(Command::new("/interface/print")).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let sibling = ctx.query(Command::new("/system/resource/print")).await;

        assert!(matches!(sibling, Err(CollectorError::Timeout)));
        assert!(matches!(stalled.await.unwrap(), Err(CollectorError::Timeout)));
    }

    #[test]
    fn test_base_labels() {
        let ctx = context(MockSession::new("edge"), Duration::from_secs(1));
        let labels = ctx.labels();
        assert_eq!(labels.names(), vec!["name", "address"]);
        assert_eq!(labels.values(), vec!["edge", "10.0.0.1"]);
    }
}
