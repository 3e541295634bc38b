//! In-memory sessions and connectors for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::client::connector::Connector;
use crate::client::device::Device;
use crate::client::proto::{Response, Row};
use crate::client::session::Session;
use crate::client::{ClientError, Command};

/// Canned reply to one command.
#[derive(Debug, Clone)]
pub enum MockReply {
    Rows(Vec<Row>),
    Count(u64),
    Trap(String),
    Fatal,
    /// Never answers.
    Hang,
    Delayed(Duration, Box<MockReply>),
}

impl MockReply {
    pub fn rows(rows: Vec<Vec<(&str, &str)>>) -> Self {
        Self::Rows(rows.into_iter().map(Row::from_pairs).collect())
    }

    pub fn row(pairs: &[(&str, &str)]) -> Self {
        Self::Rows(vec![Row::from_pairs(pairs.iter().copied())])
    }

    pub fn delayed(delay: Duration, reply: MockReply) -> Self {
        Self::Delayed(delay, Box::new(reply))
    }
}

/// Scripted [`Session`]. Replies are looked up by the full command text
/// first, then by the command path.
#[derive(Debug, Clone)]
pub struct MockSession {
    device: String,
    replies: HashMap<String, MockReply>,
    healthy: bool,
    closed: bool,
    closes: Arc<AtomicUsize>,
    close_delay: Option<Duration>,
    log: Arc<Mutex<Vec<String>>>,
}

impl MockSession {
    pub fn new(device: &str) -> Self {
        Self {
            device: device.to_string(),
            replies: HashMap::new(),
            healthy: true,
            closed: false,
            closes: Arc::new(AtomicUsize::new(0)),
            close_delay: None,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn reply(mut self, command: &str, reply: MockReply) -> Self {
        self.replies.insert(command.to_string(), reply);
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// Make `close` take `delay` before it completes.
    pub fn slow_close(mut self, delay: Duration) -> Self {
        self.close_delay = Some(delay);
        self
    }

    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    /// Commands received, shared by all clones of this session.
    pub fn command_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.log)
    }

    fn lookup(&self, command: &Command) -> Option<MockReply> {
        self.replies
            .get(&command.to_string())
            .or_else(|| self.replies.get(command.path()))
            .cloned()
    }
}

#[async_trait::async_trait]
impl Session for MockSession {
    async fn query(&mut self, command: &Command) -> Result<Response, ClientError> {
        if self.closed || !self.healthy {
            return Err(ClientError::Closed);
        }
        self.log.lock().unwrap().push(command.to_string());

        let mut reply = match self.lookup(command) {
            Some(reply) => reply,
            None => return Err(ClientError::Query("no such command prefix".to_string())),
        };

        self.healthy = false;
        loop {
            match reply {
                MockReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
                MockReply::Hang => return std::future::pending().await,
                MockReply::Fatal => return Err(ClientError::Protocol("session terminated".into())),
                MockReply::Trap(message) => {
                    self.healthy = true;
                    return Err(ClientError::Query(message));
                }
                MockReply::Rows(rows) => {
                    self.healthy = true;
                    return Ok(Response {
                        rows,
                        done: Row::default(),
                    });
                }
                MockReply::Count(count) => {
                    self.healthy = true;
                    return Ok(Response {
                        rows: Vec::new(),
                        done: Row::from_pairs([("ret", count.to_string())]),
                    });
                }
            }
        }
    }

    async fn close(&mut self) {
        if !self.closed {
            if let Some(delay) = self.close_delay {
                tokio::time::sleep(delay).await;
            }
            self.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_healthy(&self) -> bool {
        self.healthy && !self.closed
    }
}

/// How a mock device reacts to a connection attempt.
#[derive(Debug, Clone)]
pub enum MockBehaviour {
    Accept,
    Refuse,
    RejectLogin,
    /// Accept after a delay; times out if the delay exceeds the budget.
    Delay(Duration),
    Panic,
}

/// Scripted [`Connector`] keyed by device name. Unknown devices refuse.
#[derive(Debug, Default)]
pub struct MockConnector {
    devices: HashMap<String, (MockBehaviour, MockSession)>,
    connects: AtomicUsize,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(mut self, name: &str, behaviour: MockBehaviour, session: MockSession) -> Self {
        self.devices.insert(name.to_string(), (behaviour, session));
        self
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        device: &Device,
        timeout: Duration,
    ) -> Result<Box<dyn Session>, ClientError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let refused = || {
            ClientError::Network(std::io::Error::from(
                std::io::ErrorKind::ConnectionRefused,
            ))
        };

        let (behaviour, session) = self.devices.get(&device.name).ok_or_else(refused)?;
        match behaviour {
            MockBehaviour::Accept => Ok(Box::new(session.clone())),
            MockBehaviour::Refuse => Err(refused()),
            MockBehaviour::RejectLogin => Err(ClientError::Auth("invalid user name or password".into())),
            MockBehaviour::Delay(delay) if *delay >= timeout => {
                tokio::time::sleep(timeout).await;
                Err(ClientError::Timeout)
            }
            MockBehaviour::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(Box::new(session.clone()))
            }
            MockBehaviour::Panic => panic!("mock connector panic for {}", device.name),
        }
    }
}
