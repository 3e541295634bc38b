//! Optional reuse of device sessions across scrapes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

use crate::client::Command;
use crate::client::session::Session;

type Slot = Arc<tokio::sync::Mutex<Option<Box<dyn Session>>>>;

/// Command used to check that a pooled session still answers.
const PROBE_COMMAND: &str = "/system/identity/print";

/// Per-device session cache.
///
/// At most one session is cached per device. A [`Lease`] holds the device's
/// slot lock, so overlapping scrapes never use the same session at once.
/// When reuse is disabled, leases are empty and every session is closed on
/// release.
pub struct SessionPool {
    enabled: bool,
    slots: Mutex<HashMap<String, Slot>>,
}

impl SessionPool {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Acquire the slot for `device`, waiting while another scrape holds it.
    pub async fn lease(&self, device: &str) -> Lease {
        if !self.enabled {
            return Lease { guard: None };
        }

        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(device.to_string()).or_default())
        };
        Lease {
            guard: Some(slot.lock_owned().await),
        }
    }

    /// Close every cached session. Used on shutdown.
    pub async fn close_all(&self) {
        let slots: Vec<Slot> = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.values().cloned().collect()
        };
        for slot in slots {
            if let Some(mut session) = slot.lock().await.take() {
                session.close().await;
            }
        }
    }
}

impl std::fmt::Debug for SessionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPool")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Exclusive access to one device's pool slot.
pub struct Lease {
    guard: Option<OwnedMutexGuard<Option<Box<dyn Session>>>>,
}

impl Lease {
    /// Take the cached session if it still answers a probe.
    ///
    /// A session that fails the probe is closed and discarded.
    pub async fn take(&mut self) -> Option<Box<dyn Session>> {
        let mut session = self.guard.as_mut()?.take()?;
        if !session.is_healthy() {
            session.close().await;
            return None;
        }
        match session.query(&Command::new(PROBE_COMMAND)).await {
            Ok(_) => Some(session),
            Err(e) => {
                tracing::debug!(error = %e, "Discarding stale pooled session");
                session.close().await;
                None
            }
        }
    }

    /// Return a session after collection. Healthy sessions stay cached when
    /// reuse is enabled; everything else is closed.
    pub async fn release(mut self, mut session: Box<dyn Session>) {
        match self.guard.as_mut() {
            Some(slot) if session.is_healthy() => {
                if let Some(mut previous) = slot.replace(session) {
                    previous.close().await;
                }
            }
            _ => session.close().await,
        }
    }
}
