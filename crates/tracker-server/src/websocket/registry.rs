//! Set of open sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use metrics::gauge;
use tokio::sync::RwLock;
use tracker_telemetry::metric_names::WS_CONNECTIONS_ACTIVE;

use super::connection::{ConnectionId, SessionHandle};

/// Open sessions indexed by id.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: RwLock<HashMap<ConnectionId, Arc<SessionHandle>>>,
    /// Mirrors `sessions.len()` so counting never waits on the lock.
    active_count: AtomicUsize,
}

impl ConnectionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session. Returns `false` if the id was already present.
    pub async fn register(&self, session: Arc<SessionHandle>) -> bool {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id()) {
            return false;
        }
        let _ = sessions.insert(session.id(), session);
        let _ = self.active_count.fetch_add(1, Ordering::Relaxed);
        gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);
        true
    }

    /// Remove a session. Returns `false` if it was not present.
    pub async fn unregister(&self, id: &ConnectionId) -> bool {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(id).is_some() {
            let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
            gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
            true
        } else {
            false
        }
    }

    /// Owned snapshot of the open sessions, in no particular order.
    pub async fn all(&self) -> Vec<Arc<SessionHandle>> {
        self.sessions.read().await.values().cloned().collect()
    }

    /// Whether `id` is registered.
    pub async fn contains(&self, id: &ConnectionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Number of open sessions.
    pub fn count(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}
