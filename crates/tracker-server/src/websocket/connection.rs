//! WebSocket session handle.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use uuid::Uuid;

/// Opaque, time-ordered session identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Fresh UUIDv7 id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The session's writer has gone away; the message was not queued.
#[derive(Debug, thiserror::Error)]
#[error("session {0} is closed")]
pub struct SessionClosed(pub ConnectionId);

/// Sending side of one connected client.
///
/// Text queued here is forwarded to the socket by the session's writer task.
/// The queue is unbounded, so sending only fails once the writer has exited.
#[derive(Debug)]
pub struct SessionHandle {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Arc<String>>,
    connected_at: Instant,
}

impl SessionHandle {
    /// New session with a fresh id.
    pub fn new(tx: mpsc::UnboundedSender<Arc<String>>) -> Self {
        Self::with_id(ConnectionId::new(), tx)
    }

    /// New session with a caller-chosen id.
    pub fn with_id(id: ConnectionId, tx: mpsc::UnboundedSender<Arc<String>>) -> Self {
        Self {
            id,
            tx,
            connected_at: Instant::now(),
        }
    }

    /// Session id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a text frame for the client.
    pub fn send(&self, message: Arc<String>) -> Result<(), SessionClosed> {
        self.tx.send(message).map_err(|_| SessionClosed(self.id))
    }

    /// Whether the writer has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Time since the handshake.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
