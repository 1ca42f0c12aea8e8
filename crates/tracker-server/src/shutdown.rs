//! Server lifecycle.
//!
//! One `CancellationToken` is shared by the HTTP listener and every
//! `WebSocket` session. Stopping the server cancels it, then gives the serve
//! task a bounded grace period to drain before aborting it.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Grace period for the serve task after cancellation.
const DEFAULT_GRACE: Duration = Duration::from_secs(10);

/// How the serve task ended during [`ShutdownCoordinator::stop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    /// Finished on its own within the grace period.
    Drained,
    /// Panicked or was cancelled before finishing.
    Failed,
    /// Still running when the grace period ran out; aborted.
    Aborted,
}

/// Owns the stop signal for a running server.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    grace: Duration,
}

impl ShutdownCoordinator {
    /// Coordinator with the default grace period.
    pub fn new() -> Self {
        Self::with_grace(DEFAULT_GRACE)
    }

    /// Coordinator that waits at most `grace` for the serve task.
    pub fn with_grace(grace: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            grace,
        }
    }

    /// Token observed by the listener and sessions.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Signal every session and the listener to wind down.
    pub fn trigger(&self) {
        if !self.token.is_cancelled() {
            info!("shutdown requested");
        }
        self.token.cancel();
    }

    /// Whether [`trigger`](Self::trigger) has been called.
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Trigger shutdown and wait for `serve` (from `TrackerServer::listen`).
    ///
    /// If the task is still running after the grace period it is aborted.
    pub async fn stop(&self, mut serve: JoinHandle<()>) -> StopOutcome {
        self.trigger();
        match tokio::time::timeout(self.grace, &mut serve).await {
            Ok(Ok(())) => StopOutcome::Drained,
            Ok(Err(e)) => {
                warn!(error = %e, "serve task did not finish cleanly");
                StopOutcome::Failed
            }
            Err(_) => {
                warn!(grace = ?self.grace, "serve task still running, aborting");
                serve.abort();
                StopOutcome::Aborted
            }
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
