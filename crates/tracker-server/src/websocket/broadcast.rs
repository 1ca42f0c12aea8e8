//! Event fan-out to connected WebSocket clients.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};
use tracker_core::ChecklistEvent;
use tracker_telemetry::metric_names::{BROADCAST_EVENTS_TOTAL, BROADCAST_FAILURES_TOTAL};

use super::registry::ConnectionRegistry;

/// Outcome of one broadcast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Sessions the message was queued for.
    pub delivered: usize,
    /// Sessions that failed and were unregistered.
    pub failed: usize,
}

/// Pushes events to every registered session.
#[derive(Debug, Clone)]
pub struct BroadcastDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastDispatcher {
    /// Dispatcher over `registry`.
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher reads.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Serialize `event` once and queue it for every open session.
    ///
    /// Sessions whose send fails are unregistered before returning.
    pub async fn broadcast(&self, event: &ChecklistEvent) -> BroadcastReport {
        let event_type = event.event_type();
        let json = match serde_json::to_string(event) {
            Ok(j) => Arc::new(j),
            Err(e) => {
                warn!(event_type, error = %e, "failed to serialize event");
                return BroadcastReport::default();
            }
        };

        let sessions = self.registry.all().await;
        let (delivered, failed): (Vec<_>, Vec<_>) = sessions
            .iter()
            .map(|session| session.send(Arc::clone(&json)))
            .partition(Result::is_ok);

        for err in failed.iter().filter_map(|r| r.as_ref().err()) {
            if self.registry.unregister(&err.0).await {
                warn!(conn_id = %err.0, event_type, "pruned closed session");
            }
        }

        counter!(BROADCAST_EVENTS_TOTAL, "event_type" => event_type).increment(1);
        if !failed.is_empty() {
            counter!(BROADCAST_FAILURES_TOTAL).increment(failed.len() as u64);
        }

        let report = BroadcastReport {
            delivered: delivered.len(),
            failed: failed.len(),
        };
        debug!(
            event_type,
            delivered = report.delivered,
            failed = report.failed,
            "broadcast event"
        );
        report
    }
}
