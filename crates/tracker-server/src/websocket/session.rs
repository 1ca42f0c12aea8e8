//! WebSocket session lifecycle: one connected client from upgrade through
//! disconnect.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, histogram};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use tracker_telemetry::metric_names::{
    WS_CONNECTION_DURATION_SECONDS, WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL,
};

use super::connection::SessionHandle;
use super::registry::ConnectionRegistry;

/// Client keepalive message.
const PING: &str = "ping";
/// Reply to [`PING`].
const PONG: &str = "pong";

/// Reply for an inbound text frame, if it needs one.
pub fn keepalive_reply(text: &str) -> Option<&'static str> {
    (text == PING).then_some(PONG)
}

/// Run a WebSocket session for a connected client.
///
/// Registers the session, forwards its outbound queue to the socket from a
/// writer task, and answers `ping` with `pong` until the client closes, the
/// transport fails, or `shutdown` fires. The session is unregistered on exit.
#[instrument(skip_all, fields(conn_id))]
pub async fn run_ws_session(
    ws: WebSocket,
    registry: Arc<ConnectionRegistry>,
    shutdown: CancellationToken,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (send_tx, mut send_rx) = mpsc::unbounded_channel::<Arc<String>>();
    let session = Arc::new(SessionHandle::new(send_tx));
    let conn_id = session.id();
    let _ = tracing::Span::current().record("conn_id", tracing::field::display(conn_id));

    let _ = registry.register(Arc::clone(&session)).await;
    info!(%conn_id, connections = registry.count(), "client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);

    // Exits on the first failed write, dropping the receiver so later sends fail.
    let writer = tokio::spawn(async move {
        while let Some(text) = send_rx.recv().await {
            if ws_tx.send(Message::Text(text.as_str().into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        let frame = tokio::select! {
            () = shutdown.cancelled() => break,
            frame = ws_rx.next() => frame,
        };
        match frame {
            Some(Ok(Message::Text(text))) => {
                if let Some(reply) = keepalive_reply(text.as_str()) {
                    if session.send(Arc::new(reply.to_string())).is_err() {
                        break;
                    }
                }
            }
            Some(Ok(Message::Close(_))) => {
                debug!(%conn_id, "client sent close frame");
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                debug!(%conn_id, error = %e, "websocket read failed");
                break;
            }
            None => break,
        }
    }

    let _ = registry.unregister(&conn_id).await;
    writer.abort();
    info!(%conn_id, connections = registry.count(), "client disconnected");
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(session.age().as_secs_f64());
}
