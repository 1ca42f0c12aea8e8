//! `/health` endpoint.

use serde::Serialize;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: &'static str,
    /// Current WebSocket session count.
    pub connections: usize,
}

/// Build a health response from the live session count.
pub fn health_check(connections: usize) -> HealthResponse {
    HealthResponse {
        status: "ok",
        connections,
    }
}
