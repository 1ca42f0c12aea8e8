//! Metric name constants shared across crates.

/// WebSocket connections opened total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket disconnections total (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// WebSocket session lifetime seconds (histogram).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";
/// Active WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Broadcast events dispatched (counter, labels: `event_type`).
pub const BROADCAST_EVENTS_TOTAL: &str = "broadcast_events_total";
/// Sessions pruned after a failed broadcast send (counter).
pub const BROADCAST_FAILURES_TOTAL: &str = "broadcast_failures_total";
/// HTTP API requests (counter, labels: endpoint, outcome).
pub const API_REQUESTS_TOTAL: &str = "api_requests_total";
/// Remote store calls that failed (counter, labels: operation).
pub const STORE_ERRORS_TOTAL: &str = "store_errors_total";
/// Remote store call duration seconds (histogram, labels: operation).
pub const STORE_REQUEST_DURATION_SECONDS: &str = "store_request_duration_seconds";
/// Access token refreshes (counter, labels: status).
pub const AUTH_REFRESH_TOTAL: &str = "auth_refresh_total";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_constants_are_snake_case() {
        let names = [
            WS_CONNECTIONS_TOTAL,
            WS_DISCONNECTIONS_TOTAL,
            WS_CONNECTION_DURATION_SECONDS,
            WS_CONNECTIONS_ACTIVE,
            BROADCAST_EVENTS_TOTAL,
            BROADCAST_FAILURES_TOTAL,
            API_REQUESTS_TOTAL,
            STORE_ERRORS_TOTAL,
            STORE_REQUEST_DURATION_SECONDS,
            AUTH_REFRESH_TOTAL,
        ];
        for name in names {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
