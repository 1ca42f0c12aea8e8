//! `/api/*` JSON handlers.
//!
//! Failures are reported in-band as `{"success": false, "error": ...}` with
//! HTTP 200; clients branch on `success`.

use axum::Json;
use axum::extract::{Query, State};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::warn;
use tracker_core::ChecklistItem;
use tracker_telemetry::metric_names::API_REQUESTS_TOTAL;

use crate::checklist::ChecklistError;
use crate::server::AppState;

/// Envelope shared by every API response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the operation completed.
    pub success: bool,
    /// Operation payload, flattened into the envelope on success.
    #[serde(flatten)]
    pub data: Option<T>,
    /// Failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed response carrying `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Query for `GET /api/load`.
#[derive(Debug, Deserialize)]
pub struct LoadQuery {
    /// `YYYY-MM-DD`.
    pub date: String,
}

/// `GET /api/load` payload.
#[derive(Debug, Serialize)]
pub struct LoadData {
    /// Items filed under the requested date.
    pub items: Vec<ChecklistItem>,
}

/// Body for `POST /api/add`.
#[derive(Debug, Deserialize)]
pub struct AddRequest {
    /// Item text.
    pub item: String,
    /// Accepted for compatibility; always treated as `add`.
    #[serde(default)]
    pub action: Option<String>,
}

/// `POST /api/add` payload.
#[derive(Debug, Serialize)]
pub struct AddData {
    /// Date the item was filed under.
    pub date: String,
    /// Item text.
    pub item: String,
}

/// Body for `POST /api/check`.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// `check` or `uncheck`.
    pub action: String,
    /// 1-based sheet row.
    pub row: u32,
}

/// `POST /api/check` payload.
#[derive(Debug, Serialize)]
pub struct CheckData {
    /// Check time, present for `check`.
    #[serde(rename = "checkedAt", skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<String>,
}

fn respond<T, U>(
    endpoint: &'static str,
    result: Result<T, ChecklistError>,
    map: impl FnOnce(T) -> U,
) -> Json<ApiResponse<U>> {
    match result {
        Ok(value) => {
            counter!(API_REQUESTS_TOTAL, "endpoint" => endpoint, "outcome" => "success").increment(1);
            Json(ApiResponse::ok(map(value)))
        }
        Err(e) => {
            counter!(API_REQUESTS_TOTAL, "endpoint" => endpoint, "outcome" => "failure").increment(1);
            warn!(endpoint, kind = e.error_kind(), error = %e, "request failed");
            Json(ApiResponse::failure(e.to_string()))
        }
    }
}

/// GET /api/load?date=YYYY-MM-DD
pub async fn load_handler(
    State(state): State<AppState>,
    Query(query): Query<LoadQuery>,
) -> Json<ApiResponse<LoadData>> {
    let result = state.checklist.load(&query.date).await;
    respond("load", result, |items| LoadData { items })
}

/// POST /api/add
pub async fn add_handler(
    State(state): State<AppState>,
    Json(req): Json<AddRequest>,
) -> Json<ApiResponse<AddData>> {
    let result = state.checklist.add(&req.item).await;
    respond("add", result, |added| AddData {
        date: added.date,
        item: added.item,
    })
}

/// POST /api/check
pub async fn check_handler(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> Json<ApiResponse<CheckData>> {
    let result = state.checklist.apply(&req.action, req.row).await;
    respond("check", result, |checked_at| CheckData { checked_at })
}
