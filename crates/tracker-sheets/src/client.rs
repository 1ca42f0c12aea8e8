//! Google Sheets v4 `spreadsheets.values` client.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};
use tracker_telemetry::metric_names::{STORE_ERRORS_TOTAL, STORE_REQUEST_DURATION_SECONDS};

use crate::auth::TokenProvider;
use crate::error::SheetsError;
use crate::range::CellRange;
use crate::store::RowStore;

/// Connection settings for one spreadsheet.
#[derive(Clone, Debug)]
pub struct SheetsConfig {
    /// API root, e.g. `https://sheets.googleapis.com`.
    pub base_url: String,
    /// Target spreadsheet ID.
    pub spreadsheet_id: String,
}

/// Build the HTTP client shared by the API and token requests.
pub fn build_http_client(request_timeout: Duration) -> Result<reqwest::Client, SheetsError> {
    Ok(reqwest::Client::builder().timeout(request_timeout).build()?)
}

#[derive(Serialize)]
struct ValueRange<'a> {
    range: String,
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

/// [`RowStore`] backed by the Sheets values API.
pub struct SheetsClient {
    config: SheetsConfig,
    http: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SheetsClient {
    /// Create a client. Fails if `base_url` is not an absolute URL.
    pub fn new(
        config: SheetsConfig,
        http: reqwest::Client,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, SheetsError> {
        let _ = parse_base(&config.base_url)?;
        if config.spreadsheet_id.is_empty() {
            return Err(SheetsError::Config("spreadsheet ID is empty".into()));
        }
        Ok(Self {
            config,
            http,
            tokens,
        })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}{suffix}`, percent-encoded.
    fn values_url(&self, range: &CellRange, suffix: &str) -> Result<Url, SheetsError> {
        let mut url = parse_base(&self.config.base_url)?;
        let segment = format!("{range}{suffix}");
        let _ = url
            .path_segments_mut()
            .map_err(|()| SheetsError::Config(format!("{} cannot be a base", self.config.base_url)))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.config.spreadsheet_id.as_str(),
                "values",
                segment.as_str(),
            ]);
        Ok(url)
    }

    /// Send with bearer auth, recording timing and failures under `operation`.
    async fn execute(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, SheetsError> {
        let started = Instant::now();
        let result = self.execute_inner(request).await;
        metrics::histogram!(STORE_REQUEST_DURATION_SECONDS, "operation" => operation)
            .record(started.elapsed().as_secs_f64());
        if let Err(e) = &result {
            metrics::counter!(STORE_ERRORS_TOTAL, "operation" => operation, "kind" => e.error_kind())
                .increment(1);
        }
        result
    }

    async fn execute_inner(&self, request: reqwest::RequestBuilder) -> Result<Value, SheetsError> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_api_error(&body, status.as_u16());
            error!(status = status.as_u16(), %message, "Sheets API error");
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| SheetsError::Api {
            status: status.as_u16(),
            message: format!("malformed response body: {e}"),
        })
    }
}

fn parse_base(base_url: &str) -> Result<Url, SheetsError> {
    Url::parse(base_url).map_err(|e| SheetsError::Config(format!("invalid base URL {base_url}: {e}")))
}

/// Pull `error.message` out of a Google error body.
fn parse_api_error(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| format!("HTTP {status}: {body}"))
}

/// Render a cell the way the sheet displays it.
fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "TRUE".into(),
        Value::Bool(false) => "FALSE".into(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `values` of a ValueRange response; absent when the range is empty.
fn rows_from_response(body: &Value) -> Vec<Vec<String>> {
    body.get("values")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| cells.iter().map(cell_to_string).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl RowStore for SheetsClient {
    async fn read(&self, range: &CellRange) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(range, "")?;
        debug!(%range, "reading values");
        let body = self.execute("read", self.http.get(url)).await?;
        Ok(rows_from_response(&body))
    }

    async fn append(&self, range: &CellRange, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        let url = self.values_url(range, ":append")?;
        debug!(%range, rows = rows.len(), "appending values");
        let body = ValueRange {
            range: range.to_string(),
            major_dimension: "ROWS",
            values: &rows,
        };
        let request = self
            .http
            .post(url)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&body);
        let _ = self.execute("append", request).await?;
        Ok(())
    }

    async fn update(&self, range: &CellRange, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        if range.rows().is_none() {
            return Err(SheetsError::InvalidRange(format!(
                "{range}: update needs a bounded row span"
            )));
        }
        let url = self.values_url(range, "")?;
        debug!(%range, "updating values");
        let body = ValueRange {
            range: range.to_string(),
            major_dimension: "ROWS",
            values: &rows,
        };
        let request = self
            .http
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&body);
        let _ = self.execute("update", request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::StaticToken;
    use crate::range::Column;

    fn client_for(server: &MockServer) -> SheetsClient {
        SheetsClient::new(
            SheetsConfig {
                base_url: server.uri(),
                spreadsheet_id: "sheet-1".into(),
            },
            reqwest::Client::new(),
            Arc::new(StaticToken("ya29.test".into())),
        )
        .unwrap()
    }

    #[test]
    fn values_url_encodes_non_ascii_sheet() {
        let client = SheetsClient::new(
            SheetsConfig {
                base_url: "https://sheets.googleapis.com/".into(),
                spreadsheet_id: "abc".into(),
            },
            reqwest::Client::new(),
            Arc::new(StaticToken(String::new())),
        )
        .unwrap();
        let url = client
            .values_url(&CellRange::columns("データ", Column::A, Column::E), "")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/%E3%83%87%E3%83%BC%E3%82%BF!A:E"
        );
    }

    #[test]
    fn values_url_escapes_quoted_sheet() {
        let client = SheetsClient::new(
            SheetsConfig {
                base_url: "https://sheets.googleapis.com".into(),
                spreadsheet_id: "abc".into(),
            },
            reqwest::Client::new(),
            Arc::new(StaticToken(String::new())),
        )
        .unwrap();
        let url = client
            .values_url(&CellRange::cell("Daily Items", Column::B, 2), "")
            .unwrap();
        assert!(url.path().ends_with("/values/'Daily%20Items'!B2"));
    }

    #[test]
    fn invalid_config_rejected() {
        let tokens: Arc<dyn TokenProvider> = Arc::new(StaticToken(String::new()));
        let bad_url = SheetsClient::new(
            SheetsConfig {
                base_url: "not a url".into(),
                spreadsheet_id: "abc".into(),
            },
            reqwest::Client::new(),
            Arc::clone(&tokens),
        );
        assert_matches!(bad_url, Err(SheetsError::Config(_)));

        let no_id = SheetsClient::new(
            SheetsConfig {
                base_url: "https://sheets.googleapis.com".into(),
                spreadsheet_id: String::new(),
            },
            reqwest::Client::new(),
            tokens,
        );
        assert_matches!(no_id, Err(SheetsError::Config(_)));
    }

    #[test]
    fn cells_render_as_displayed() {
        assert_eq!(cell_to_string(&serde_json::json!("済")), "済");
        assert_eq!(cell_to_string(&serde_json::json!(true)), "TRUE");
        assert_eq!(cell_to_string(&serde_json::json!(false)), "FALSE");
        assert_eq!(cell_to_string(&serde_json::json!(42)), "42");
        assert_eq!(cell_to_string(&Value::Null), "");
    }

    #[test]
    fn api_error_message_extracted() {
        let body = r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            parse_api_error(body, 403),
            "The caller does not have permission"
        );
        assert_eq!(parse_api_error("gateway down", 502), "HTTP 502: gateway down");
    }

    #[tokio::test]
    async fn read_returns_rows_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-1/values/Items!A:E"))
            .and(header("authorization", "Bearer ya29.test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "range": "Items!A1:E3",
                "majorDimension": "ROWS",
                "values": [
                    ["date", "item", "inputTime", "checked", "checkedAt"],
                    ["2026-03-01", "milk", "08:00:00", true],
                    ["2026-03-01", "eggs"]
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let rows = client_for(&server)
            .read(&CellRange::columns("Items", Column::A, Column::E))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["2026-03-01", "milk", "08:00:00", "TRUE"]);
        assert_eq!(rows[2].len(), 2);
    }

    #[tokio::test]
    async fn read_of_empty_range_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-1/values/Items!B9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "range": "Items!B9",
                "majorDimension": "ROWS"
            })))
            .mount(&server)
            .await;

        let rows = client_for(&server)
            .read(&CellRange::cell("Items", Column::B, 9))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn append_posts_raw_insert_rows() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets/sheet-1/values/Items!A:E:append"))
            .and(query_param("valueInputOption", "RAW"))
            .and(query_param("insertDataOption", "INSERT_ROWS"))
            .and(body_json(serde_json::json!({
                "range": "Items!A:E",
                "majorDimension": "ROWS",
                "values": [["2026-03-02", "eggs", "09:00:00", "", ""]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "spreadsheetId": "sheet-1",
                "updates": {"updatedRange": "Items!A4:E4", "updatedRows": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .append(
                &CellRange::columns("Items", Column::A, Column::E),
                vec![vec![
                    "2026-03-02".into(),
                    "eggs".into(),
                    "09:00:00".into(),
                    String::new(),
                    String::new(),
                ]],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_puts_row_span() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v4/spreadsheets/sheet-1/values/Items!D5:E5"))
            .and(query_param("valueInputOption", "RAW"))
            .and(body_json(serde_json::json!({
                "range": "Items!D5:E5",
                "majorDimension": "ROWS",
                "values": [["済", "10:30:00"]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "updatedCells": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .update(
                &CellRange::row_span("Items", Column::D, Column::E, 5),
                vec![vec!["済".into(), "10:30:00".into()]],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_requires_bounded_range() {
        let server = MockServer::start().await;
        let err = client_for(&server)
            .update(&CellRange::columns("Items", Column::D, Column::E), vec![])
            .await
            .unwrap_err();
        assert_matches!(err, SheetsError::InvalidRange(_));
    }

    #[tokio::test]
    async fn api_error_surfaces_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {
                    "code": 403,
                    "message": "The caller does not have permission",
                    "status": "PERMISSION_DENIED"
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .read(&CellRange::columns("Items", Column::A, Column::E))
            .await
            .unwrap_err();
        assert_matches!(
            err,
            SheetsError::Api { status: 403, ref message } if message == "The caller does not have permission"
        );
    }

    #[tokio::test]
    async fn token_failure_skips_request() {
        struct FailingToken;

        #[async_trait]
        impl TokenProvider for FailingToken {
            async fn access_token(&self) -> Result<String, SheetsError> {
                Err(SheetsError::TokenExchange {
                    status: 401,
                    message: "invalid_grant".into(),
                })
            }
        }

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = SheetsClient::new(
            SheetsConfig {
                base_url: server.uri(),
                spreadsheet_id: "sheet-1".into(),
            },
            reqwest::Client::new(),
            Arc::new(FailingToken),
        )
        .unwrap();
        let err = client
            .read(&CellRange::columns("Items", Column::A, Column::E))
            .await
            .unwrap_err();
        assert_matches!(err, SheetsError::TokenExchange { status: 401, .. });
    }
}
