//! # tracker
//!
//! Daily checklist server binary: loads settings, wires the row store into
//! the HTTP/WebSocket server, and runs until Ctrl-C.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracker_core::SystemClock;
use tracker_core::items::COLUMN_COUNT;
use tracker_server::{ChecklistConfig, ServerConfig, TrackerServer};
use tracker_settings::TrackerSettings;
use tracker_sheets::{
    InMemoryRowStore, RowStore, ServiceAccountAuth, SheetsClient, SheetsConfig, build_http_client,
};
use tracker_telemetry::LogConfig;

/// Header written to a fresh in-memory sheet.
const HEADER: [&str; COLUMN_COUNT] = ["date", "item", "inputTime", "checked", "checkedAt"];

/// Shared daily checklist server.
#[derive(Parser, Debug)]
#[command(name = "tracker", about = "Shared daily checklist server")]
struct Cli {
    /// Settings file (JSON). Defaults to `$TRACKER_SETTINGS` if set.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Serve from an in-process sheet instead of Google Sheets.
    #[arg(long)]
    in_memory: bool,

    /// Port to bind (overrides settings).
    #[arg(long)]
    port: Option<u16>,
}

/// Build the row store the server reads and writes.
fn build_store(settings: &TrackerSettings, in_memory: bool) -> Result<Arc<dyn RowStore>> {
    let sheets = &settings.sheets;
    if in_memory {
        let header = HEADER.iter().map(|h| (*h).to_string()).collect();
        return Ok(Arc::new(InMemoryRowStore::with_rows(&sheets.sheet_name, vec![header])));
    }

    if sheets.spreadsheet_id.is_empty() {
        bail!("no spreadsheet configured: set SPREADSHEET_ID or sheets.spreadsheetId (or pass --in-memory)");
    }
    let http = build_http_client(Duration::from_secs(sheets.request_timeout_secs))
        .context("Failed to build HTTP client")?;
    let auth = ServiceAccountAuth::from_file(Path::new(&sheets.credentials_file), http.clone())
        .context("Failed to load service-account credentials")?;
    let client = SheetsClient::new(
        SheetsConfig {
            base_url: sheets.api_base_url.clone(),
            spreadsheet_id: sheets.spreadsheet_id.clone(),
        },
        http,
        Arc::new(auth),
    )
    .context("Failed to configure Sheets client")?;
    Ok(Arc::new(client))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings_path = args.settings.or_else(tracker_settings::settings_path_from_env);
    let mut settings =
        tracker_settings::load_settings(settings_path.as_deref()).context("Failed to load settings")?;
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    tracker_telemetry::init_logging(&LogConfig {
        level: settings.logging.level.clone(),
        json: settings.logging.json,
    })?;
    let metrics = tracker_telemetry::install_metrics_recorder()?;

    let store = build_store(&settings, args.in_memory)?;
    let clock = SystemClock::from_utc_offset_hours(settings.schedule.utc_offset_hours)
        .context("Invalid UTC offset")?;

    let server = TrackerServer::new(
        ServerConfig {
            host: settings.server.host.clone(),
            port: settings.server.port,
        },
        ChecklistConfig {
            sheet_name: settings.sheets.sheet_name.clone(),
            cutoff_hour: settings.schedule.cutoff_hour,
        },
        store,
        Arc::new(clock),
    )
    .with_metrics(metrics);

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!(
        in_memory = args.in_memory,
        sheet = %settings.sheets.sheet_name,
        cutoff_hour = settings.schedule.cutoff_hour,
        "tracker listening on http://{addr}"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    let outcome = server.shutdown().stop(handle).await;
    tracing::info!(?outcome, "Shutdown complete");
    Ok(())
}
