//! Settings types and compiled defaults.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerSettings {
    /// HTTP / WebSocket listener.
    pub server: ServerSettings,
    /// Spreadsheet backing store.
    pub sheets: SheetsSettings,
    /// Date rollover and time zone.
    pub schedule: ScheduleSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl TrackerSettings {
    /// Check cross-field ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.schedule.cutoff_hour > 23 {
            return Err(SettingsError::InvalidValue(format!(
                "cutoffHour must be 0-23, got {}",
                self.schedule.cutoff_hour
            )));
        }
        if !(-12..=14).contains(&self.schedule.utc_offset_hours) {
            return Err(SettingsError::InvalidValue(format!(
                "utcOffsetHours must be -12..=14, got {}",
                self.schedule.utc_offset_hours
            )));
        }
        if self.sheets.sheet_name.is_empty() {
            return Err(SettingsError::InvalidValue("sheetName must not be empty".into()));
        }
        Ok(())
    }
}

/// Listener settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` picks a free port).
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Google Sheets settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetsSettings {
    /// Spreadsheet ID from the sheet URL.
    pub spreadsheet_id: String,
    /// Tab holding the checklist rows.
    pub sheet_name: String,
    /// Service-account key file.
    pub credentials_file: String,
    /// Sheets API root, overridable for tests and proxies.
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: "データ".to_string(),
            credentials_file: "service-account-key.json".to_string(),
            api_base_url: "https://sheets.googleapis.com".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Date rollover settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleSettings {
    /// Hour (0-23) at or after which new items are filed under tomorrow.
    pub cutoff_hour: u32,
    /// Fixed UTC offset for all date/time computation.
    pub utc_offset_hours: i32,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            cutoff_hour: 18,
            utc_offset_hours: 9,
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
