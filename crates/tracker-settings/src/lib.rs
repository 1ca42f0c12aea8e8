//! # tracker-settings
//!
//! Configuration management with layered sources for the tracker server.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`TrackerSettings::default()`]
//! 2. **Settings file** — optional JSON file (deep-merged over defaults)
//! 3. **Environment variables** — `SPREADSHEET_ID`, `SHEET_NAME`,
//!    `CUTOFF_HOUR`, `CREDENTIALS_FILE`, `TRACKER_*` (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    SETTINGS_PATH_ENV, deep_merge, load_settings, load_settings_with_env, settings_path_from_env,
};
pub use types::*;
