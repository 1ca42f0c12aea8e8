//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`TrackerSettings::default()`]
//! 2. If a settings file is given and exists, deep-merge its values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate ranges
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::TrackerSettings;

/// Env var naming an optional settings file.
pub const SETTINGS_PATH_ENV: &str = "TRACKER_SETTINGS";

/// Settings file named by `TRACKER_SETTINGS`, if any.
pub fn settings_path_from_env() -> Option<PathBuf> {
    read_env_string(&process_env, SETTINGS_PATH_ENV).map(PathBuf::from)
}

/// Load settings from an optional file with process env overrides.
pub fn load_settings(path: Option<&Path>) -> Result<TrackerSettings> {
    load_settings_with_env(path, &process_env)
}

/// Load settings from an optional file, resolving overrides through `env`.
///
/// A missing file yields defaults. A file with invalid JSON is an error.
pub fn load_settings_with_env(
    path: Option<&Path>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<TrackerSettings> {
    let defaults = serde_json::to_value(TrackerSettings::default())?;

    let merged = match path {
        Some(path) if path.exists() => {
            debug!(?path, "loading settings from file");
            let content = std::fs::read_to_string(path)?;
            let user: Value = serde_json::from_str(&content)?;
            deep_merge(defaults, user)
        }
        Some(path) => {
            debug!(?path, "settings file not found, using defaults");
            defaults
        }
        None => defaults,
    };

    let mut settings: TrackerSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings, env);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning (file/default value wins).
pub fn apply_env_overrides(settings: &mut TrackerSettings, env: &dyn Fn(&str) -> Option<String>) {
    // ── Sheets ──────────────────────────────────────────────────────
    if let Some(v) = read_env_string(env, "SPREADSHEET_ID") {
        settings.sheets.spreadsheet_id = v;
    }
    if let Some(v) = read_env_string(env, "SHEET_NAME") {
        settings.sheets.sheet_name = v;
    }
    if let Some(v) = read_env_string(env, "CREDENTIALS_FILE") {
        settings.sheets.credentials_file = v;
    }
    if let Some(v) = read_env_string(env, "SHEETS_API_BASE_URL") {
        settings.sheets.api_base_url = v;
    }

    // ── Schedule ────────────────────────────────────────────────────
    if let Some(v) = read_env_u32(env, "CUTOFF_HOUR", 0, 23) {
        settings.schedule.cutoff_hour = v;
    }

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = read_env_string(env, "TRACKER_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_env_u16(env, "TRACKER_PORT", 0, 65535) {
        settings.server.port = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string(env, "TRACKER_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_bool(env, "TRACKER_LOG_JSON") {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers ─────────────────────────────────────────────────────────

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn read_env_string(env: &dyn Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    env(name).filter(|v| !v.is_empty())
}

fn read_env_bool(env: &dyn Fn(&str) -> Option<String>, name: &str) -> Option<bool> {
    let val = env(name)?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u16(env: &dyn Fn(&str) -> Option<String>, name: &str, min: u16, max: u16) -> Option<u16> {
    let val = env(name)?;
    let result = parse_u16_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
    }
    result
}

fn read_env_u32(env: &dyn Fn(&str) -> Option<String>, name: &str, min: u32, max: u32) -> Option<u32> {
    let val = env(name)?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}
