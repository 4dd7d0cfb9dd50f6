//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`UnfurlSettings::default()`]
//! 2. If `~/.unfurl/settings.json` exists, deep-merge user values over
//!    defaults (after the in-memory legacy transform, see [`crate::migration`])
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)
//!
//! Loading never writes the file; persisting a migrated or edited tree is
//! the caller's move via [`save_settings_to_path`].

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::migration::migrate_value;
use crate::types::UnfurlSettings;

/// Resolve the path to the settings file (`~/.unfurl/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".unfurl").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<UnfurlSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error. Files still carrying legacy top-level
/// keys are transformed in memory; the on-disk file is left as-is.
pub fn load_settings_from_path(path: &Path) -> Result<UnfurlSettings> {
    let defaults = serde_json::to_value(UnfurlSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let mut user: Value = serde_json::from_str(&content)?;
        let _ = migrate_value(&mut user);
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: UnfurlSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Write settings to a specific path as pretty JSON, creating parent
/// directories as needed.
pub fn save_settings_to_path(settings: &UnfurlSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    debug!(?path, "settings saved");
    Ok(())
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
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
/// Each env var has strict parsing rules:
/// - Integers must be valid and within the specified range
/// - Booleans accept: `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`
/// - Invalid values are silently ignored (fall back to file/default)
pub fn apply_env_overrides(settings: &mut UnfurlSettings) {
    if let Some(v) = read_env_bool("UNFURL_HANDLER_ENABLED") {
        settings.handler.enabled = v;
    }
    if let Some(v) = read_env_string("UNFURL_HANDLER_COMMAND") {
        settings.handler.command = v;
    }
    if let Some(v) = read_env_bool("UNFURL_SHELL_ENABLED") {
        settings.shell.enabled = v;
    }
    if let Some(v) = read_env_string("UNFURL_SHELL") {
        settings.shell.command = v;
    }
    if let Some(v) = read_env_string("UNFURL_TRIGGER_KEY") {
        settings.expansion.trigger_key = v;
    }
    if let Some(v) = read_env_usize("UNFURL_MAX_IN_FLIGHT", 1, 64) {
        settings.expansion.max_in_flight = v;
    }
    if let Some(v) = read_env_string("UNFURL_SCRIPTS_DIR") {
        settings.expansion.scripts_dir = v;
    }
    if let Some(v) = read_env_string("UNFURL_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

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

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
