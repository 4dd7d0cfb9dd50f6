//! # unfurl-settings
//!
//! Configuration management with layered sources for the unfurl engine.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`UnfurlSettings::default()`]
//! 2. **User file** — `~/.unfurl/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `UNFURL_*` overrides (highest priority)
//!
//! Files written by the pre-migration client are recognized and folded into
//! a parked `legacy_settings` blob; see [`migration`].
//!
//! There is no process-wide singleton; callers load settings explicitly via
//! [`load_settings`] (or [`load_settings_from_path`]) and pass the value to
//! whatever owns it.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod migration;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    deep_merge, load_settings, load_settings_from_path, save_settings_to_path, settings_path,
};
pub use migration::{migrate_file, migrate_value};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _settings = UnfurlSettings::default();
        let _path = settings_path();
    }

    #[test]
    fn deep_merge_re_exported() {
        let a = serde_json::json!({"x": 1});
        let b = serde_json::json!({"y": 2});
        let merged = deep_merge(a, b);
        assert_eq!(merged["x"], 1);
        assert_eq!(merged["y"], 2);
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = UnfurlSettings::default();
        assert_eq!(settings.version, "0.1.0");
        assert_eq!(settings.expansion.trigger_key, "Tab");
        assert_eq!(settings.expansion.max_in_flight, 1);
        assert!(!settings.handler.enabled);
        assert!(!settings.shell.enabled);
    }
}
