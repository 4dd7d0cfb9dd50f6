//! Settings type definitions.
//!
//! All serde field names are snake_case, matching the on-disk JSON format.
//! Each type implements [`Default`] with production default values. Types
//! marked with `#[serde(default)]` allow partial JSON — missing fields get
//! their default value during deserialization.

use serde::{Deserialize, Serialize};
use unfurl_core::{FormatSpec, ShortcutEntry, SnippetEntry};

/// Default handler command template, resolved against the vault's scripts
/// directory at spawn time.
pub const DEFAULT_HANDLER_COMMAND: &str = "python3 <scripts_path>/main.py";

/// Default shell program for shortcut commands.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Root settings type for the unfurl engine.
///
/// Loaded from `~/.unfurl/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// All field names are snake_case. `legacy_settings` is omitted when `None`.
/// Example:
///
/// ```json
/// {
///   "version": "0.1.0",
///   "snippets": [{ "trigger": "sig", "replacement": "-- moose" }],
///   "handler": { "enabled": true }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UnfurlSettings {
    /// Settings schema version.
    pub version: String,
    /// Literal snippet rules, checked before shell shortcuts.
    pub snippets: Vec<SnippetEntry>,
    /// Pattern families scanned on every trigger keystroke, in order.
    pub formats: Vec<FormatSpec>,
    /// Long-lived handler process settings.
    pub handler: HandlerSettings,
    /// Shell shortcut settings.
    pub shell: ShellSettings,
    /// Trigger and session behavior.
    pub expansion: ExpansionSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Parked pre-migration settings blob. Never interpreted, only carried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_settings: Option<String>,
}

impl Default for UnfurlSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            snippets: default_snippets(),
            formats: default_formats(),
            handler: HandlerSettings::default(),
            shell: ShellSettings::default(),
            expansion: ExpansionSettings::default(),
            logging: LoggingSettings::default(),
            legacy_settings: None,
        }
    }
}

/// Default snippet table: a single blank entry.
///
/// The blank entry makes `{{}}` collapse to nothing out of the box and gives
/// the settings UI a row to start from.
#[must_use]
pub fn default_snippets() -> Vec<SnippetEntry> {
    vec![SnippetEntry::default()]
}

/// Default pattern families: double-brace regions and colon-words.
///
/// `{{...}}` matches lazily and refuses nested braces via lookahead;
/// `:word` matches a colon followed by non-whitespace.
#[must_use]
pub fn default_formats() -> Vec<FormatSpec> {
    vec![
        FormatSpec::new("\\{\\{(?:(?!\\{\\{|\\}\\}).)*?\\}\\}", 2, 2),
        FormatSpec::new(":[^\\s]*", 1, 0),
    ]
}

/// Long-lived handler process settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerSettings {
    /// Whether the handler process is spawned and consulted.
    pub enabled: bool,
    /// Command template spawning the handler. Context placeholders are
    /// substituted before the command line is split into argv.
    pub command: String,
    /// Whether content no rule matched is forwarded to the handler.
    pub forward_unmatched: bool,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            command: DEFAULT_HANDLER_COMMAND.to_string(),
            forward_unmatched: true,
        }
    }
}

/// Shell shortcut settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    /// Whether shortcut commands are delegated to a long-lived shell.
    pub enabled: bool,
    /// Shell program spawned once and fed command lines on stdin.
    pub command: String,
    /// Regex shortcut rules, checked after snippets, in table order.
    pub shortcuts: Vec<ShortcutEntry>,
    /// Whether the shell is respawned (with backoff) after it exits.
    pub respawn_on_exit: bool,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            command: DEFAULT_SHELL.to_string(),
            shortcuts: Vec::new(),
            respawn_on_exit: true,
        }
    }
}

/// Trigger and session behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionSettings {
    /// Key that initiates pattern scanning.
    pub trigger_key: String,
    /// Capacity of each pending-request queue. A trigger arriving while a
    /// queue is full is rejected with a notice.
    pub max_in_flight: usize,
    /// Scripts directory, relative to the vault root.
    pub scripts_dir: String,
}

impl Default for ExpansionSettings {
    fn default() -> Self {
        Self {
            trigger_key: "Tab".to_string(),
            max_in_flight: 1,
            scripts_dir: ".scripts".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level filter (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
