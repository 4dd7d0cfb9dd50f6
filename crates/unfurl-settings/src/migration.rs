//! Legacy settings migration shim.
//!
//! Early settings files kept the shortcut table and shell program as
//! top-level keys: `shortcuts` (array of rules) and `shell` (program
//! string). The current format nests both under the `shell` section, which
//! turned the old keys into unambiguous markers of a pre-migration file.
//!
//! Migration folds the old keys into a `legacy_settings` string blob
//! (pretty-printed with tab indentation, exactly as the old client wrote
//! it), removes them from the live tree, and leaves the blob parked for the
//! user to inspect. The legacy rule table is never auto-adopted. A file that
//! already carries a `legacy_settings` blob is left untouched.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::Result;

/// Shape of the parked legacy blob.
#[derive(Debug, Serialize, Deserialize)]
struct LegacySettings {
    shortcuts: Value,
    shell: String,
}

/// Fold legacy top-level keys into the `legacy_settings` blob, in memory.
///
/// Returns `true` if the tree changed. A tree that already has a non-null
/// `legacy_settings`, or carries no legacy keys, is left untouched.
pub fn migrate_value(root: &mut Value) -> bool {
    let Some(obj) = root.as_object_mut() else {
        return false;
    };
    if obj.get("legacy_settings").is_some_and(|v| !v.is_null()) {
        return false;
    }

    let shortcuts = match obj.get("shortcuts") {
        Some(Value::Array(_)) => obj.remove("shortcuts"),
        _ => None,
    };
    let shell = match obj.get("shell") {
        Some(Value::String(_)) => obj.remove("shell"),
        _ => None,
    };
    if shortcuts.is_none() && shell.is_none() {
        return false;
    }

    let legacy = LegacySettings {
        shortcuts: shortcuts.unwrap_or_else(|| Value::Array(Vec::new())),
        shell: shell
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default(),
    };
    let _ = obj.insert(
        "legacy_settings".to_string(),
        Value::String(to_tab_json(&legacy)),
    );
    true
}

/// Migrate a settings file on disk, saving it back if anything changed.
///
/// Returns `true` if the file was rewritten. A missing file is a no-op.
pub fn migrate_file(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let content = std::fs::read_to_string(path)?;
    let mut root: Value = serde_json::from_str(&content)?;
    if !migrate_value(&mut root) {
        return Ok(false);
    }
    std::fs::write(path, serde_json::to_string_pretty(&root)?)?;
    info!(?path, "legacy settings keys folded into legacy_settings blob");
    Ok(true)
}

/// Serialize with tab indentation, matching the old client's blob format.
fn to_tab_json<T: Serialize>(value: &T) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if value.serialize(&mut ser).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
