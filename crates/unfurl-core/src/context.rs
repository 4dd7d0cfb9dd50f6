//! Substitution context resolved from the host workspace state.

use serde::{Deserialize, Serialize};

/// Named substitution variables for one expansion.
///
/// Resolved fresh for every expansion from the editor's current state; never
/// cached across edits, because the active file can change between
/// keystrokes. File-scoped fields are `None` when no file is open.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionContext {
    /// Absolute path of the workspace (vault) root.
    pub vault_path: String,
    /// Name of the active file, if one is open.
    pub file_name: Option<String>,
    /// Absolute path of the active file, if one is open.
    pub file_path: Option<String>,
    /// Path of the active file's parent directory, relative to the vault.
    ///
    /// Templater-only placeholder; handler requests carry exactly
    /// `vault_path`, `file_name`, `file_path`, and `scripts_path`.
    #[serde(skip)]
    pub inner_path: Option<String>,
    /// Absolute path of the scripts directory inside the vault.
    pub scripts_path: String,
}

impl ExpansionContext {
    /// Whether an active file contributed the file-scoped fields.
    #[must_use]
    pub fn has_active_file(&self) -> bool {
        self.file_name.is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
