//! In-memory editor and notifier implementations.
//!
//! [`ScratchBuffer`] is the line-based, char-indexed [`Editor`] the CLI and
//! the tests run against. It follows the collaborator contract to the
//! letter: coordinates count Unicode scalar values, and out-of-range
//! replacement coordinates are clamped to the current buffer shape, never a
//! fault — asynchronous responses are allowed to arrive with stale targets.
//!
//! [`NoticeLog`] collects user-visible notices and mirrors them to the log.

use std::path::PathBuf;

use parking_lot::{Mutex, RwLock};
use tracing::info;
use unfurl_core::{ActiveFile, CursorPos, Editor, Notifier};

/// An in-memory buffer standing in for the host editor.
pub struct ScratchBuffer {
    lines: RwLock<Vec<String>>,
    cursor: RwLock<CursorPos>,
    active: RwLock<Option<ActiveFile>>,
    vault: PathBuf,
}

impl ScratchBuffer {
    /// An empty one-line buffer rooted at `vault`.
    #[must_use]
    pub fn new(vault: impl Into<PathBuf>) -> Self {
        Self {
            lines: RwLock::new(vec![String::new()]),
            cursor: RwLock::new(CursorPos::default()),
            active: RwLock::new(None),
            vault: vault.into(),
        }
    }

    /// A single-line buffer with the cursor placed at `ch`.
    #[must_use]
    pub fn from_line(vault: impl Into<PathBuf>, line: &str, ch: usize) -> Self {
        let buffer = Self::new(vault);
        *buffer.lines.write() = vec![line.to_string()];
        *buffer.cursor.write() = CursorPos::new(0, ch);
        buffer
    }

    /// Move the cursor.
    pub fn set_cursor(&self, pos: CursorPos) {
        *self.cursor.write() = pos;
    }

    /// Set or clear the active file.
    pub fn set_active_file(&self, active: Option<ActiveFile>) {
        *self.active.write() = active;
    }

    /// Full buffer contents, lines joined with newlines.
    #[must_use]
    pub fn contents(&self) -> String {
        self.lines.read().join("\n")
    }

    /// One line's text, empty if the line does not exist.
    #[must_use]
    pub fn line(&self, line: usize) -> String {
        self.lines.read().get(line).cloned().unwrap_or_default()
    }
}

impl Editor for ScratchBuffer {
    fn line_text(&self, line: usize) -> Option<String> {
        self.lines.read().get(line).cloned()
    }

    fn cursor(&self) -> CursorPos {
        *self.cursor.read()
    }

    fn replace_range(&self, text: &str, from: CursorPos, to: CursorPos) {
        let mut lines = self.lines.write();
        if lines.is_empty() {
            lines.push(String::new());
        }
        let idx = from.line.min(lines.len() - 1);
        let chars: Vec<char> = lines[idx].chars().collect();
        let start = from.ch.min(chars.len());
        let end = to.ch.min(chars.len()).max(start);

        let mut combined: String = chars[..start].iter().collect();
        combined.push_str(text);
        combined.extend(&chars[end..]);

        // A replacement carrying newlines splits the line, editor-style.
        let replacement_lines: Vec<String> = combined.split('\n').map(String::from).collect();
        let _ = lines.splice(idx..=idx, replacement_lines).count();
    }

    fn active_file(&self) -> Option<ActiveFile> {
        self.active.read().clone()
    }

    fn vault_path(&self) -> PathBuf {
        self.vault.clone()
    }
}

/// Notifier that records every notice and mirrors it to the log.
#[derive(Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<String>>,
}

impl NoticeLog {
    /// Snapshot of the notices shown so far.
    #[must_use]
    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().clone()
    }

    /// Whether any notice has been shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, message: &str) {
        info!(notice = %message, "user notice");
        self.notices.lock().push(message.to_string());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
