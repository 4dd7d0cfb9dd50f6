//! Collaborator traits for the host editor.
//!
//! The engine never touches a buffer directly; it goes through [`Editor`],
//! the minimal surface the host must provide: line retrieval, cursor
//! position, range replacement, and the active-file/vault facts the context
//! resolver needs. [`Notifier`] is the user-visible notice channel.
//!
//! Replacement coordinates may be stale by the time an asynchronous response
//! applies them. Implementations must clamp out-of-range coordinates to the
//! current buffer shape rather than fault.

use std::path::PathBuf;

/// A cursor position in `(line, ch)` editor coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorPos {
    /// Zero-based line number.
    pub line: usize,
    /// Zero-based column, counted in Unicode scalar values.
    pub ch: usize,
}

impl CursorPos {
    /// Build a position from its parts.
    #[must_use]
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// The file currently open in the host editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveFile {
    /// File name including extension.
    pub name: String,
    /// Parent directory path, relative to the vault root.
    pub parent_path: String,
}

/// Buffer and workspace surface the host editor must provide.
///
/// Methods take `&self`; implementations use interior mutability because
/// replacements arrive from asynchronous process callbacks.
pub trait Editor: Send + Sync {
    /// Text of the given line, or `None` if the line does not exist.
    fn line_text(&self, line: usize) -> Option<String>;

    /// Current cursor position.
    fn cursor(&self) -> CursorPos;

    /// Replace the buffer range `[from, to)` with `text`.
    ///
    /// Out-of-range coordinates are clamped to the buffer, never an error.
    fn replace_range(&self, text: &str, from: CursorPos, to: CursorPos);

    /// The file currently open, if any.
    fn active_file(&self) -> Option<ActiveFile>;

    /// Absolute path of the workspace (vault) root.
    fn vault_path(&self) -> PathBuf;
}

/// User-visible notice channel.
pub trait Notifier: Send + Sync {
    /// Show `message` to the user.
    fn notify(&self, message: &str);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_pos_new() {
        let pos = CursorPos::new(2, 7);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.ch, 7);
    }

    #[test]
    fn traits_are_object_safe() {
        fn _takes_editor(_: &dyn Editor) {}
        fn _takes_notifier(_: &dyn Notifier) {}
    }
}
