//! Context resolution from the host editor's workspace state.

use std::path::Path;

use unfurl_core::{Editor, ExpansionContext};

/// Build the substitution context for one expansion.
///
/// Called fresh for every expansion; nothing here is cached, because the
/// active file can change between keystrokes. `scripts_dir` is the
/// configured scripts directory relative to the vault root.
#[must_use]
pub fn resolve_context(editor: &dyn Editor, scripts_dir: &str) -> ExpansionContext {
    let vault = editor.vault_path();
    let vault_path = path_string(&vault);
    let scripts_path = path_string(&vault.join(scripts_dir));

    let mut file_name = None;
    let mut file_path = None;
    let mut inner_path = None;
    if let Some(active) = editor.active_file() {
        file_path = Some(path_string(
            &vault.join(&active.parent_path).join(&active.name),
        ));
        inner_path = Some(active.parent_path);
        file_name = Some(active.name);
    }

    ExpansionContext {
        vault_path,
        file_name,
        file_path,
        inner_path,
        scripts_path,
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use unfurl_core::{ActiveFile, CursorPos};

    struct FakeEditor {
        vault: PathBuf,
        active: Option<ActiveFile>,
    }

    impl Editor for FakeEditor {
        fn line_text(&self, _line: usize) -> Option<String> {
            None
        }
        fn cursor(&self) -> CursorPos {
            CursorPos::default()
        }
        fn replace_range(&self, _text: &str, _from: CursorPos, _to: CursorPos) {}
        fn active_file(&self) -> Option<ActiveFile> {
            self.active.clone()
        }
        fn vault_path(&self) -> PathBuf {
            self.vault.clone()
        }
    }

    #[test]
    fn context_with_active_file() {
        let editor = FakeEditor {
            vault: PathBuf::from("/vault"),
            active: Some(ActiveFile {
                name: "note.md".to_string(),
                parent_path: "daily".to_string(),
            }),
        };
        let ctx = resolve_context(&editor, ".scripts");
        assert_eq!(ctx.vault_path, "/vault");
        assert_eq!(ctx.file_name.as_deref(), Some("note.md"));
        assert_eq!(ctx.file_path.as_deref(), Some("/vault/daily/note.md"));
        assert_eq!(ctx.inner_path.as_deref(), Some("daily"));
        assert_eq!(ctx.scripts_path, "/vault/.scripts");
    }

    #[test]
    fn context_without_active_file() {
        let editor = FakeEditor {
            vault: PathBuf::from("/vault"),
            active: None,
        };
        let ctx = resolve_context(&editor, ".scripts");
        assert!(ctx.file_name.is_none());
        assert!(ctx.file_path.is_none());
        assert!(ctx.inner_path.is_none());
        assert_eq!(ctx.scripts_path, "/vault/.scripts");
    }

    #[test]
    fn file_at_vault_root_keeps_clean_path() {
        let editor = FakeEditor {
            vault: PathBuf::from("/vault"),
            active: Some(ActiveFile {
                name: "note.md".to_string(),
                parent_path: String::new(),
            }),
        };
        let ctx = resolve_context(&editor, ".scripts");
        assert_eq!(ctx.file_path.as_deref(), Some("/vault/note.md"));
        assert_eq!(ctx.inner_path.as_deref(), Some(""));
    }
}
