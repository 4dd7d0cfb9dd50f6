//! Data model for the expansion pipeline.
//!
//! These types are shared between the settings layer (which persists rule and
//! format tables) and the engine (which evaluates them). All serde field
//! names are snake_case, matching the on-disk settings format.
//!
//! Buffer coordinates throughout are `(line, ch)` pairs where `ch` counts
//! Unicode scalar values, the host editor's column convention.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Pattern families
// ─────────────────────────────────────────────────────────────────────────────

/// One pattern family: a regex delimiting an expandable span within a line,
/// plus trim offsets that derive the semantic content from the raw match.
///
/// `cut_start` characters are trimmed from the front of the match and
/// `cut_end` from the back. A match shorter than `cut_start + cut_end`
/// yields empty content rather than an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSpec {
    /// Regex source matched against the current line.
    pub pattern: String,
    /// Characters trimmed from the front of each raw match.
    pub cut_start: usize,
    /// Characters trimmed from the back of each raw match.
    pub cut_end: usize,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            cut_start: 0,
            cut_end: 0,
        }
    }
}

impl FormatSpec {
    /// Build a spec from its parts.
    #[must_use]
    pub fn new(pattern: impl Into<String>, cut_start: usize, cut_end: usize) -> Self {
        Self {
            pattern: pattern.into(),
            cut_start,
            cut_end,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rule tables
// ─────────────────────────────────────────────────────────────────────────────

/// A literal snippet rule: exact trigger string, static replacement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnippetEntry {
    /// Content that must equal the trimmed match exactly.
    pub trigger: String,
    /// Text the matched span is replaced with.
    pub replacement: String,
}

/// A regex shortcut rule carrying either a static replacement or a command
/// template to delegate to the shell.
///
/// The regex uses "test" semantics: it fires if it matches anywhere in the
/// content, unless the author anchored it. If both fields are present,
/// `replacement` wins. A rule carrying neither is inert and is skipped
/// during resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutEntry {
    /// Regex source tested against the trimmed content.
    pub regex: String,
    /// Static replacement, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    /// Command template delegated to the shell, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Match results and replacement targets
// ─────────────────────────────────────────────────────────────────────────────

/// One pattern match covering the cursor, with trim offsets already applied.
///
/// `raw_start..raw_end` is the full matched span (delimiters included); an
/// eventual replacement overwrites that whole span. `content` is the text
/// between the cut offsets, what the rule table sees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchSpan {
    /// Line number the match was found on.
    pub line: usize,
    /// Start of the raw match, inclusive.
    pub raw_start: usize,
    /// End of the raw match, exclusive.
    pub raw_end: usize,
    /// Trimmed content between the cut offsets.
    pub content: String,
}

impl MatchSpan {
    /// The buffer span a replacement for this match must overwrite.
    #[must_use]
    pub fn target(&self) -> ReplaceTarget {
        ReplaceTarget {
            line: self.line,
            start: self.raw_start,
            end: self.raw_end,
        }
    }
}

/// Captured buffer coordinates an asynchronous replacement is applied to.
///
/// Coordinates are used verbatim when the response arrives; they are not
/// re-validated against the buffer, so edits made in between may shift what
/// they point at. The editor is expected to clamp, never fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplaceTarget {
    /// Line the span lives on.
    pub line: usize,
    /// Span start, inclusive.
    pub start: usize,
    /// Span end, exclusive.
    pub end: usize,
}

/// What the host should do with the trigger key event after a pass.
///
/// The key is consumed only when at least one format match covered the
/// cursor; otherwise it keeps its default editor action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Suppress the key's default action.
    Consume,
    /// Let the key fall through to the editor.
    PassThrough,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_spec_deserializes_partial_json() {
        let spec: FormatSpec = serde_json::from_str(r#"{"pattern": ":\\S*"}"#).unwrap();
        assert_eq!(spec.pattern, ":\\S*");
        assert_eq!(spec.cut_start, 0);
        assert_eq!(spec.cut_end, 0);
    }

    #[test]
    fn shortcut_entry_omits_absent_fields() {
        let entry = ShortcutEntry {
            regex: "^now$".to_string(),
            replacement: None,
            command: Some("date".to_string()),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("replacement"));
        assert!(json.contains("command"));
    }

    #[test]
    fn shortcut_entry_accepts_both_fields() {
        let entry: ShortcutEntry = serde_json::from_str(
            r#"{"regex": "x", "replacement": "r", "command": "c"}"#,
        )
        .unwrap();
        assert_eq!(entry.replacement.as_deref(), Some("r"));
        assert_eq!(entry.command.as_deref(), Some("c"));
    }

    #[test]
    fn match_span_target_covers_raw_span() {
        let span = MatchSpan {
            line: 3,
            raw_start: 5,
            raw_end: 9,
            content: "abc".to_string(),
        };
        assert_eq!(
            span.target(),
            ReplaceTarget {
                line: 3,
                start: 5,
                end: 9
            }
        );
    }
}
