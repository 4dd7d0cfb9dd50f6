//! Pattern matching over a single line.
//!
//! A [`CompiledFormat`] is one pattern family ready to run: the user's regex
//! compiled plus the cut offsets that derive content from a raw match. The
//! engine is `fancy-regex`, so user patterns may use lookarounds (the stock
//! double-brace family relies on negative lookahead to refuse nested
//! braces).
//!
//! Coordinates: the editor speaks char columns, the regex engine speaks byte
//! offsets. Matching converts byte offsets to char offsets before anything
//! else sees them, and cut trimming counts chars, so multi-byte lines behave
//! the same as ASCII ones.

use fancy_regex::Regex;
use tracing::trace;
use unfurl_core::{ExpandError, FormatSpec, MatchSpan, Result};

/// One pattern family compiled and ready to match.
#[derive(Debug)]
pub struct CompiledFormat {
    spec: FormatSpec,
    regex: Regex,
}

impl CompiledFormat {
    /// Compile a format's pattern.
    ///
    /// Compilation happens at the point of use, so a broken user pattern is
    /// reported on the keystroke that exercised it, not at load time.
    pub fn compile(spec: &FormatSpec) -> Result<Self> {
        let regex =
            Regex::new(&spec.pattern).map_err(|e| ExpandError::pattern(&spec.pattern, e))?;
        Ok(Self {
            spec: spec.clone(),
            regex,
        })
    }

    /// The format this was compiled from.
    #[must_use]
    pub fn spec(&self) -> &FormatSpec {
        &self.spec
    }

    /// All matches on `text` whose raw span covers the cursor.
    ///
    /// Matches are enumerated left to right, non-overlapping. Containment is
    /// inclusive at both ends: a cursor sitting on either edge of a match
    /// still counts as inside it, so expansion works right after the closing
    /// delimiter was typed.
    pub fn matches_at_cursor(
        &self,
        line: usize,
        text: &str,
        cursor_ch: usize,
    ) -> Result<Vec<MatchSpan>> {
        let mut spans = Vec::new();
        for hit in self.regex.find_iter(text) {
            let hit = hit.map_err(|e| ExpandError::pattern(&self.spec.pattern, e))?;
            let raw_start = char_offset(text, hit.start());
            let raw_end = char_offset(text, hit.end());
            if raw_start <= cursor_ch && cursor_ch <= raw_end {
                trace!(line, raw_start, raw_end, "format match covers cursor");
                spans.push(MatchSpan {
                    line,
                    raw_start,
                    raw_end,
                    content: cut_content(hit.as_str(), self.spec.cut_start, self.spec.cut_end),
                });
            }
        }
        Ok(spans)
    }
}

/// Char offset of a byte offset within `text`.
fn char_offset(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count()
}

/// Trim `cut_start` chars from the front and `cut_end` from the back.
///
/// A match shorter than the combined cut yields empty content; trimming
/// never faults.
#[must_use]
pub fn cut_content(raw: &str, cut_start: usize, cut_end: usize) -> String {
    let total = raw.chars().count();
    let keep = total.saturating_sub(cut_start).saturating_sub(cut_end);
    raw.chars().skip(cut_start).take(keep).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
