//! # unfurl-core
//!
//! Foundation types, errors, and collaborator traits for the unfurl
//! expansion engine.
//!
//! This crate provides the shared vocabulary that all other unfurl crates
//! depend on:
//!
//! - **Data model**: `FormatSpec`, `SnippetEntry`, `ShortcutEntry`,
//!   `MatchSpan`, `ReplaceTarget` for the match-resolve-replace pipeline
//! - **Correlation IDs**: `RequestId` newtype tying process responses back
//!   to captured buffer spans
//! - **Context**: `ExpansionContext` with the named substitution variables
//!   resolved per expansion
//! - **Collaborator traits**: `Editor` and `Notifier`, the surface the host
//!   editor provides
//! - **Errors**: `ExpandError` hierarchy via `thiserror`

#![deny(unsafe_code)]

pub mod context;
pub mod editor;
pub mod errors;
pub mod ids;
pub mod types;

pub use context::ExpansionContext;
pub use editor::{ActiveFile, CursorPos, Editor, Notifier};
pub use errors::{ExpandError, Result};
pub use ids::RequestId;
pub use types::{
    FormatSpec, KeyDisposition, MatchSpan, ReplaceTarget, ShortcutEntry, SnippetEntry,
};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _span = MatchSpan {
            line: 0,
            raw_start: 0,
            raw_end: 0,
            content: String::new(),
        };
        let _ctx = ExpansionContext::default();
        let _id = RequestId::new(0);
    }
}
