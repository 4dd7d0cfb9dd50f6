//! # unfurl-host
//!
//! The embeddable host for the unfurl expansion engine.
//!
//! - [`plugin`] — [`UnfurlPlugin`]: load/unload lifecycle, trigger-key
//!   handling, and dispatch to the process channels
//! - [`buffer`] — [`ScratchBuffer`] and [`NoticeLog`], in-memory
//!   implementations of the editor collaborator traits
//!
//! A real host editor supplies its own `Editor` and `Notifier`; the scratch
//! buffer is what the CLI and the tests run against.

#![deny(unsafe_code)]

pub mod buffer;
pub mod plugin;

mod apply;

pub use buffer::{NoticeLog, ScratchBuffer};
pub use plugin::UnfurlPlugin;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let buffer = ScratchBuffer::new("/vault");
        assert_eq!(buffer.contents(), "");
        let log = NoticeLog::default();
        assert!(log.is_empty());
    }
}
