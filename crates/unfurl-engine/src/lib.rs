//! # unfurl-engine
//!
//! The synchronous half of the expansion pipeline: everything that happens
//! between the trigger keystroke and either a buffer edit or a request
//! handed to a process channel.
//!
//! - [`matcher`] — compiled pattern families and cursor-covering matches
//! - [`rules`] — ordered rule resolution over trimmed content
//! - [`template`] — `<name>` placeholder substitution with shell escaping
//! - [`context`] — fresh per-expansion substitution context
//! - [`session`] — the pending-request queue with correlation IDs
//! - [`pipeline`] — one full trigger pass tying the above together
//!
//! Nothing here touches a process or an event loop; process-bound outcomes
//! leave this crate as [`pipeline::ExpansionRequest`] values for the host to
//! dispatch.

#![deny(unsafe_code)]

pub mod context;
pub mod matcher;
pub mod pipeline;
pub mod rules;
pub mod session;
pub mod template;

pub use context::resolve_context;
pub use matcher::{CompiledFormat, cut_content};
pub use pipeline::{ExpansionRequest, TriggerOutcome, run_trigger_pass};
pub use rules::{Resolution, RuleOutcome, RuleTable};
pub use session::{PendingRequest, SessionQueue};
pub use template::{MissingFilePolicy, render, shell_escape};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
