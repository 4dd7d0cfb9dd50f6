//! # unfurl-process
//!
//! Child-process plumbing for the unfurl expansion engine: the supervised
//! process lifecycle and the handler channel's wire protocol.
//!
//! - [`supervisor`] — spawn, duplex pipe pump, respawn-with-backoff, teardown
//! - [`protocol`] — line-delimited JSON request/response for handler mode
//! - [`errors`] — `ProcessError`
//!
//! This crate knows nothing about buffers or rules; it moves lines and
//! chunks between the host and a child process and reports what happened.

#![deny(unsafe_code)]

pub mod errors;
pub mod protocol;
pub mod supervisor;

pub use errors::{ProcessError, Result};
pub use protocol::{HandlerRequest, HandlerResponse};
pub use supervisor::{
    Framing, ProcessEvent, ProcessSupervisor, SupervisorConfig, split_argv,
};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
