//! Error taxonomy for the expansion pipeline.
//!
//! Every variant here is recoverable from the host's point of view: an
//! expansion that fails must never take the editor down. Callers surface
//! these as user notices or log lines and carry on.

use thiserror::Error;

/// Errors produced while resolving, templating, or dispatching an expansion.
#[derive(Debug, Error)]
pub enum ExpandError {
    /// A file-scoped placeholder was used while no file is open.
    #[error("no active file for placeholder <{placeholder}>")]
    NoActiveContext {
        /// The placeholder that required an active file.
        placeholder: String,
    },

    /// A write was attempted with no live process on the channel.
    #[error("{channel} process is not running")]
    ProcessUnavailable {
        /// Which process channel the write targeted.
        channel: String,
    },

    /// A handler response failed to parse as the expected JSON shape.
    #[error("malformed handler response: {detail}")]
    MalformedResponse {
        /// What was wrong with the payload.
        detail: String,
    },

    /// A user-supplied pattern or rule regex failed to compile.
    ///
    /// Reported at the point the pattern is used, never at load time.
    #[error("invalid pattern `{pattern}`: {detail}")]
    Pattern {
        /// The offending regex source.
        pattern: String,
        /// The engine's compile or match error.
        detail: String,
    },

    /// The pending-request queue is at capacity.
    #[error("expansion already in flight ({in_flight} pending)")]
    SessionBusy {
        /// Number of requests currently pending.
        in_flight: usize,
    },
}

impl ExpandError {
    /// Machine-readable error code for logging.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoActiveContext { .. } => "NO_ACTIVE_CONTEXT",
            Self::ProcessUnavailable { .. } => "PROCESS_UNAVAILABLE",
            Self::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            Self::Pattern { .. } => "BAD_PATTERN",
            Self::SessionBusy { .. } => "SESSION_BUSY",
        }
    }

    /// Shorthand for a [`ExpandError::ProcessUnavailable`] on a named channel.
    #[must_use]
    pub fn process_unavailable(channel: impl Into<String>) -> Self {
        Self::ProcessUnavailable {
            channel: channel.into(),
        }
    }

    /// Shorthand for a [`ExpandError::Pattern`] from a regex failure.
    #[must_use]
    pub fn pattern(pattern: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            detail: detail.to_string(),
        }
    }
}

/// Result type for expansion operations.
pub type Result<T> = std::result::Result<T, ExpandError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
