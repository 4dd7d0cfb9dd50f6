//! Process channel error types.

use thiserror::Error;

/// Errors from spawning or talking to an external process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The spawn command resolved to an empty argv.
    #[error("{channel} spawn command is empty")]
    EmptyCommand {
        /// Channel the spawn was for.
        channel: String,
    },

    /// The OS refused to spawn the process.
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        /// Program the spawn attempted.
        program: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A send was attempted after the channel's process (and its pump) died.
    #[error("{channel} process is not running")]
    Unavailable {
        /// Channel the send targeted.
        channel: String,
    },

    /// An outgoing request failed to serialize.
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ProcessError {
    /// Machine-readable error code for logging.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyCommand { .. } => "EMPTY_COMMAND",
            Self::Spawn { .. } => "SPAWN_FAILED",
            Self::Unavailable { .. } => "PROCESS_UNAVAILABLE",
            Self::Encode(_) => "ENCODE_FAILED",
        }
    }
}

/// Result type for process operations.
pub type Result<T> = std::result::Result<T, ProcessError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
