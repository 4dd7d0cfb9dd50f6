//! Line-delimited JSON wire protocol for the handler channel.
//!
//! Requests go out as one JSON object per line:
//! `{"id": N, "text": "<content>", "context": {...}}`. Responses come back
//! as `{"replacement": "<string>"}`, optionally echoing the request id. The
//! reference handler always echoes `0`, so an unknown id falls back to FIFO
//! correlation rather than being rejected.
//!
//! Shell-channel traffic never passes through here; a shell response is the
//! raw stdout chunk, applied verbatim.

use serde::{Deserialize, Serialize};
use unfurl_core::{ExpandError, ExpansionContext, RequestId};

use crate::errors::Result;

/// One outgoing handler request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerRequest {
    /// Correlation id, echoed (or not) by the handler.
    pub id: RequestId,
    /// Trimmed match content.
    pub text: String,
    /// Substitution context resolved at trigger time.
    pub context: ExpansionContext,
}

impl HandlerRequest {
    /// Serialize to one newline-free wire line.
    ///
    /// The supervisor appends the terminating newline when writing.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One incoming handler response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct HandlerResponse {
    /// Text the captured span is replaced with.
    pub replacement: String,
    /// Echoed request id, if the handler bothered.
    #[serde(default)]
    pub id: Option<RequestId>,
}

impl HandlerResponse {
    /// Parse one stdout line into a response.
    ///
    /// Anything that is not a JSON object with a string `replacement` field
    /// is malformed; unknown extra fields are ignored.
    pub fn decode(line: &str) -> std::result::Result<Self, ExpandError> {
        serde_json::from_str(line).map_err(|e| ExpandError::MalformedResponse {
            detail: e.to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
