//! Pending-request queue with correlation IDs.
//!
//! Each process channel owns one [`SessionQueue`]. A trigger that delegates
//! to a process enters the queue and captures the buffer span it will
//! eventually replace; the response resolves the entry and the captured span
//! gets overwritten. Capacity is the configured in-flight ceiling (one by
//! default), and a trigger arriving at a full queue is rejected rather than
//! silently replacing an earlier target.
//!
//! Responses that carry a known correlation ID resolve their own entry.
//! Responses without one (shell chunks, handlers that do not echo the ID)
//! resolve the oldest entry, which is the wire order for a serial protocol.
//!
//! There is no timeout: an entry whose response never arrives stays pending
//! and keeps holding its capacity slot.

use std::collections::VecDeque;

use tracing::{debug, warn};
use unfurl_core::{ExpandError, ReplaceTarget, RequestId, Result};

/// One in-flight request and the span its response will overwrite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    /// Correlation ID carried by the outgoing request.
    pub id: RequestId,
    /// Captured buffer coordinates, applied verbatim on response.
    pub target: ReplaceTarget,
}

/// FIFO queue of pending requests for one process channel.
#[derive(Debug)]
pub struct SessionQueue {
    pending: VecDeque<PendingRequest>,
    capacity: usize,
    next_id: u64,
}

impl SessionQueue {
    /// Create a queue holding at most `capacity` in-flight requests.
    ///
    /// A capacity of zero makes no sense and is bumped to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            capacity: capacity.max(1),
            next_id: 1,
        }
    }

    /// Open a new pending entry for `target`.
    ///
    /// Fails with [`ExpandError::SessionBusy`] when the queue is at
    /// capacity; the caller surfaces that as a notice and drops the trigger.
    pub fn begin(&mut self, target: ReplaceTarget) -> Result<RequestId> {
        if self.pending.len() >= self.capacity {
            return Err(ExpandError::SessionBusy {
                in_flight: self.pending.len(),
            });
        }
        let id = RequestId::new(self.next_id);
        self.next_id += 1;
        self.pending.push_back(PendingRequest { id, target });
        debug!(%id, line = target.line, start = target.start, end = target.end, "session opened");
        Ok(id)
    }

    /// Resolve a pending entry with an arriving response.
    ///
    /// With `Some(id)` that matches an entry, that entry resolves out of
    /// order if needed. An unknown or absent ID resolves the oldest entry.
    /// Returns `None` when nothing is pending (a spurious response).
    pub fn complete(&mut self, id: Option<RequestId>) -> Option<PendingRequest> {
        if let Some(id) = id {
            if let Some(pos) = self.pending.iter().position(|p| p.id == id) {
                return self.pending.remove(pos);
            }
            if !self.pending.is_empty() {
                debug!(%id, "response id unknown, resolving oldest entry");
            }
        }
        self.pending.pop_front()
    }

    /// Drop a pending entry whose request never made it to the process.
    pub fn abandon(&mut self, id: RequestId) {
        if let Some(pos) = self.pending.iter().position(|p| p.id == id) {
            let _ = self.pending.remove(pos);
            debug!(%id, "session abandoned");
        }
    }

    /// Drop every pending entry. Used when the owning process exits, so a
    /// later process cannot satisfy stale targets. Returns the dropped count.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        if dropped > 0 {
            warn!(dropped, "clearing pending expansions");
        }
        self.pending.clear();
        dropped
    }

    /// Number of requests currently pending.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
