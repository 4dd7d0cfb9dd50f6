//! Applying process events to the buffer.
//!
//! One pump task runs per live channel, consuming the supervisor's event
//! stream. Stdout payloads resolve the channel's pending queue and overwrite
//! the captured span; stderr is surfaced to the user as-is; an exit clears
//! the queue so a later process can never satisfy a stale target.
//!
//! A handler payload that fails to decode is surfaced as a notice and does
//! NOT resolve anything — the entry stays pending, holding its slot, since
//! no valid replacement was obtained.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use unfurl_core::{CursorPos, Editor, Notifier, ReplaceTarget};
use unfurl_engine::SessionQueue;
use unfurl_process::{HandlerResponse, ProcessEvent};

/// How one channel's stdout payloads become replacements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResponseKind {
    /// Payload is the replacement verbatim, resolved FIFO.
    Shell,
    /// Payload is a JSON response line, resolved by echoed id.
    Handler,
}

/// Consume one channel's events until its stream closes.
pub(crate) async fn pump_process_events(
    channel: &'static str,
    kind: ResponseKind,
    mut events: mpsc::Receiver<ProcessEvent>,
    queue: Arc<Mutex<SessionQueue>>,
    editor: Arc<dyn Editor>,
    notifier: Arc<dyn Notifier>,
) {
    while let Some(event) = events.recv().await {
        match event {
            ProcessEvent::Stdout(payload) => {
                apply_payload(channel, kind, &payload, &queue, editor.as_ref(), notifier.as_ref());
            }
            ProcessEvent::Stderr(text) => {
                notifier.notify(&text);
            }
            ProcessEvent::Exited { code } => {
                let dropped = queue.lock().clear();
                if dropped > 0 {
                    warn!(channel, ?code, dropped, "process exited with pending expansions");
                }
            }
        }
    }
    debug!(channel, "event stream closed");
}

fn apply_payload(
    channel: &str,
    kind: ResponseKind,
    payload: &str,
    queue: &Mutex<SessionQueue>,
    editor: &dyn Editor,
    notifier: &dyn Notifier,
) {
    let resolved = match kind {
        ResponseKind::Shell => queue
            .lock()
            .complete(None)
            .map(|pending| (pending, payload.to_string())),
        ResponseKind::Handler => match HandlerResponse::decode(payload) {
            Ok(response) => queue
                .lock()
                .complete(response.id)
                .map(|pending| (pending, response.replacement)),
            Err(e) => {
                warn!(channel, error = %e, "handler response rejected");
                notifier.notify(&e.to_string());
                return;
            }
        },
    };

    match resolved {
        Some((pending, replacement)) => {
            debug!(
                channel,
                id = %pending.id,
                line = pending.target.line,
                "applying replacement"
            );
            apply_replacement(editor, pending.target, &replacement);
        }
        None => {
            debug!(channel, "response with nothing pending, dropped");
        }
    }
}

/// Overwrite the captured span with the response, coordinates verbatim.
fn apply_replacement(editor: &dyn Editor, target: ReplaceTarget, text: &str) {
    editor.replace_range(
        text,
        CursorPos::new(target.line, target.start),
        CursorPos::new(target.line, target.end),
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{NoticeLog, ScratchBuffer};

    fn wired(
        line: &str,
    ) -> (
        Arc<ScratchBuffer>,
        Arc<NoticeLog>,
        Arc<Mutex<SessionQueue>>,
    ) {
        (
            Arc::new(ScratchBuffer::from_line("/vault", line, 0)),
            Arc::new(NoticeLog::default()),
            Arc::new(Mutex::new(SessionQueue::new(4))),
        )
    }

    fn target(line: usize, start: usize, end: usize) -> ReplaceTarget {
        ReplaceTarget { line, start, end }
    }

    #[test]
    fn shell_payload_resolves_fifo_and_replaces() {
        let (buffer, notifier, queue) = wired("a {{now}} b");
        let _ = queue.lock().begin(target(0, 2, 9)).unwrap();
        apply_payload(
            "shell",
            ResponseKind::Shell,
            "NOW",
            &queue,
            buffer.as_ref(),
            notifier.as_ref(),
        );
        assert_eq!(buffer.line(0), "a NOW b");
        assert!(queue.lock().is_empty());
    }

    #[test]
    fn handler_payload_resolves_by_echoed_id() {
        let (buffer, notifier, queue) = wired("{{a}} {{b}}");
        let _first = queue.lock().begin(target(0, 0, 5)).unwrap();
        let second = queue.lock().begin(target(0, 6, 11)).unwrap();
        let line = format!(r#"{{"id": {second}, "replacement": "B"}}"#);
        apply_payload(
            "handler",
            ResponseKind::Handler,
            &line,
            &queue,
            buffer.as_ref(),
            notifier.as_ref(),
        );
        assert_eq!(buffer.line(0), "{{a}} B");
        assert_eq!(queue.lock().in_flight(), 1);
    }

    #[test]
    fn malformed_handler_payload_leaves_entry_pending() {
        let (buffer, notifier, queue) = wired("x {{q}} y");
        let _ = queue.lock().begin(target(0, 2, 7)).unwrap();
        apply_payload(
            "handler",
            ResponseKind::Handler,
            "not json",
            &queue,
            buffer.as_ref(),
            notifier.as_ref(),
        );
        assert_eq!(buffer.line(0), "x {{q}} y");
        assert_eq!(queue.lock().in_flight(), 1);
        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("malformed handler response"));
    }

    #[test]
    fn spurious_payload_touches_nothing() {
        let (buffer, notifier, queue) = wired("untouched");
        apply_payload(
            "shell",
            ResponseKind::Shell,
            "ghost",
            &queue,
            buffer.as_ref(),
            notifier.as_ref(),
        );
        assert_eq!(buffer.line(0), "untouched");
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn pump_surfaces_stderr_and_clears_on_exit() {
        let (buffer, notifier, queue) = wired("x {{q}} y");
        let _ = queue.lock().begin(target(0, 2, 7)).unwrap();

        let (tx, rx) = mpsc::channel(4);
        tx.send(ProcessEvent::Stderr("boom".to_string())).await.unwrap();
        tx.send(ProcessEvent::Exited { code: Some(1) }).await.unwrap();
        drop(tx);

        pump_process_events(
            "shell",
            ResponseKind::Shell,
            rx,
            queue.clone(),
            buffer.clone(),
            notifier.clone(),
        )
        .await;

        assert_eq!(notifier.notices(), vec!["boom".to_string()]);
        assert!(queue.lock().is_empty());
        assert_eq!(buffer.line(0), "x {{q}} y");
    }
}
