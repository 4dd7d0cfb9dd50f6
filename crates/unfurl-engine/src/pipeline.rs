//! One trigger-key pass over the current line.
//!
//! The pass walks the configured pattern families in table order. For each
//! family it re-reads the cursor and line (an earlier family's replacement
//! may have changed both), finds every match covering the cursor, and runs
//! the resolve step on each. Static outcomes mutate the buffer immediately;
//! process-bound outcomes come back to the caller as [`ExpansionRequest`]s
//! for the owning channel to dispatch.
//!
//! Multiple families firing on one keystroke is by design, not precedence:
//! a line can hold a brace region and a colon word at once, each handled
//! separately. Replacements from earlier spans leave later captured
//! coordinates stale; they are applied verbatim anyway, which is accepted
//! behavior.

use tracing::{debug, warn};
use unfurl_core::{
    CursorPos, Editor, ExpansionContext, KeyDisposition, Notifier, ReplaceTarget,
};
use unfurl_settings::UnfurlSettings;

use crate::context::resolve_context;
use crate::matcher::CompiledFormat;
use crate::rules::{RuleOutcome, RuleTable};
use crate::template::{MissingFilePolicy, render};

/// A process-bound expansion the caller must dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpansionRequest {
    /// A rendered command line for the shell channel.
    Shell {
        /// Command line, context and text already substituted.
        command: String,
        /// Span the shell's output will overwrite.
        target: ReplaceTarget,
    },
    /// Content forwarded to the handler channel.
    Handler {
        /// Trimmed match content.
        text: String,
        /// Context resolved at trigger time, sent with the request.
        context: ExpansionContext,
        /// Span the handler's replacement will overwrite.
        target: ReplaceTarget,
    },
}

impl ExpansionRequest {
    /// Span this request's response will overwrite.
    #[must_use]
    pub fn target(&self) -> ReplaceTarget {
        match self {
            Self::Shell { target, .. } | Self::Handler { target, .. } => *target,
        }
    }
}

/// Result of one trigger pass.
#[derive(Debug)]
pub struct TriggerOutcome {
    /// Whether the trigger key should be consumed or fall through.
    pub disposition: KeyDisposition,
    /// Process-bound expansions, in firing order.
    pub requests: Vec<ExpansionRequest>,
}

/// Run one trigger pass against the editor's current state.
///
/// Static replacements are applied before this returns; anything process
/// bound is returned for dispatch. The key is consumed iff at least one
/// format match covered the cursor, whether or not any rule fired.
pub fn run_trigger_pass(
    editor: &dyn Editor,
    notifier: &dyn Notifier,
    settings: &UnfurlSettings,
) -> TriggerOutcome {
    let mut requests = Vec::new();
    let mut any_match = false;

    for spec in &settings.formats {
        let format = match CompiledFormat::compile(spec) {
            Ok(format) => format,
            Err(e) => {
                warn!(error = %e, "skipping format for this pass");
                notifier.notify(&e.to_string());
                continue;
            }
        };

        // Fresh read per family: an earlier family's replacement may have
        // reshaped the line or moved the cursor.
        let cursor = editor.cursor();
        let Some(line_text) = editor.line_text(cursor.line) else {
            continue;
        };
        let spans = match format.matches_at_cursor(cursor.line, &line_text, cursor.ch) {
            Ok(spans) => spans,
            Err(e) => {
                warn!(error = %e, "skipping format for this pass");
                notifier.notify(&e.to_string());
                continue;
            }
        };

        for span in spans {
            any_match = true;
            debug!(
                line = span.line,
                start = span.raw_start,
                end = span.raw_end,
                content = %span.content,
                "expanding match"
            );

            let table = RuleTable::new(&settings.snippets, &settings.shell.shortcuts);
            let resolution = table.resolve(&span.content);
            for err in &resolution.errors {
                notifier.notify(&err.to_string());
            }

            match resolution.outcome {
                RuleOutcome::Static(replacement) => {
                    editor.replace_range(
                        &replacement,
                        CursorPos::new(span.line, span.raw_start),
                        CursorPos::new(span.line, span.raw_end),
                    );
                }
                RuleOutcome::Command(template) => {
                    let ctx = resolve_context(editor, &settings.expansion.scripts_dir);
                    match render(
                        &template,
                        Some(&span.content),
                        &ctx,
                        MissingFilePolicy::Strict,
                    ) {
                        Ok(command) => requests.push(ExpansionRequest::Shell {
                            command,
                            target: span.target(),
                        }),
                        Err(e) => {
                            warn!(error = %e, "command template failed");
                            notifier.notify(&e.to_string());
                        }
                    }
                }
                RuleOutcome::Unmatched => {
                    if settings.handler.enabled && settings.handler.forward_unmatched {
                        let context =
                            resolve_context(editor, &settings.expansion.scripts_dir);
                        requests.push(ExpansionRequest::Handler {
                            text: span.content.clone(),
                            context,
                            target: span.target(),
                        });
                    }
                }
            }
        }
    }

    let disposition = if any_match {
        KeyDisposition::Consume
    } else {
        KeyDisposition::PassThrough
    };
    TriggerOutcome {
        disposition,
        requests,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
