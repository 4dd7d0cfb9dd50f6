//! Rule resolution for trimmed match content.
//!
//! Two rule classes share one ordered walk: literal snippets (exact trigger
//! equality, static replacement) and regex shortcuts (anywhere-match
//! semantics, static replacement or delegated command). Snippets are checked
//! before shortcuts; within each table, order is the tie-break and the first
//! match wins.
//!
//! Shortcut regexes keep their authored anchoring: an unanchored regex fires
//! on a substring hit, exactly like a regex "test". That is configurable
//! user behavior, not something to normalize away.

use fancy_regex::Regex;
use tracing::debug;
use unfurl_core::{ExpandError, ShortcutEntry, SnippetEntry};

/// What resolution decided for one piece of content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleOutcome {
    /// A static replacement, applied immediately.
    Static(String),
    /// A command template for the shell channel.
    Command(String),
    /// No rule matched the content.
    Unmatched,
}

/// Result of walking the rule tables: the outcome plus any broken rules that
/// were skipped on the way to it.
#[derive(Debug)]
pub struct Resolution {
    /// The decision.
    pub outcome: RuleOutcome,
    /// Compile or match errors from skipped rules, in table order.
    pub errors: Vec<ExpandError>,
}

/// Borrowed view over the configured rule tables.
#[derive(Clone, Copy, Debug)]
pub struct RuleTable<'a> {
    snippets: &'a [SnippetEntry],
    shortcuts: &'a [ShortcutEntry],
}

impl<'a> RuleTable<'a> {
    /// Build a table view from the configured rule lists.
    #[must_use]
    pub fn new(snippets: &'a [SnippetEntry], shortcuts: &'a [ShortcutEntry]) -> Self {
        Self {
            snippets,
            shortcuts,
        }
    }

    /// Resolve content against the tables, first match wins.
    ///
    /// A shortcut whose regex fails to compile is skipped and its error
    /// collected, so one broken rule cannot wedge the rest of the table.
    /// A shortcut carrying neither `replacement` nor `command` is inert and
    /// silently skipped. If both are present, `replacement` wins.
    #[must_use]
    pub fn resolve(&self, content: &str) -> Resolution {
        let mut errors = Vec::new();

        for entry in self.snippets {
            if content == entry.trigger {
                debug!(trigger = %entry.trigger, "snippet rule fired");
                return Resolution {
                    outcome: RuleOutcome::Static(entry.replacement.clone()),
                    errors,
                };
            }
        }

        for entry in self.shortcuts {
            let regex = match Regex::new(&entry.regex) {
                Ok(regex) => regex,
                Err(e) => {
                    errors.push(ExpandError::pattern(&entry.regex, e));
                    continue;
                }
            };
            let hit = match regex.is_match(content) {
                Ok(hit) => hit,
                Err(e) => {
                    errors.push(ExpandError::pattern(&entry.regex, e));
                    continue;
                }
            };
            if !hit {
                continue;
            }
            if let Some(replacement) = &entry.replacement {
                debug!(regex = %entry.regex, "shortcut rule fired with replacement");
                return Resolution {
                    outcome: RuleOutcome::Static(replacement.clone()),
                    errors,
                };
            }
            if let Some(command) = &entry.command {
                debug!(regex = %entry.regex, "shortcut rule fired with command");
                return Resolution {
                    outcome: RuleOutcome::Command(command.clone()),
                    errors,
                };
            }
            // inert rule: matched but carries nothing to do
        }

        Resolution {
            outcome: RuleOutcome::Unmatched,
            errors,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
