//! Plugin lifecycle and key-event wiring.
//!
//! [`UnfurlPlugin`] is what a host embeds: `load` spawns the enabled process
//! channels, `handle_key_down` runs one trigger pass and dispatches any
//! process-bound expansions, `unload` kills the children without draining.
//!
//! Each channel owns its supervisor, its pending queue, and its pump task,
//! so handler and shell responses can never complete each other's targets.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};
use unfurl_core::{Editor, ExpandError, KeyDisposition, Notifier, ReplaceTarget};
use unfurl_engine::{ExpansionRequest, SessionQueue, resolve_context, run_trigger_pass};
use unfurl_engine::{MissingFilePolicy, render};
use unfurl_process::{
    Framing, HandlerRequest, ProcessSupervisor, SupervisorConfig,
};
use unfurl_settings::UnfurlSettings;

use crate::apply::{ResponseKind, pump_process_events};

/// One live process channel: supervisor, pending queue, pump task.
struct Channel {
    supervisor: ProcessSupervisor,
    queue: Arc<Mutex<SessionQueue>>,
}

/// The embeddable expansion plugin.
pub struct UnfurlPlugin {
    settings: UnfurlSettings,
    editor: Arc<dyn Editor>,
    notifier: Arc<dyn Notifier>,
    handler: Mutex<Option<Arc<Channel>>>,
    shell: Mutex<Option<Arc<Channel>>>,
}

impl UnfurlPlugin {
    /// Build a plugin over the host's editor and notifier.
    #[must_use]
    pub fn new(
        editor: Arc<dyn Editor>,
        notifier: Arc<dyn Notifier>,
        settings: UnfurlSettings,
    ) -> Self {
        Self {
            settings,
            editor,
            notifier,
            handler: Mutex::new(None),
            shell: Mutex::new(None),
        }
    }

    /// The settings this plugin runs with.
    #[must_use]
    pub fn settings(&self) -> &UnfurlSettings {
        &self.settings
    }

    /// Spawn the enabled process channels.
    ///
    /// Must run inside a tokio runtime. A channel that fails to spawn is
    /// reported as a notice and skipped; the plugin still loads, snippets
    /// and the other channel keep working.
    pub fn load(&self) {
        if self.settings.handler.enabled {
            // The spawn command may carry context placeholders; text
            // placeholders are left verbatim for the handler to see.
            let ctx = resolve_context(self.editor.as_ref(), &self.settings.expansion.scripts_dir);
            match render(
                &self.settings.handler.command,
                None,
                &ctx,
                MissingFilePolicy::Permissive,
            ) {
                Ok(command) => {
                    *self.handler.lock() = self.open_channel(
                        "handler",
                        ResponseKind::Handler,
                        SupervisorConfig {
                            channel: "handler".to_string(),
                            command,
                            framing: Framing::Lines,
                            respawn_on_exit: false,
                        },
                    );
                }
                Err(e) => self.notifier.notify(&e.to_string()),
            }
        }

        if self.settings.shell.enabled {
            *self.shell.lock() = self.open_channel(
                "shell",
                ResponseKind::Shell,
                SupervisorConfig {
                    channel: "shell".to_string(),
                    command: self.settings.shell.command.clone(),
                    framing: Framing::Chunks,
                    respawn_on_exit: self.settings.shell.respawn_on_exit,
                },
            );
        }
    }

    fn open_channel(
        &self,
        name: &'static str,
        kind: ResponseKind,
        config: SupervisorConfig,
    ) -> Option<Arc<Channel>> {
        match ProcessSupervisor::spawn(config) {
            Ok((supervisor, events)) => {
                let queue = Arc::new(Mutex::new(SessionQueue::new(
                    self.settings.expansion.max_in_flight,
                )));
                drop(tokio::spawn(pump_process_events(
                    name,
                    kind,
                    events,
                    queue.clone(),
                    self.editor.clone(),
                    self.notifier.clone(),
                )));
                info!(channel = name, "channel opened");
                Some(Arc::new(Channel { supervisor, queue }))
            }
            Err(e) => {
                warn!(channel = name, error = %e, "channel failed to open");
                self.notifier.notify(&e.to_string());
                None
            }
        }
    }

    /// Kill both channels. In-flight requests are dropped, not drained.
    pub fn unload(&self) {
        info!("unloading");
        for channel in [self.handler.lock().take(), self.shell.lock().take()]
            .into_iter()
            .flatten()
        {
            channel.supervisor.shutdown();
            let _ = channel.queue.lock().clear();
        }
    }

    /// Handle one key-down event from the host.
    ///
    /// Anything but the configured trigger key passes through untouched.
    /// On the trigger key, runs a full pass: static replacements land
    /// before this returns, process-bound ones are dispatched to their
    /// channels and land later, from the channel pumps.
    pub async fn handle_key_down(&self, key: &str) -> KeyDisposition {
        if key != self.settings.expansion.trigger_key {
            return KeyDisposition::PassThrough;
        }

        let outcome = run_trigger_pass(
            self.editor.as_ref(),
            self.notifier.as_ref(),
            &self.settings,
        );
        for request in outcome.requests {
            self.dispatch(request).await;
        }
        outcome.disposition
    }

    /// Total expansions currently awaiting a process response.
    #[must_use]
    pub fn pending_expansions(&self) -> usize {
        let count = |slot: &Mutex<Option<Arc<Channel>>>| {
            slot.lock().as_ref().map_or(0, |ch| ch.queue.lock().in_flight())
        };
        count(&self.handler) + count(&self.shell)
    }

    async fn dispatch(&self, request: ExpansionRequest) {
        match request {
            ExpansionRequest::Shell { command, target } => {
                let Some(channel) = self.shell.lock().clone() else {
                    self.notifier
                        .notify(&ExpandError::process_unavailable("shell").to_string());
                    return;
                };
                self.send_on(&channel, target, |_| Ok(command)).await;
            }
            ExpansionRequest::Handler {
                text,
                context,
                target,
            } => {
                let Some(channel) = self.handler.lock().clone() else {
                    self.notifier
                        .notify(&ExpandError::process_unavailable("handler").to_string());
                    return;
                };
                self.send_on(&channel, target, |id| {
                    HandlerRequest {
                        id,
                        text,
                        context,
                    }
                    .encode()
                    .map_err(|e| e.to_string())
                })
                .await;
            }
        }
    }

    /// Open a queue slot, build the wire line, and write it to the channel.
    /// Any failure after the slot opened abandons it so capacity is not
    /// leaked to a request that never went out.
    async fn send_on(
        &self,
        channel: &Channel,
        target: ReplaceTarget,
        build: impl FnOnce(unfurl_core::RequestId) -> Result<String, String>,
    ) {
        let id = match channel.queue.lock().begin(target) {
            Ok(id) => id,
            Err(e) => {
                self.notifier.notify(&e.to_string());
                return;
            }
        };
        let line = match build(id) {
            Ok(line) => line,
            Err(detail) => {
                channel.queue.lock().abandon(id);
                self.notifier.notify(&detail);
                return;
            }
        };
        if let Err(e) = channel.supervisor.send(line).await {
            channel.queue.lock().abandon(id);
            self.notifier.notify(&e.to_string());
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
