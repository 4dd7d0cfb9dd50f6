//! External process lifecycle: spawn, pipe pump, respawn, teardown.
//!
//! A [`ProcessSupervisor`] owns exactly one child at a time and is the only
//! path to its pipes. Callers write requests through [`ProcessSupervisor::send`]
//! and read everything the child produces from the event receiver returned
//! at spawn: stdout payloads (framed per channel mode), raw stderr text, and
//! exit notifications.
//!
//! Framing is the one behavioral split between the two channel modes. The
//! handler speaks line-delimited JSON, so its stdout is split into lines;
//! the shell's stdout is delivered as raw chunks, one response per read.
//!
//! Respawn is opt-in and shell-only in practice: when enabled, an exited
//! child is replaced after an exponential backoff. A non-respawning channel
//! whose child exits stays dead; sends then fail with
//! [`ProcessError::Unavailable`].

use std::pin::Pin;
use std::process::Stdio;
use std::time::{Duration, Instant};

use futures::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{ProcessError, Result};

/// First respawn delay after a child exit.
const RESPAWN_BACKOFF_INITIAL: Duration = Duration::from_millis(250);

/// Respawn delay ceiling.
const RESPAWN_BACKOFF_MAX: Duration = Duration::from_secs(30);

/// A child that survived this long resets the backoff to initial.
const BACKOFF_RESET_UPTIME: Duration = Duration::from_secs(30);

/// How the child's stdout is cut into response payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framing {
    /// Each read chunk is one payload, delivered verbatim (shell mode).
    Chunks,
    /// Stdout is split on newlines, one payload per line (handler mode).
    Lines,
}

/// Everything needed to run one process channel.
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Channel name for logs and errors (`handler` or `shell`).
    pub channel: String,
    /// Spawn command, whitespace-split into argv.
    pub command: String,
    /// Stdout framing mode.
    pub framing: Framing,
    /// Whether an exited child is replaced (with backoff).
    pub respawn_on_exit: bool,
}

/// Something the child produced, delivered to the owning channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessEvent {
    /// One framed stdout payload.
    Stdout(String),
    /// Raw stderr text, surfaced to the user as-is.
    Stderr(String),
    /// The child exited. Followed by a respawn or the end of the stream.
    Exited {
        /// Exit code, when the OS reported one.
        code: Option<i32>,
    },
}

/// Handle to one running process channel.
///
/// Dropping the handle cancels the pump and kills the child.
#[derive(Debug)]
pub struct ProcessSupervisor {
    channel: String,
    input_tx: mpsc::Sender<String>,
    cancel: CancellationToken,
}

impl ProcessSupervisor {
    /// Spawn the configured process and start its pump.
    ///
    /// Returns the handle plus the event stream. The first spawn failure is
    /// reported here; respawn failures end the event stream instead.
    pub fn spawn(config: SupervisorConfig) -> Result<(Self, mpsc::Receiver<ProcessEvent>)> {
        let argv = split_argv(&config.command)
            .ok_or_else(|| ProcessError::EmptyCommand {
                channel: config.channel.clone(),
            })?;
        let child = spawn_child(&argv)?;
        info!(channel = %config.channel, ?argv, "process spawned");

        let (input_tx, input_rx) = mpsc::channel(64);
        let (event_tx, event_rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();
        let channel = config.channel.clone();

        drop(tokio::spawn(pump_loop(
            config,
            argv,
            child,
            input_rx,
            event_tx,
            cancel.clone(),
        )));

        Ok((
            Self {
                channel,
                input_tx,
                cancel,
            },
            event_rx,
        ))
    }

    /// Queue one request line for the child's stdin.
    ///
    /// The pump appends the terminating newline. Fails once the pump has
    /// ended (dead non-respawning child or shutdown).
    pub async fn send(&self, line: String) -> Result<()> {
        self.input_tx
            .send(line)
            .await
            .map_err(|_| ProcessError::Unavailable {
                channel: self.channel.clone(),
            })
    }

    /// Tear the channel down: kill the child, end the event stream.
    ///
    /// No drain is attempted; requests still queued are dropped.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Channel name this supervisor was spawned for.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Whitespace-split a spawn command into argv. `None` when empty.
#[must_use]
pub fn split_argv(command: &str) -> Option<Vec<String>> {
    let argv: Vec<String> = command.split_whitespace().map(String::from).collect();
    (!argv.is_empty()).then_some(argv)
}

fn spawn_child(argv: &[String]) -> Result<Child> {
    Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ProcessError::Spawn {
            program: argv[0].clone(),
            source: e,
        })
}

/// Why one child's pump stopped.
enum PumpExit {
    Cancelled,
    OwnerDropped,
    Exited(Option<i32>),
}

/// Outer loop: pump one child until it dies, then respawn or stop.
async fn pump_loop(
    config: SupervisorConfig,
    argv: Vec<String>,
    mut child: Child,
    mut input_rx: mpsc::Receiver<String>,
    event_tx: mpsc::Sender<ProcessEvent>,
    cancel: CancellationToken,
) {
    let channel = config.channel.as_str();
    let mut backoff = RESPAWN_BACKOFF_INITIAL;

    loop {
        let started = Instant::now();
        let exit = pump_child(
            channel,
            config.framing,
            &mut child,
            &mut input_rx,
            &event_tx,
            &cancel,
        )
        .await;

        match exit {
            PumpExit::Cancelled | PumpExit::OwnerDropped => {
                debug!(channel, "pump stopping, killing child");
                let _ = child.kill().await;
                return;
            }
            PumpExit::Exited(code) => {
                warn!(channel, ?code, "child process exited");
                if event_tx.send(ProcessEvent::Exited { code }).await.is_err() {
                    return;
                }
                if !config.respawn_on_exit {
                    return;
                }
                if started.elapsed() >= BACKOFF_RESET_UPTIME {
                    backoff = RESPAWN_BACKOFF_INITIAL;
                }
                info!(
                    channel,
                    delay_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                    "respawning after backoff"
                );
                tokio::select! {
                    () = cancel.cancelled() => return,
                    () = tokio::time::sleep(backoff) => {}
                }
                backoff = (backoff * 2).min(RESPAWN_BACKOFF_MAX);
                match spawn_child(&argv) {
                    Ok(next) => child = next,
                    Err(e) => {
                        warn!(channel, error = %e, "respawn failed, channel going dark");
                        return;
                    }
                }
            }
        }
    }
}

/// Inner loop: shuttle bytes for one child until it exits or we are told
/// to stop. On exit, both output streams are drained to EOF before the exit
/// is reported, so a final response is never raced away.
async fn pump_child(
    channel: &str,
    framing: Framing,
    child: &mut Child,
    input_rx: &mut mpsc::Receiver<String>,
    event_tx: &mpsc::Sender<ProcessEvent>,
    cancel: &CancellationToken,
) -> PumpExit {
    // Pipes were requested at spawn; a missing handle means the child was
    // already reaped, which we treat as an immediate exit.
    let Some(mut stdin) = child.stdin.take() else {
        return PumpExit::Exited(None);
    };
    let Some(stdout) = child.stdout.take() else {
        return PumpExit::Exited(None);
    };
    let Some(stderr) = child.stderr.take() else {
        return PumpExit::Exited(None);
    };

    let mut stdout = framed_stdout(channel, framing, stdout);
    let mut stderr = chunk_stream(stderr);
    let mut stdout_done = false;
    let mut stderr_done = false;
    let mut exit_code: Option<Option<i32>> = None;

    loop {
        if exit_code.is_some() && stdout_done && stderr_done {
            return PumpExit::Exited(exit_code.flatten());
        }
        tokio::select! {
            () = cancel.cancelled() => return PumpExit::Cancelled,

            line = input_rx.recv(), if exit_code.is_none() => {
                let Some(line) = line else {
                    return PumpExit::OwnerDropped;
                };
                debug!(channel, bytes = line.len(), "writing request");
                if let Err(e) = write_line(&mut stdin, &line).await {
                    // The child is likely mid-death; its exit will surface.
                    warn!(channel, error = %e, "stdin write failed");
                }
            }

            payload = stdout.next(), if !stdout_done => {
                match payload {
                    Some(payload) => {
                        if event_tx.send(ProcessEvent::Stdout(payload)).await.is_err() {
                            return PumpExit::OwnerDropped;
                        }
                    }
                    None => stdout_done = true,
                }
            }

            text = stderr.next(), if !stderr_done => {
                match text {
                    Some(text) => {
                        if event_tx.send(ProcessEvent::Stderr(text)).await.is_err() {
                            return PumpExit::OwnerDropped;
                        }
                    }
                    None => stderr_done = true,
                }
            }

            status = child.wait(), if exit_code.is_none() => {
                exit_code = Some(status.ok().and_then(|s| s.code()));
            }
        }
    }
}

async fn write_line(
    stdin: &mut tokio::process::ChildStdin,
    line: &str,
) -> std::io::Result<()> {
    stdin.write_all(line.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await
}

type PayloadStream = Pin<Box<dyn Stream<Item = String> + Send>>;

fn framed_stdout(channel: &str, framing: Framing, stdout: ChildStdout) -> PayloadStream {
    let channel = channel.to_string();
    match framing {
        Framing::Lines => Box::pin(
            FramedRead::new(stdout, LinesCodec::new()).filter_map(move |result| {
                let item = match result {
                    Ok(line) => Some(line),
                    Err(e) => {
                        warn!(channel = %channel, error = %e, "unreadable stdout line dropped");
                        None
                    }
                };
                futures::future::ready(item)
            }),
        ),
        Framing::Chunks => Box::pin(ReaderStream::new(stdout).filter_map(move |result| {
            let item = match result {
                Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                Err(e) => {
                    warn!(channel = %channel, error = %e, "stdout read failed");
                    None
                }
            };
            futures::future::ready(item)
        })),
    }
}

fn chunk_stream(stderr: ChildStderr) -> PayloadStream {
    Box::pin(ReaderStream::new(stderr).filter_map(|result| {
        futures::future::ready(
            result
                .ok()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()),
        )
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
