//! # unfurl
//!
//! Dev host binary for the unfurl expansion engine: runs one line + cursor
//! through the full pipeline against a scratch buffer, standing in for the
//! host editor.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use unfurl_core::FormatSpec;
use unfurl_engine::CompiledFormat;
use unfurl_host::{NoticeLog, ScratchBuffer, UnfurlPlugin};
use unfurl_settings::{UnfurlSettings, load_settings, load_settings_from_path};

/// Unfurl dev host.
#[derive(Parser, Debug)]
#[command(name = "unfurl", about = "Live text-expansion engine dev host")]
struct Cli {
    /// Settings file (defaults to `~/.unfurl/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Run one trigger pass over a line and print the result.
    Expand {
        /// The line to scan.
        #[arg(long)]
        line: String,

        /// Cursor column, counted in chars.
        #[arg(long)]
        cursor: usize,

        /// Workspace root the context is resolved against.
        #[arg(long, default_value = ".")]
        vault: PathBuf,

        /// How long to wait for process-backed expansions, in milliseconds.
        #[arg(long, default_value = "2000")]
        wait_ms: u64,
    },
    /// Compile every configured pattern and rule regex, report failures.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => load_settings_from_path(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => load_settings().context("loading settings")?,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        CliCommand::Expand {
            line,
            cursor,
            vault,
            wait_ms,
        } => expand(settings, &line, cursor, vault, wait_ms).await,
        CliCommand::Check => check(&settings),
    }
}

/// One-shot expansion against a scratch buffer.
async fn expand(
    settings: UnfurlSettings,
    line: &str,
    cursor: usize,
    vault: PathBuf,
    wait_ms: u64,
) -> Result<()> {
    let vault = vault
        .canonicalize()
        .with_context(|| format!("resolving vault path {}", vault.display()))?;
    let buffer = Arc::new(ScratchBuffer::from_line(vault, line, cursor));
    let notifier = Arc::new(NoticeLog::default());
    let trigger_key = settings.expansion.trigger_key.clone();
    let plugin = UnfurlPlugin::new(buffer.clone(), notifier.clone(), settings);

    plugin.load();
    let disposition = plugin.handle_key_down(&trigger_key).await;

    // Bounded wait for process-backed results; snippet-only passes return
    // with nothing pending and skip this entirely.
    let deadline = Instant::now() + Duration::from_millis(wait_ms);
    while plugin.pending_expansions() > 0 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    let unresolved = plugin.pending_expansions();
    if unresolved > 0 {
        warn!(unresolved, wait_ms, "expansions still pending at deadline");
    }
    plugin.unload();

    for notice in notifier.notices() {
        eprintln!("notice: {notice}");
    }
    eprintln!("key: {disposition:?}");
    println!("{}", buffer.contents());
    Ok(())
}

/// Compile-check every configured regex without running anything.
fn check(settings: &UnfurlSettings) -> Result<()> {
    let mut failures = 0usize;

    for format in &settings.formats {
        match CompiledFormat::compile(format) {
            Ok(_) => println!("ok      format   {}", format.pattern),
            Err(e) => {
                failures += 1;
                println!("FAILED  format   {e}");
            }
        }
    }
    for entry in &settings.shell.shortcuts {
        // shortcut regexes go through the same engine with no cut offsets
        match CompiledFormat::compile(&FormatSpec::new(entry.regex.clone(), 0, 0)) {
            Ok(_) => println!("ok      shortcut {}", entry.regex),
            Err(e) => {
                failures += 1;
                println!("FAILED  shortcut {e}");
            }
        }
        if entry.replacement.is_none() && entry.command.is_none() {
            println!("note    shortcut {} carries no replacement or command", entry.regex);
        }
    }

    if failures > 0 {
        bail!("{failures} pattern(s) failed to compile");
    }
    println!(
        "{} format(s), {} shortcut(s), {} snippet(s): all patterns compile",
        settings.formats.len(),
        settings.shell.shortcuts.len(),
        settings.snippets.len()
    );
    Ok(())
}
