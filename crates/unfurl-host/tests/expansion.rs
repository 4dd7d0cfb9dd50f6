//! End-to-end expansion tests against real child processes.

use std::sync::Arc;
use std::time::Duration;

use unfurl_core::{KeyDisposition, ShortcutEntry};
use unfurl_host::{NoticeLog, ScratchBuffer, UnfurlPlugin};
use unfurl_settings::UnfurlSettings;

fn command_rule(regex: &str, command: &str) -> ShortcutEntry {
    ShortcutEntry {
        regex: regex.to_string(),
        replacement: None,
        command: Some(command.to_string()),
    }
}

async fn wait_until(what: &str, mut done: impl FnMut() -> bool) {
    let check = async {
        while !done() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(5), check)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}

#[tokio::test]
async fn shell_command_expands_the_matched_span() {
    let buffer = Arc::new(ScratchBuffer::from_line("/vault", "a {{now}} b", 4));
    let notifier = Arc::new(NoticeLog::default());
    let mut settings = UnfurlSettings::default();
    settings.shell.enabled = true;
    settings.shell.shortcuts = vec![command_rule("^now$", "printf NOW")];
    let plugin = UnfurlPlugin::new(buffer.clone(), notifier.clone(), settings);

    plugin.load();
    let disposition = plugin.handle_key_down("Tab").await;
    assert_eq!(disposition, KeyDisposition::Consume);
    // the span is untouched until the shell answers
    assert_eq!(plugin.pending_expansions(), 1);

    wait_until("shell replacement", || buffer.line(0) == "a NOW b").await;
    assert_eq!(plugin.pending_expansions(), 0);
    assert!(notifier.is_empty());
    plugin.unload();
}

#[tokio::test]
async fn shell_sees_escaped_match_content() {
    let buffer = Arc::new(ScratchBuffer::from_line("/vault", "{{it's}}", 3));
    let notifier = Arc::new(NoticeLog::default());
    let mut settings = UnfurlSettings::default();
    settings.snippets.clear();
    settings.shell.enabled = true;
    settings.shell.shortcuts = vec![command_rule(".*", "printf %s <text>")];
    let plugin = UnfurlPlugin::new(buffer.clone(), notifier.clone(), settings);

    plugin.load();
    let _ = plugin.handle_key_down("Tab").await;
    wait_until("escaped output", || buffer.line(0) == "it's").await;
    plugin.unload();
}

#[tokio::test]
async fn handler_round_trip_replaces_forwarded_content() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("handler.sh");
    std::fs::write(
        &script,
        "while IFS= read -r line; do\n  printf '{\"id\": 0, \"replacement\": \"HANDLED\"}\\n'\ndone\n",
    )
    .unwrap();

    let buffer = Arc::new(ScratchBuffer::from_line("/vault", "x {{mystery}} y", 4));
    let notifier = Arc::new(NoticeLog::default());
    let mut settings = UnfurlSettings::default();
    settings.snippets.clear();
    settings.handler.enabled = true;
    settings.handler.command = format!("/bin/sh {}", script.display());
    let plugin = UnfurlPlugin::new(buffer.clone(), notifier.clone(), settings);

    plugin.load();
    let disposition = plugin.handle_key_down("Tab").await;
    assert_eq!(disposition, KeyDisposition::Consume);

    wait_until("handler replacement", || buffer.line(0) == "x HANDLED y").await;
    assert!(notifier.is_empty());
    plugin.unload();
}

#[tokio::test]
async fn handler_receives_the_wire_request_shape() {
    // the handler records each request line before answering, so the test
    // can inspect exactly what went over the wire
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("record.sh");
    let capture = dir.path().join("requests.jsonl");
    std::fs::write(
        &script,
        format!(
            "while IFS= read -r line; do\n  printf '%s\\n' \"$line\" >> {}\n  printf '{{\"replacement\": \"ok\"}}\\n'\ndone\n",
            capture.display()
        ),
    )
    .unwrap();

    let buffer = Arc::new(ScratchBuffer::from_line("/vault", "{{ping}}", 3));
    let notifier = Arc::new(NoticeLog::default());
    let mut settings = UnfurlSettings::default();
    settings.snippets.clear();
    settings.handler.enabled = true;
    settings.handler.command = format!("/bin/sh {}", script.display());
    let plugin = UnfurlPlugin::new(buffer.clone(), notifier.clone(), settings);

    plugin.load();
    let _ = plugin.handle_key_down("Tab").await;
    wait_until("handler reply", || buffer.line(0) == "ok").await;

    let recorded = std::fs::read_to_string(&capture).unwrap();
    let wire: serde_json::Value = serde_json::from_str(recorded.lines().next().unwrap()).unwrap();
    assert_eq!(wire["text"], "ping");
    assert_eq!(wire["context"]["vault_path"], "/vault");
    assert_eq!(wire["context"]["file_name"], serde_json::Value::Null);
    assert!(wire["context"].get("inner_path").is_none());
    assert!(wire["id"].is_number());
    plugin.unload();
}

#[tokio::test]
async fn second_trigger_while_pending_is_rejected_with_a_notice() {
    let buffer = Arc::new(ScratchBuffer::from_line("/vault", "a {{slow}} b", 4));
    let notifier = Arc::new(NoticeLog::default());
    let mut settings = UnfurlSettings::default();
    settings.shell.enabled = true;
    settings.shell.shortcuts = vec![command_rule("^slow$", "sleep 30")];
    let plugin = UnfurlPlugin::new(buffer.clone(), notifier.clone(), settings);

    plugin.load();
    let _ = plugin.handle_key_down("Tab").await;
    assert_eq!(plugin.pending_expansions(), 1);

    let _ = plugin.handle_key_down("Tab").await;
    assert_eq!(plugin.pending_expansions(), 1);
    let notices = notifier.notices();
    assert_eq!(notices, vec!["expansion already in flight (1 pending)".to_string()]);
    assert_eq!(buffer.line(0), "a {{slow}} b");
    plugin.unload();
}

#[tokio::test]
async fn shell_stderr_is_surfaced_without_resolving_the_session() {
    let buffer = Arc::new(ScratchBuffer::from_line("/vault", "a {{bad}} b", 4));
    let notifier = Arc::new(NoticeLog::default());
    let mut settings = UnfurlSettings::default();
    settings.shell.enabled = true;
    settings.shell.shortcuts = vec![command_rule("^bad$", "echo broken 1>&2")];
    let plugin = UnfurlPlugin::new(buffer.clone(), notifier.clone(), settings);

    plugin.load();
    let _ = plugin.handle_key_down("Tab").await;
    wait_until("stderr notice", || !notifier.is_empty()).await;

    assert!(notifier.notices()[0].contains("broken"));
    assert_eq!(buffer.line(0), "a {{bad}} b");
    assert_eq!(plugin.pending_expansions(), 1);
    plugin.unload();
}

#[tokio::test]
async fn mixed_line_serves_snippet_and_shell_in_one_pass() {
    let buffer = Arc::new(ScratchBuffer::from_line("/vault", "{{now}} :sig", 10));
    let notifier = Arc::new(NoticeLog::default());
    let mut settings = UnfurlSettings::default();
    settings.snippets = vec![unfurl_core::SnippetEntry {
        trigger: "sig".to_string(),
        replacement: "-- moose".to_string(),
    }];
    settings.shell.enabled = true;
    settings.shell.shortcuts = vec![command_rule("^now$", "printf NOW")];
    let plugin = UnfurlPlugin::new(buffer.clone(), notifier.clone(), settings);

    plugin.load();
    // cursor sits in the colon word; only that family fires
    let disposition = plugin.handle_key_down("Tab").await;
    assert_eq!(disposition, KeyDisposition::Consume);
    assert_eq!(buffer.line(0), "{{now}} -- moose");
    assert_eq!(plugin.pending_expansions(), 0);
    plugin.unload();
}
