//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a throwaway config file and verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run the CLI with `--config <path>` and optional stdin; return (stdout, stderr, code).
fn run_cli(config: &Path, args: &[&str], stdin: &str) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_focusmate"))
        .arg("--config")
        .arg(config)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_config_set_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let (stdout, _, code) = run_cli(&config, &["config", "set", "focus.work", "45"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(&config, &["config", "get", "focus.work"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "45");
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let (_, stderr, code) = run_cli(&config, &["config", "set", "focus.nap", "5"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, stderr, code) = run_cli(&config, &["config", "get", "focus.nap"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_chat_onboarding_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let script = "/start\n1\nFinish the thesis\n\nRead\nWalk\n\n/check Read\n/status\n/quit\n";

    let (stdout, _, code) = run_cli(&config, &["chat", "--user", "3"], script);
    assert_eq!(code, 0);
    assert!(stdout.contains("Choose your language:"));
    assert!(stdout.contains("Welcome! Language set to English."));
    assert!(stdout.contains("All set! Tracking 2 habits."));
    assert!(stdout.contains("Checked 'Read'. Streak: 1 days"));
    assert!(stdout.contains("Habits: 1/2"));
}

#[test]
fn test_chat_reports_dialog_errors_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let (stdout, stderr, code) = run_cli(&config, &["chat"], "hello\n/help\n/quit\n");
    assert_eq!(code, 0);
    assert!(stderr.contains("error: Dialog error: no dialog in progress for user 1"));
    assert!(stdout.contains("/pomodoro"));
}
