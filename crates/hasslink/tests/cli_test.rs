//! Integration tests for the `hasslink` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! config handling and error exit codes, all without a live hub.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `hasslink` binary with env isolation.
///
/// Clears all `HASSLINK_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn hasslink_cmd(home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("hasslink");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("HASSLINK_PROFILE")
        .env_remove("HASSLINK_HOST")
        .env_remove("HASSLINK_PORT")
        .env_remove("HASSLINK_TOKEN")
        .env_remove("HASSLINK_OUTPUT")
        .env_remove("HASSLINK_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = hasslink_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("Home Assistant")
            .and(predicate::str::contains("states"))
            .and(predicate::str::contains("events"))
            .and(predicate::str::contains("call")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hasslink"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = tempfile::tempdir().unwrap();
    let output = hasslink_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_states_without_hub_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path())
        .args(["states", "--limit", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No hub configured"));
}

#[test]
fn test_missing_token_is_auth_error() {
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path())
        .args(["--host", "127.0.0.1", "--port", "9", "states", "--limit", "1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("access token"));
}

#[test]
fn test_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path())
        .args(["--profile", "cabin", "events"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cabin"));
}

#[test]
fn test_call_rejects_unknown_service_before_connecting() {
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path())
        .args([
            "--host", "127.0.0.1", "--port", "9", "--token", "t", "call", "timer", "toggle",
            "timer.tea",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no service 'toggle'"));
}

#[test]
fn test_invalid_output_format() {
    let home = tempfile::tempdir().unwrap();
    let output = hasslink_cmd(home.path())
        .args(["--output", "table", "states"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_call_times_out_when_hub_unreachable() {
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path())
        .args([
            "--host", "127.0.0.1", "--port", "9", "--token", "t", "--timeout", "1", "call",
            "switch", "toggle", "switch.fan",
        ])
        .assert()
        .code(8);
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    // `config show` renders the default config when no file exists.
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path())
        .args(["--output", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default_profile\": \"default\""));
}

#[test]
fn test_config_set_then_profiles() {
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path())
        .args(["--profile", "cabin", "config", "set", "host", "cabin.lan"])
        .assert()
        .success();
    hasslink_cmd(home.path())
        .args(["config", "use", "cabin"])
        .assert()
        .success();
    hasslink_cmd(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cabin *"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path())
        .args(["config", "set", "site", "default"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_call_help_lists_light_options() {
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path())
        .args(["call", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--brightness")
                .and(predicate::str::contains("--rgb"))
                .and(predicate::str::contains("--kelvin"))
                .and(predicate::str::contains("--url")),
        );
}

#[test]
fn test_config_subcommands_exist() {
    let home = tempfile::tempdir().unwrap();
    hasslink_cmd(home.path())
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("show")
                .and(predicate::str::contains("path"))
                .and(predicate::str::contains("set-token")),
        );
}
