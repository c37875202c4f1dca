//! # Footbot CLI Main Integration Tests
//!
//! File: cli/tests/main_tests.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Top-level behavior of the `footbot` binary: standard flags, the `help`
//! subcommand and argument validation.
//!

mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_version_flag() {
    let dir = sandbox();
    footbot_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_commands() {
    let dir = sandbox();
    footbot_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("chat")
                .and(predicate::str::contains("ask"))
                .and(predicate::str::contains("classify"))
                .and(predicate::str::contains("serve")),
        );
}

#[test]
fn test_help_subcommand() {
    let dir = sandbox();
    footbot_cmd(dir.path())
        .args(["help", "ask"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-llm").and(predicate::str::contains("--style")));
}

#[test]
fn test_no_command_fails() {
    let dir = sandbox();
    footbot_cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_unknown_style_rejected() {
    let dir = sandbox();
    footbot_cmd(dir.path())
        .args(["ask", "--style", "shouty", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("shouty"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = sandbox();
    footbot_cmd(dir.path())
        .args(["--config", "does-not-exist.toml", "classify", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.toml"));
}
