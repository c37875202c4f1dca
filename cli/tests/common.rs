//! # Footbot CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared helpers for the integration tests that run the compiled `footbot`
//! binary. Every command runs inside a throwaway sandbox directory so the
//! developer's own configuration and environment never leak into a test:
//! - the working directory is the sandbox, which contains a `.git` marker so
//!   the `.footbot.toml` search stops there;
//! - `XDG_CONFIG_HOME` / `HOME` point into the sandbox;
//! - every `FOOTBOT_*` / `GEMINI_API_KEY` variable is removed.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Creates an isolated sandbox directory.
pub fn sandbox() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create sandbox dir");
    fs::create_dir(dir.path().join(".git")).expect("Failed to create .git marker");
    dir
}

/// Writes a project configuration file into the sandbox.
pub fn write_project_config(sandbox: &Path, contents: &str) {
    fs::write(sandbox.join(".footbot.toml"), contents).expect("Failed to write .footbot.toml");
}

/// # Get Footbot Command (`footbot_cmd`)
///
/// An `assert_cmd::Command` for the `footbot` binary, running inside `sandbox`
/// with a scrubbed environment.
pub fn footbot_cmd(sandbox: &Path) -> Command {
    let mut cmd = Command::cargo_bin("footbot").expect("Failed to find footbot binary for testing");
    cmd.current_dir(sandbox)
        .env("XDG_CONFIG_HOME", sandbox.join("xdg"))
        .env("HOME", sandbox)
        .env_remove("GEMINI_API_KEY")
        .env_remove("FOOTBOT_API_URL")
        .env_remove("FOOTBOT_STYLE")
        .env_remove("FOOTBOT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}
