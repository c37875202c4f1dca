//! # Footbot Library Root
//!
//! File: cli/src/lib.rs
//! Author: Christi Mahu
//!
//! The chat engine and its collaborators are exposed as a library so the
//! integration tests under `cli/tests/` can drive them with fake API and
//! language-model implementations. The `footbot` binary (`main.rs`) is a thin
//! clap front-end over `commands`.
//!
pub mod chatbot; // Intent extraction, session history, reply composition.
pub mod commands; // CLI command handlers (chat, ask, classify, serve).
pub mod common; // Statistics API client, LLM client, retry helper.
pub mod core; // Configuration, errors, prompt templating.
