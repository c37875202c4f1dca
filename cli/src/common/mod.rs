//! # Footbot Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module is the root of the shared infrastructure that the chat engine
//! and the command handlers build on. It holds everything that talks to the
//! outside world, keeping `chatbot::` free of HTTP details and `commands::`
//! free of protocol knowledge.
//!
//! ## Architecture
//!
//! - **`network`**: bounded retry with exponential backoff for transient failures.
//! - **`transfermarkt`**: the `FootballApi` boundary and its `reqwest` client, including the TTL response cache.
//! - **`llm`**: the optional `LanguageModel` used to phrase replies, with a Gemini implementation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::common::llm::GeminiClient;
//! use crate::common::transfermarkt::{FootballApi, TransfermarktClient};
//!
//! let api = TransfermarktClient::new(&config.api)?;
//! let hit = api.search_player("Lionel Messi").await;
//! let llm = GeminiClient::from_config(&config.llm)?;
//! ```
//!

/// The optional language model used to phrase replies.
pub mod llm;
/// Retry/backoff helpers for outbound HTTP.
pub mod network;
/// The football statistics API boundary and client.
pub mod transfermarkt;
