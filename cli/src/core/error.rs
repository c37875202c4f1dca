//! # Footbot Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module defines the application-level error types used by Footbot's
//! setup code: configuration loading, client construction, prompt rendering
//! and the HTTP server. Failures *inside* a chat turn (API, LLM) never reach
//! this level; they are recovered into a reply by the chat engine and are
//! modelled separately by `common::transfermarkt::ApiFailure` and
//! `common::llm::LlmFailure`.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `FootbotError`: A custom error enum using `thiserror` for specific error types
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! ## Examples
//!
//! ```rust,ignore
//! if config.chat.history_limit == 0 {
//!     return Err(FootbotError::Config("history_limit must be at least 1".into()))?;
//! }
//!
//! let content = fs::read_to_string(&path)
//!     .with_context(|| format!("Failed to read file: {}", path.display()))?;
//! ```
//!
use thiserror::Error;

/// Custom error type for the Footbot application.
#[derive(Error, Debug)]
pub enum FootbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client setup failed: {source}")]
    HttpClient {
        #[from]
        source: reqwest::Error,
    },

    #[error("Prompt rendering error: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },

    #[error("Invalid intent pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("Unknown response style '{0}'. Expected casual, professional or detailed.")]
    UnknownStyle(String),

    #[error("Session '{id}' not found.")]
    SessionNotFound { id: String },

    #[error("Server error: {0}")]
    Server(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
