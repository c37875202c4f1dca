//! # Footbot Language Model Module (`common::llm`)
//!
//! File: cli/src/common/llm/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The optional text generator used to phrase chat replies. The chat engine
//! only knows the `LanguageModel` trait; whether a model is configured at all
//! is decided once at startup (see `LlmConfig::is_available`). Any failure is
//! reported as an `LlmFailure` and the caller falls back to its templates, so
//! nothing here is ever fatal.
//!
//! ## Architecture
//!
//! - **`LanguageModel`**: `generate(prompt) -> Result<String, LlmFailure>`.
//! - **`gemini`**: Google Gemini `generateContent` implementation.
//!
use thiserror::Error;

pub mod gemini;

pub use gemini::GeminiClient;

/// Why the model produced no text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmFailure {
    #[error("language model timed out")]
    Timeout,

    #[error("language model unavailable: {0}")]
    Unavailable(String),
}

/// A text generator that turns a fully rendered prompt into a reply.
#[allow(async_fn_in_trait)]
pub trait LanguageModel {
    async fn generate(&self, prompt: &str) -> Result<String, LlmFailure>;

    /// Short label for logs (`gemini-2.0-flash`, `fake`, ...).
    fn name(&self) -> &str;
}
