//! # Footbot Command Modules
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the top-level commands of the Footbot CLI. Each
//! command defines its own clap arguments struct and an async `handle_*`
//! function called from `main.rs`.
//!
//! ## Commands
//!
//! - `chat`: Interactive conversation in the terminal (REPL).
//! - `ask`: One question, one reply, then exit.
//! - `classify`: Shows how an utterance is understood. No network access.
//! - `serve`: JSON chat endpoint over HTTP.
//!
//! `chat`, `ask` and `serve` share the `ChatOptions` flags, which are applied
//! on top of the loaded configuration (see `core::config` for the layers
//! underneath).
//!
use crate::chatbot::types::ResponseStyle;
use crate::core::config::{self, Config};
use crate::core::error::Result;
use clap::Args;
use std::path::Path;
use tracing::debug;

/// Implements `footbot ask` (one-shot question).
pub mod ask;
/// Implements `footbot chat` (interactive REPL).
pub mod chat;
/// Implements `footbot classify` (intent and entities only).
pub mod classify;
/// Implements `footbot serve` (HTTP chat endpoint).
pub mod serve;

/// Flags shared by every command that talks to the statistics API.
#[derive(Args, Debug, Clone, Default)]
pub struct ChatOptions {
    /// Reply style: casual, professional or detailed (overrides `chat.default_style`).
    #[arg(long, value_enum)]
    pub style: Option<ResponseStyle>,

    /// Never call the language model; phrase every reply with the built-in templates.
    #[arg(long)]
    pub no_llm: bool,

    /// Base URL of the statistics API (overrides `api.base_url`).
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
}

impl ChatOptions {
    /// Loads the layered configuration, then applies these flags on top.
    pub fn load_config(&self, explicit: Option<&Path>) -> Result<Config> {
        let mut config = config::load_config(explicit)?;
        self.apply(&mut config);
        config::validate_config(&config)?;
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(style) = self.style {
            debug!("--style overrides chat.default_style with {}", style);
            config.chat.default_style = style;
        }
        if self.no_llm {
            debug!("--no-llm given, language model disabled");
            config.llm.enabled = false;
        }
        if let Some(url) = &self.api_url {
            debug!("--api-url overrides api.base_url with {}", url);
            config.api.base_url = url.clone();
        }
    }
}
