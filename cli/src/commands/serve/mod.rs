//! # Footbot HTTP Chat Server
//!
//! File: cli/src/commands/serve/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Exposes the chat engine as a small JSON API so a web front-end can hold
//! conversations. Every conversation gets its own in-memory session; sessions
//! are never persisted and disappear when the server stops.
//!
//! ## Endpoints
//!
//! - `POST /api/chat` with `{"session_id"?, "message", "style"?}` returns
//!   `{"session_id", "reply", "intent", "entities", "suggestions"}`. Omitting
//!   `session_id` starts a new conversation.
//! - `DELETE /api/sessions/{id}` ends a conversation. Conversations idle for
//!   longer than `--session-idle-secs` are also ended, and at most
//!   `--max-sessions` are kept (the least recently used goes first).
//! - `GET /health` reports liveness, session count and cache size.
//!
//! ## Examples
//!
//! ```bash
//! footbot serve --port 8080
//! curl -s localhost:8080/api/chat -H 'content-type: application/json' \
//!      -d '{"message": "Tell me about Lionel Messi"}'
//! ```
//!
use super::ChatOptions;
use crate::chatbot::Chatbot;
use crate::core::error::Result;
use clap::Parser;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Axum router, handlers and session store.
pub mod server_logic;

#[derive(Parser, Debug)]
#[command(about = "Serve the chatbot as a JSON API over HTTP")]
pub struct ServeArgs {
    /// Port to listen on. The next free port is used if it is taken.
    #[arg(long, short, default_value_t = 8080)]
    pub port: u16,

    /// Address to bind. Use `0.0.0.0` to accept connections from other machines.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Do not send CORS headers.
    #[arg(long)]
    pub no_cors: bool,

    /// End conversations that have been idle for this many seconds.
    #[arg(long, default_value_t = 1800, value_parser = clap::value_parser!(u64).range(1..))]
    pub session_idle_secs: u64,

    /// Most conversations kept in memory at once.
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_sessions: u64,

    #[command(flatten)]
    pub options: ChatOptions,
}

pub async fn handle_serve(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    info!("Handling serve command...");
    debug!("Serve args: {:?}", args);

    let config = args.options.load_config(config_path)?;
    let bot = Chatbot::from_config(&config)?;
    let settings = server_logic::ServerSettings {
        host: args.host,
        port: args.port,
        enable_cors: !args.no_cors,
        history_limit: config.chat.history_limit,
        default_style: config.chat.default_style,
        session_limits: server_logic::SessionLimits {
            idle_timeout: Duration::from_secs(args.session_idle_secs),
            max_sessions: usize::try_from(args.max_sessions).unwrap_or(usize::MAX),
        },
    };
    server_logic::run_server(bot, settings).await
}
