//! # Footbot Ask Command
//!
//! File: cli/src/commands/ask.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Answers a single question and exits. The reply goes to stdout, logs go to
//! stderr, so the output can be piped.
//!
//! ```bash
//! footbot ask Tell me about Lionel Messi
//! footbot ask --style professional "Premier League table"
//! footbot ask --json "Compare Messi and Ronaldo"
//! ```
//!
use super::ChatOptions;
use crate::chatbot::session::ChatSession;
use crate::chatbot::Chatbot;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::path::Path;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(about = "Ask a single football question and print the reply")]
pub struct AskArgs {
    /// The question, e.g. `Tell me about Lionel Messi`. Quoting is optional.
    #[arg(required = true, trailing_var_arg = true, value_name = "QUESTION")]
    utterance: Vec<String>,

    /// Print the reply, intent, entities and suggestions as JSON.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    options: ChatOptions,
}

pub async fn handle_ask(args: AskArgs, config_path: Option<&Path>) -> Result<()> {
    info!("Handling ask command...");
    debug!("Ask args: {:?}", args);

    let config = args.options.load_config(config_path)?;
    let bot = Chatbot::from_config(&config)?;
    let mut session = ChatSession::new(config.chat.history_limit, config.chat.default_style);

    let utterance = args.utterance.join(" ");
    let reply = bot.respond(&mut session, &utterance).await;

    if args.json {
        let json = serde_json::to_string_pretty(&reply).context("Failed to serialize reply")?;
        println!("{}", json);
    } else {
        println!("{}", reply.reply);
    }
    Ok(())
}
