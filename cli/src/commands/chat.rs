//! # Footbot Chat Command
//!
//! File: cli/src/commands/chat.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Runs an interactive conversation in the terminal. One `ChatSession` lives
//! for the whole run, so follow-up questions ("how much is he worth?",
//! "compare them") resolve against earlier turns.
//!
//! ## Meta Commands
//!
//! Lines starting with `/` are handled locally and never reach the chat
//! engine:
//!
//! - `/style <casual|professional|detailed>`: change the reply style.
//! - `/history`: list the remembered turns.
//! - `/clear`: forget the history and empty the API response cache.
//! - `/stats`: turns remembered, cache size and LLM status.
//! - `/help`: list these commands.
//!
//! `bye`, `quit`, `exit` (or end of input) leave the session.
//!
use super::ChatOptions;
use crate::chatbot::format::truncate;
use crate::chatbot::session::ChatSession;
use crate::chatbot::types::ResponseStyle;
use crate::chatbot::Chatbot;
use crate::common::llm::GeminiClient;
use crate::common::transfermarkt::TransfermarktClient;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(about = "Chat about football players, clubs, transfers and league tables")]
pub struct ChatArgs {
    /// Hide the suggested follow-up questions after each reply.
    #[arg(long)]
    no_suggestions: bool,

    #[command(flatten)]
    options: ChatOptions,
}

/// A line the REPL handles itself.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MetaCommand {
    Style(Option<String>),
    History,
    Clear,
    Stats,
    Help,
    Quit,
    Unrecognized(String),
}

fn parse_meta(line: &str) -> Option<MetaCommand> {
    let line = line.trim();
    if matches!(line.to_lowercase().as_str(), "bye" | "quit" | "exit") {
        return Some(MetaCommand::Quit);
    }
    let rest = line.strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let command = parts.next().unwrap_or_default().to_lowercase();
    Some(match command.as_str() {
        "style" => MetaCommand::Style(parts.next().map(str::to_string)),
        "history" => MetaCommand::History,
        "clear" => MetaCommand::Clear,
        "stats" => MetaCommand::Stats,
        "help" | "?" => MetaCommand::Help,
        "quit" | "exit" | "bye" => MetaCommand::Quit,
        _ => MetaCommand::Unrecognized(line.to_string()),
    })
}

const META_HELP: &str = "Commands:\n  \
    /style <casual|professional|detailed>  change the reply style\n  \
    /history                               show remembered turns\n  \
    /clear                                 forget history and cached data\n  \
    /stats                                 session and cache statistics\n  \
    /help                                  show this help\n  \
    bye | quit | exit                      leave";

pub async fn handle_chat(args: ChatArgs, config_path: Option<&Path>) -> Result<()> {
    info!("Handling chat command...");
    debug!("Chat args: {:?}", args);

    let config = args.options.load_config(config_path)?;
    let bot = Chatbot::from_config(&config)?;
    let mut session = ChatSession::new(config.chat.history_limit, config.chat.default_style);
    let name = config.chat.bot_name.as_str();

    println!("⚽ {}: ask me about players, clubs, transfers and league tables.", name);
    println!(
        "Style: {}. Type /help for commands, 'bye' to quit.\n",
        session.style
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_meta(line) {
            Some(MetaCommand::Quit) => {
                println!("{}: Goodbye! ⚽", name);
                break;
            }
            Some(meta) => run_meta(meta, &bot, &mut session),
            None => {
                let reply = bot.respond(&mut session, line).await;
                println!("\n{}: {}\n", name, reply.reply);
                if !args.no_suggestions && !reply.suggestions.is_empty() {
                    println!("Try: {}\n", reply.suggestions.join(" | "));
                }
            }
        }
    }
    info!("Chat session ended after {} remembered turns", session.history.len());
    Ok(())
}

fn run_meta(
    meta: MetaCommand,
    bot: &Chatbot<TransfermarktClient, GeminiClient>,
    session: &mut ChatSession,
) {
    match meta {
        MetaCommand::Style(Some(value)) => match value.parse::<ResponseStyle>() {
            Ok(style) => {
                session.style = style;
                println!("Style set to {}.", style);
            }
            Err(e) => println!("{}", e),
        },
        MetaCommand::Style(None) => println!(
            "Current style: {}. Use /style <casual|professional|detailed>.",
            session.style
        ),
        MetaCommand::History => {
            if session.history.is_empty() {
                println!("No conversation yet.");
            }
            for turn in session.history.recent_turns(session.history.capacity()) {
                println!(
                    "[{}] {} ({}) -> {}",
                    turn.timestamp().format("%H:%M:%S"),
                    turn.utterance(),
                    turn.intent(),
                    truncate(turn.reply(), 60)
                );
            }
        }
        MetaCommand::Clear => {
            session.history.clear();
            bot.api().clear_cache();
            println!("Conversation history and cached data cleared.");
        }
        MetaCommand::Stats => {
            let cache = bot.api().cache_stats();
            println!(
                "Turns remembered: {}/{}\nCached API responses: {}/{} (ttl {}s)\nLanguage model: {}",
                session.history.len(),
                session.history.capacity(),
                cache.cached_items,
                cache.capacity,
                cache.ttl_secs,
                if bot.has_llm() { "on" } else { "off (templates)" }
            );
        }
        MetaCommand::Help => println!("{}", META_HELP),
        MetaCommand::Unrecognized(line) => {
            println!("Unknown command '{}'. Type /help for commands.", line)
        }
        MetaCommand::Quit => {}
    }
}
