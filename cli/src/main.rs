//! # Footbot Main Entry Point
//!
//! File: cli/src/main.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This file serves as the main entry point for the Footbot CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to appropriate command handlers
//!
//! ## Architecture
//!
//! - Each top-level command (`chat`, `ask`, `classify`, `serve`) is a variant in the `Commands` enum
//! - Commands are mapped to handler functions in `footbot::commands`
//! - All errors are propagated to this level for consistent handling
//!
//! ## Examples
//!
//! ```bash
//! # Start a conversation
//! footbot chat
//!
//! # One-shot question with a formal reply and info-level logs
//! footbot -v ask --style professional "Tell me about Real Madrid"
//!
//! # See how a question is understood
//! footbot classify "Compare Messi and Ronaldo"
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging based on verbosity level
//! 3. Route to appropriate command handler
//! 4. Format and display any errors that occur
//!
use clap::Parser;
use footbot::commands;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "footbot",
    about = "⚽ Footbot: football Q&A chatbot",
    long_about = "Ask about players, clubs, transfers and league tables.\n\
                  Data comes from the Transfermarkt API; replies are phrased by\n\
                  Gemini when GEMINI_API_KEY is set, by built-in templates otherwise.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Extra configuration file, applied over the user and project files.
    #[arg(long, global = true, env = "FOOTBOT_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Enum defining all available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    #[command(alias = "c")]
    Chat(commands::chat::ChatArgs),
    #[command(alias = "a")]
    Ask(commands::ask::AskArgs),
    Classify(commands::classify::ClassifyArgs),
    #[command(alias = "s")]
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let config_path = cli.config.as_deref();
    let command_result = match cli.command {
        Commands::Chat(args) => commands::chat::handle_chat(args, config_path).await,
        Commands::Ask(args) => commands::ask::handle_ask(args, config_path).await,
        Commands::Classify(args) => commands::classify::handle_classify(args, config_path).await,
        Commands::Serve(args) => commands::serve::handle_serve(args, config_path).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    fn footbot_cmd() -> Command {
        Command::cargo_bin("footbot").expect("Failed to find footbot binary for testing")
    }
    #[test]
    fn test_main_help_flag() {
        footbot_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("classify"));
    }
    #[test]
    fn test_main_version_flag() {
        footbot_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}
