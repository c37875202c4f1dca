//! # Footbot Classify Command
//!
//! File: cli/src/commands/classify.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Prints the intent and entities extracted from an utterance without calling
//! any API. Useful for checking how a phrasing is understood, and for tuning
//! `chat.extra_teams` / `chat.unknown_name_fallback`.
//!
//! ```bash
//! $ footbot classify Compare Messi and Ronaldo
//! intent: compare
//! player1: Messi
//! player2: Ronaldo
//! ```
//!
use crate::chatbot::intent::IntentExtractor;
use crate::chatbot::session::ConversationHistory;
use crate::chatbot::types::Classification;
use crate::core::config;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::path::Path;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(about = "Show the intent and entities extracted from a question")]
pub struct ClassifyArgs {
    /// The utterance to classify. Quoting is optional.
    #[arg(required = true, trailing_var_arg = true, value_name = "UTTERANCE")]
    utterance: Vec<String>,

    /// Print the classification as JSON.
    #[arg(long)]
    json: bool,
}

pub async fn handle_classify(args: ClassifyArgs, config_path: Option<&Path>) -> Result<()> {
    debug!("Classify args: {:?}", args);
    let config = config::load_config(config_path)?;
    let extractor = IntentExtractor::new(&config.chat)?;

    let utterance = args.utterance.join(" ");
    let classification = extractor.classify(&utterance, &ConversationHistory::new(1));

    if args.json {
        let json = serde_json::to_string(&classification)
            .context("Failed to serialize classification")?;
        println!("{}", json);
    } else {
        print!("{}", render(&classification));
    }
    Ok(())
}

/// `intent: <name>` followed by one `role: value` line per entity.
fn render(classification: &Classification) -> String {
    let mut out = format!("intent: {}\n", classification.intent);
    for (role, value) in &classification.entities {
        out.push_str(&format!("{}: {}\n", role, value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatbot::types::{EntityRole, Intent};

    #[test]
    fn test_render_lists_entities_in_role_order() {
        let mut classification = Classification::unknown();
        classification.intent = Intent::Compare;
        classification
            .entities
            .insert(EntityRole::Player2, "Ronaldo".into());
        classification
            .entities
            .insert(EntityRole::Player1, "Messi".into());

        assert_eq!(
            render(&classification),
            "intent: compare\nplayer1: Messi\nplayer2: Ronaldo\n"
        );
    }

    #[test]
    fn test_render_unknown() {
        assert_eq!(render(&Classification::unknown()), "intent: unknown\n");
    }
}
