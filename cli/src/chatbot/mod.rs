//! # Footbot Chat Engine (`chatbot`)
//!
//! File: cli/src/chatbot/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The pipeline behind every reply, independent of how the user reaches it
//! (REPL, one-shot `ask`, or the HTTP server):
//!
//! 1. **Classify**: `IntentExtractor` turns the utterance (plus the session
//!    history, for pronouns and "compare them") into an `Intent` and its
//!    `Entities`.
//! 2. **Fetch**: the fetch plan for that intent runs against the
//!    `FootballApi`. Missing names skip the API entirely and ask for one.
//! 3. **Compose**: `Composer` phrases the `ApiResult`, through the language
//!    model when one is configured, through templates otherwise.
//! 4. **Record**: the turn is appended to the session history.
//!
//! `Chatbot::handle` always returns text. API and model failures become
//! replies, never errors.
//!
//! ## Architecture
//!
//! - `types`: intents, entity roles, styles.
//! - `lexicon`: static word lists.
//! - `intent`: the rule-table classifier.
//! - `session`: bounded conversation history.
//! - `facts` / `format`: payload readers and value formatting.
//! - `compose`: failure messages, templates and the LLM path.
//! - `suggest`: quick-reply prompts.
//!
//! ## Examples
//!
//! ```rust,ignore
//! let bot = Chatbot::from_config(&config)?;
//! let mut session = ChatSession::new(config.chat.history_limit, config.chat.default_style);
//! let reply = bot.handle(&mut session, "Tell me about Lionel Messi").await;
//! ```
//!
pub mod compose;
pub mod facts;
pub mod format;
pub mod intent;
pub mod lexicon;
pub mod session;
pub mod suggest;
pub mod types;

use crate::common::llm::{GeminiClient, LanguageModel};
use crate::common::transfermarkt::{id_of, merge_hit, FootballApi, TransfermarktClient};
use crate::core::config::Config;
use crate::core::error::Result;
use compose::{Composer, Phrasing};
use intent::IntentExtractor;
use serde::Serialize;
use serde_json::{json, Value};
use session::{ChatSession, ConversationHistory, Turn};
use std::time::Duration;
use tracing::{debug, info, warn};
use types::{ApiFailure, ApiResult, Classification, Entities, EntityRole, Intent};

/// Everything a caller may want to show for one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub intent: Intent,
    pub entities: Entities,
    pub suggestions: Vec<String>,
}

/// The chat engine. Shared read-only between sessions; all per-conversation
/// state lives in the `ChatSession` passed to each call.
pub struct Chatbot<A, L> {
    api: A,
    llm: Option<L>,
    extractor: IntentExtractor,
    composer: Composer,
}

impl Chatbot<TransfermarktClient, GeminiClient> {
    /// Builds the production engine. The language model is only attached
    /// when it is enabled and has a key.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = TransfermarktClient::new(&config.api)?;
        let llm = GeminiClient::from_config(&config.llm)?;
        match &llm {
            Some(model) => info!("Replies phrased by {}", model.name()),
            None => info!("No language model configured; using reply templates"),
        }
        Ok(Self::new(
            api,
            llm,
            IntentExtractor::new(&config.chat)?,
            Composer::new(Duration::from_secs(config.llm.timeout_secs)),
        ))
    }
}

impl<A: FootballApi, L: LanguageModel> Chatbot<A, L> {
    pub fn new(api: A, llm: Option<L>, extractor: IntentExtractor, composer: Composer) -> Self {
        Self {
            api,
            llm,
            extractor,
            composer,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Classification only; no API call, nothing recorded.
    pub fn classify(&self, utterance: &str, history: &ConversationHistory) -> Classification {
        self.extractor.classify(utterance, history)
    }

    /// Answers one utterance and records the turn in `session`.
    pub async fn handle(&self, session: &mut ChatSession, utterance: &str) -> String {
        self.respond(session, utterance).await.reply
    }

    /// Like `handle`, but also returns the classification and suggestions.
    pub async fn respond(&self, session: &mut ChatSession, utterance: &str) -> ChatReply {
        let classification = self.extractor.classify(utterance, &session.history);
        let Classification { intent, entities } = classification.clone();
        debug!("Classified as {} with entities {:?}", intent, entities);

        let style = session.style;
        let reply = match self.fetch(&classification, utterance).await {
            Some(result) => {
                let phrasing = Phrasing::select(self.llm.as_ref());
                self.composer
                    .compose(phrasing, utterance, intent, &entities, &result, style)
                    .await
            }
            None if intent == Intent::Unknown => Composer::fallback(style),
            None => Composer::clarify(intent, style),
        };

        info!(
            intent = %intent,
            style = %style,
            "Handled \"{}\" -> \"{}\"",
            format::truncate(utterance.trim(), 80),
            format::truncate(&reply, 100)
        );

        let suggestions = suggest::quick_replies(intent, &entities);
        session
            .history
            .append(Turn::new(utterance, classification, &reply));

        ChatReply {
            reply,
            intent,
            entities,
            suggestions,
        }
    }

    /// Runs the fetch plan for a classification. `None` when the intent needs
    /// a name that was not found (or needs no data at all).
    async fn fetch(&self, classification: &Classification, utterance: &str) -> Option<ApiResult> {
        let result = match classification.intent {
            Intent::PlayerInfo => {
                self.player_profile(classification.entity(EntityRole::Player)?)
                    .await
            }
            Intent::TeamInfo => {
                let team = classification.entity(EntityRole::Team)?;
                if intent::asks_for_squad(utterance) {
                    self.club_squad(team).await
                } else {
                    self.club_profile(team).await
                }
            }
            Intent::TransferHistory => {
                self.transfers(classification.entity(EntityRole::Player)?)
                    .await
            }
            Intent::LeagueTable => {
                self.api
                    .get_standings(classification.entity(EntityRole::Competition)?)
                    .await
            }
            Intent::Compare => {
                let (kind, left, right) = classification.comparison_pair()?;
                self.compare(kind, left, right).await
            }
            Intent::Unknown => return None,
        };
        Some(result)
    }

    async fn player_profile(&self, name: &str) -> ApiResult {
        let hit = self.api.search_player(name).await?;
        let id = hit_id(&hit, name)?;
        let profile = self.api.get_player_profile(&id).await?;
        Ok(merge_hit(profile, &hit))
    }

    async fn club_profile(&self, name: &str) -> ApiResult {
        let hit = self.api.search_club(name).await?;
        let id = hit_id(&hit, name)?;
        let profile = self.api.get_club_profile(&id).await?;
        Ok(merge_hit(profile, &hit))
    }

    /// Club profile with its `players` list. A failed squad lookup still
    /// returns the profile.
    async fn club_squad(&self, name: &str) -> ApiResult {
        let hit = self.api.search_club(name).await?;
        let id = hit_id(&hit, name)?;
        let (profile, players) = tokio::join!(
            self.api.get_club_profile(&id),
            self.api.get_club_players(&id)
        );
        let mut club = merge_hit(profile?, &hit);
        let players = match players {
            Ok(Value::Array(list)) => Value::Array(list),
            Ok(other) => other.get("players").cloned().unwrap_or_else(|| json!([])),
            Err(e) => {
                warn!("Squad for '{}' unavailable: {}", name, e);
                return Ok(club);
            }
        };
        if let Some(obj) = club.as_object_mut() {
            obj.insert("players".to_string(), players);
        }
        Ok(club)
    }

    async fn transfers(&self, name: &str) -> ApiResult {
        let hit = self.api.search_player(name).await?;
        let id = hit_id(&hit, name)?;
        let payload = self.api.get_transfers(&id).await?;
        let transfers = match payload {
            Value::Array(_) => payload,
            other => other.get("transfers").cloned().unwrap_or_else(|| json!([])),
        };
        let player = hit.get("name").and_then(Value::as_str).unwrap_or(name);
        Ok(json!({ "player": player, "transfers": transfers }))
    }

    async fn compare(&self, kind: EntityRole, left: &str, right: &str) -> ApiResult {
        let (left, right) = if kind == EntityRole::Team {
            tokio::join!(self.club_profile(left), self.club_profile(right))
        } else {
            tokio::join!(self.player_profile(left), self.player_profile(right))
        };
        Ok(json!([left?, right?]))
    }
}

fn hit_id(hit: &Value, name: &str) -> std::result::Result<String, ApiFailure> {
    id_of(hit).ok_or_else(|| ApiFailure::Malformed(format!("search hit for '{}' has no id", name)))
}
