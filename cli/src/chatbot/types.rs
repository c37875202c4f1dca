//! # Footbot Chat Domain Types
//!
//! File: cli/src/chatbot/types.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The small vocabulary shared by every stage of the chat pipeline:
//! - `Intent`: the closed set of things a user can ask for.
//! - `EntityRole` / `Entities`: the named spans pulled out of an utterance.
//! - `Classification`: what the intent extractor returns.
//! - `ResponseStyle`: the per-session tone of replies.
//! - `NameFallback`: the player-vs-team tie-break for unrecognized names.
//!
//! The API outcome types (`ApiFailure`, `ApiResult`) live next to the API
//! client and are re-exported here so the chat modules can import everything
//! from one place.
//!
use crate::core::error::FootbotError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use crate::common::transfermarkt::{ApiFailure, ApiResult};

/// What the user is asking for. Exactly one per utterance; `Unknown` is the
/// fallback whenever nothing else applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    PlayerInfo,
    TeamInfo,
    TransferHistory,
    LeagueTable,
    Compare,
    Unknown,
}

impl Intent {
    /// Every intent, in declaration order.
    pub const ALL: [Intent; 6] = [
        Intent::PlayerInfo,
        Intent::TeamInfo,
        Intent::TransferHistory,
        Intent::LeagueTable,
        Intent::Compare,
        Intent::Unknown,
    ];

    /// Stable machine name (`player_info`, `league_table`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::PlayerInfo => "player_info",
            Intent::TeamInfo => "team_info",
            Intent::TransferHistory => "transfer_history",
            Intent::LeagueTable => "league_table",
            Intent::Compare => "compare",
            Intent::Unknown => "unknown",
        }
    }

    /// The entity role that must be present before the API can be queried.
    /// `Compare` needs a pair and is checked separately.
    pub fn required_role(&self) -> Option<EntityRole> {
        match self {
            Intent::PlayerInfo | Intent::TransferHistory => Some(EntityRole::Player),
            Intent::TeamInfo => Some(EntityRole::Team),
            Intent::LeagueTable => Some(EntityRole::Competition),
            Intent::Compare | Intent::Unknown => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role a named span plays in an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityRole {
    Player,
    Team,
    Competition,
    Player1,
    Player2,
    Team1,
    Team2,
}

impl EntityRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityRole::Player => "player",
            EntityRole::Team => "team",
            EntityRole::Competition => "competition",
            EntityRole::Player1 => "player1",
            EntityRole::Player2 => "player2",
            EntityRole::Team1 => "team1",
            EntityRole::Team2 => "team2",
        }
    }

    /// Roles that name a player, single or as part of a comparison.
    pub const PLAYERS: [EntityRole; 3] =
        [EntityRole::Player, EntityRole::Player1, EntityRole::Player2];

    /// Roles that name a club, single or as part of a comparison.
    pub const TEAMS: [EntityRole; 3] = [EntityRole::Team, EntityRole::Team1, EntityRole::Team2];
}

impl fmt::Display for EntityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity role → surface string. A `BTreeMap` keeps iteration (and therefore
/// prompts, logs and JSON output) deterministic.
pub type Entities = BTreeMap<EntityRole, String>;

/// Result of classifying one utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub intent: Intent,
    pub entities: Entities,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            entities: Entities::new(),
        }
    }

    pub fn entity(&self, role: EntityRole) -> Option<&str> {
        self.entities.get(&role).map(String::as_str)
    }

    /// The two names being compared, players first, then teams.
    pub fn comparison_pair(&self) -> Option<(EntityRole, &str, &str)> {
        if let (Some(a), Some(b)) = (self.entity(EntityRole::Player1), self.entity(EntityRole::Player2)) {
            return Some((EntityRole::Player, a, b));
        }
        if let (Some(a), Some(b)) = (self.entity(EntityRole::Team1), self.entity(EntityRole::Team2)) {
            return Some((EntityRole::Team, a, b));
        }
        None
    }
}

/// Tone and verbosity of replies. Chosen per session, never persisted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStyle {
    /// Short and friendly, with emoji.
    #[default]
    Casual,
    /// Formal labelled lines, no emoji.
    Professional,
    /// Everything the payload offers, including extra numeric fields.
    Detailed,
}

impl ResponseStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStyle::Casual => "casual",
            ResponseStyle::Professional => "professional",
            ResponseStyle::Detailed => "detailed",
        }
    }
}

impl fmt::Display for ResponseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseStyle {
    type Err = FootbotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "casual" => Ok(ResponseStyle::Casual),
            "professional" => Ok(ResponseStyle::Professional),
            "detailed" => Ok(ResponseStyle::Detailed),
            other => Err(FootbotError::UnknownStyle(other.to_string())),
        }
    }
}

/// What an unrecognized proper noun is assumed to be when no cue word says
/// otherwise. Ambiguous names ("Santos", "Chelsea" as a first name) will be
/// wrong either way; the choice is configurable rather than clever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameFallback {
    #[default]
    Player,
    Team,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_parses_case_insensitively() {
        assert_eq!("Casual".parse::<ResponseStyle>().unwrap(), ResponseStyle::Casual);
        assert_eq!(
            " PROFESSIONAL ".parse::<ResponseStyle>().unwrap(),
            ResponseStyle::Professional
        );
        assert!("shouty".parse::<ResponseStyle>().is_err());
    }

    #[test]
    fn intent_serializes_snake_case() {
        let json = serde_json::to_string(&Intent::TransferHistory).unwrap();
        assert_eq!(json, "\"transfer_history\"");
        for intent in Intent::ALL {
            assert_eq!(
                serde_json::to_string(&intent).unwrap(),
                format!("\"{}\"", intent.as_str())
            );
        }
    }

    #[test]
    fn comparison_pair_prefers_players() {
        let mut c = Classification::unknown();
        c.intent = Intent::Compare;
        c.entities.insert(EntityRole::Player1, "Messi".into());
        c.entities.insert(EntityRole::Player2, "Ronaldo".into());
        assert_eq!(
            c.comparison_pair(),
            Some((EntityRole::Player, "Messi", "Ronaldo"))
        );
    }
}
