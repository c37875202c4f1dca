//! # Conversation Session
//!
//! File: cli/src/chatbot/session.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A `ChatSession` is one user's conversation: a bounded history of turns
//! plus the reply style they picked. Sessions live in memory only and are
//! dropped when the conversation ends.
//!
//! `ConversationHistory` keeps at most `capacity` turns; appending to a full
//! history evicts the oldest turn. Turns are immutable once appended, which
//! is what makes pronoun resolution ("how much is he worth?") predictable.
//!
use super::types::{Classification, Entities, EntityRole, Intent, ResponseStyle};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// One exchange: what the user said, how it was understood, what was replied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    utterance: String,
    intent: Intent,
    entities: Entities,
    reply: String,
    timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(utterance: &str, classification: Classification, reply: &str) -> Self {
        Self {
            utterance: utterance.to_string(),
            intent: classification.intent,
            entities: classification.entities,
            reply: reply.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn utterance(&self) -> &str {
        &self.utterance
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn entity(&self, role: EntityRole) -> Option<&str> {
        self.entities.get(&role).map(String::as_str)
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Fixed-capacity FIFO of turns, oldest at the front.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationHistory {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, turn: Turn) {
        while self.turns.len() >= self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// Most recent value recorded for `role`, scanning newest turn first.
    pub fn last_entity_for(&self, role: EntityRole) -> Option<&str> {
        self.turns.iter().rev().find_map(|turn| turn.entity(role))
    }

    /// The newest `min(k, len)` turns, oldest first.
    pub fn recent_turns(&self, k: usize) -> Vec<&Turn> {
        let skip = self.turns.len().saturating_sub(k);
        self.turns.iter().skip(skip).collect()
    }

    /// Up to `n` distinct values (case-insensitive) found under any of
    /// `roles`, newest turn first. Within a turn, `roles` order is kept.
    pub fn recent_values(&self, roles: &[EntityRole], n: usize) -> Vec<&str> {
        let mut found: Vec<&str> = Vec::new();
        for turn in self.turns.iter().rev() {
            for role in roles {
                if found.len() >= n {
                    return found;
                }
                if let Some(value) = turn.entity(*role) {
                    if !found.iter().any(|v| v.eq_ignore_ascii_case(value)) {
                        found.push(value);
                    }
                }
            }
        }
        found.truncate(n);
        found
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// Per-conversation state. Created when a conversation starts, never persisted.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub history: ConversationHistory,
    pub style: ResponseStyle,
}

impl ChatSession {
    pub fn new(history_limit: usize, style: ResponseStyle) -> Self {
        Self {
            history: ConversationHistory::new(history_limit),
            style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(utterance: &str, intent: Intent, entities: &[(EntityRole, &str)]) -> Turn {
        let classification = Classification {
            intent,
            entities: entities
                .iter()
                .map(|(role, value)| (*role, value.to_string()))
                .collect(),
        };
        Turn::new(utterance, classification, "ok")
    }

    #[test]
    fn test_history_is_bounded_fifo() {
        let mut history = ConversationHistory::new(3);
        for i in 0..4 {
            history.append(turn(&format!("q{}", i), Intent::Unknown, &[]));
        }
        assert_eq!(history.len(), 3);
        let recent = history.recent_turns(4);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].utterance(), "q1");
        assert_eq!(recent[2].utterance(), "q3");
        assert_eq!(history.recent_turns(1)[0].utterance(), "q3");
        assert!(history.recent_turns(0).is_empty());
    }

    #[test]
    fn test_zero_capacity_raised_to_one() {
        let mut history = ConversationHistory::new(0);
        history.append(turn("a", Intent::Unknown, &[]));
        history.append(turn("b", Intent::Unknown, &[]));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.recent_turns(5)[0].utterance(), "b");
    }

    #[test]
    fn test_last_entity_for_prefers_newest() {
        let mut history = ConversationHistory::new(10);
        history.append(turn("a", Intent::PlayerInfo, &[(EntityRole::Player, "Lionel Messi")]));
        history.append(turn("b", Intent::TeamInfo, &[(EntityRole::Team, "Arsenal")]));
        history.append(turn("c", Intent::PlayerInfo, &[(EntityRole::Player, "Erling Haaland")]));

        assert_eq!(history.last_entity_for(EntityRole::Player), Some("Erling Haaland"));
        assert_eq!(history.last_entity_for(EntityRole::Team), Some("Arsenal"));
        assert_eq!(history.last_entity_for(EntityRole::Competition), None);
    }

    #[test]
    fn test_recent_values_distinct_across_roles() {
        let mut history = ConversationHistory::new(10);
        history.append(turn("a", Intent::PlayerInfo, &[(EntityRole::Player, "Lionel Messi")]));
        history.append(turn("b", Intent::PlayerInfo, &[(EntityRole::Player, "lionel messi")]));
        history.append(turn(
            "c",
            Intent::Compare,
            &[(EntityRole::Player1, "Kylian Mbappé"), (EntityRole::Player2, "Lionel Messi")],
        ));
        history.append(turn("d", Intent::PlayerInfo, &[(EntityRole::Player, "Cristiano Ronaldo")]));

        assert_eq!(
            history.recent_values(&EntityRole::PLAYERS, 2),
            vec!["Cristiano Ronaldo", "Kylian Mbappé"]
        );
        assert_eq!(history.recent_values(&EntityRole::PLAYERS, 5).len(), 3);
        assert!(history.recent_values(&EntityRole::TEAMS, 2).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut session = ChatSession::new(5, ResponseStyle::Professional);
        session.history.append(turn("a", Intent::Unknown, &[]));
        assert!(!session.history.is_empty());
        session.history.clear();
        assert!(session.history.is_empty());
        assert_eq!(session.style, ResponseStyle::Professional);
    }
}
