//! Follow-up prompts offered after a reply.

use super::types::{Entities, EntityRole, Intent};

/// Never more than this many suggestions are returned.
pub const MAX_SUGGESTIONS: usize = 3;

const DEFAULT_SUGGESTIONS: [&str; 3] = [
    "Tell me about Messi",
    "Real Madrid info",
    "Premier League table",
];

/// Up to three prompts that continue the conversation about the entity just
/// discussed, or generic starters when there is none.
pub fn quick_replies(intent: Intent, entities: &Entities) -> Vec<String> {
    let named = |role: EntityRole| entities.get(&role).map(String::as_str);

    let replies: Vec<String> = match intent {
        Intent::PlayerInfo | Intent::TransferHistory => match named(EntityRole::Player) {
            Some(player) => vec![
                format!("{} stats", player),
                format!("{} transfers", player),
                format!("How much is {} worth?", player),
            ],
            None => Vec::new(),
        },
        Intent::TeamInfo => match named(EntityRole::Team) {
            Some(team) => vec![
                format!("{} squad", team),
                format!("{} recent transfers", team),
                format!("{} league position", team),
            ],
            None => Vec::new(),
        },
        Intent::Compare => [EntityRole::Player1, EntityRole::Player2, EntityRole::Team1, EntityRole::Team2]
            .into_iter()
            .filter_map(named)
            .map(|name| format!("Tell me about {}", name))
            .collect(),
        Intent::LeagueTable => match named(EntityRole::Competition) {
            Some(competition) => vec![
                format!("{} table", competition),
                "Compare Messi and Ronaldo".to_string(),
            ],
            None => Vec::new(),
        },
        Intent::Unknown => Vec::new(),
    };

    let mut replies = if replies.is_empty() {
        DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
    } else {
        replies
    };
    replies.truncate(MAX_SUGGESTIONS);
    replies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_suggestions() {
        let entities = Entities::from([(EntityRole::Player, "Lionel Messi".to_string())]);
        assert_eq!(
            quick_replies(Intent::PlayerInfo, &entities),
            vec![
                "Lionel Messi stats",
                "Lionel Messi transfers",
                "How much is Lionel Messi worth?"
            ]
        );
    }

    #[test]
    fn test_team_suggestions() {
        let entities = Entities::from([(EntityRole::Team, "Arsenal".to_string())]);
        let replies = quick_replies(Intent::TeamInfo, &entities);
        assert_eq!(replies[0], "Arsenal squad");
        assert_eq!(replies.len(), 3);
    }

    #[test]
    fn test_defaults_when_nothing_named() {
        assert_eq!(
            quick_replies(Intent::Unknown, &Entities::new()),
            DEFAULT_SUGGESTIONS.to_vec()
        );
        assert_eq!(
            quick_replies(Intent::PlayerInfo, &Entities::new()),
            DEFAULT_SUGGESTIONS.to_vec()
        );
    }

    #[test]
    fn test_compare_suggests_each_side() {
        let entities = Entities::from([
            (EntityRole::Player1, "Messi".to_string()),
            (EntityRole::Player2, "Ronaldo".to_string()),
        ]);
        assert_eq!(
            quick_replies(Intent::Compare, &entities),
            vec!["Tell me about Messi", "Tell me about Ronaldo"]
        );
    }

    #[test]
    fn test_never_more_than_three() {
        for intent in Intent::ALL {
            assert!(quick_replies(intent, &Entities::new()).len() <= MAX_SUGGESTIONS);
        }
    }
}
