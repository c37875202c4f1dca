//! # Payload Facts
//!
//! File: cli/src/chatbot/facts.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Typed summaries of the JSON returned by the statistics API. The composer
//! renders replies from these summaries, and the prompt for the language
//! model is built from their `facts()` instead of the raw payload.
//!
//! The API is not consistent about field names or shapes (`club` may be a
//! string or an object, `position` may be a string or `{ "main": ... }`,
//! numbers sometimes arrive as strings), so every reader here is lenient and
//! every field except the name is optional.
//!
use super::format::{market_value, position_name};
use serde_json::Value;

/// Detailed replies list at most this many transfer rows.
pub const MAX_TRANSFER_ROWS: usize = 10;

/// One labelled fact for the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub label: &'static str,
    pub value: String,
}

fn fact(label: &'static str, value: &Option<String>) -> Option<Fact> {
    value.as_ref().map(|v| Fact {
        label,
        value: v.clone(),
    })
}

/// Reads the first non-empty field among `paths` (dot-separated) as text.
/// Objects contribute their `name` (or `main`) member; arrays are joined
/// with commas.
pub fn text_at(value: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| {
        let found = path
            .split('.')
            .try_fold(value, |current, key| current.get(key))?;
        as_text(found)
    })
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty() && s != "-").then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("main"))
            .and_then(as_text),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(as_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Null => None,
    }
}

/// Reads the first numeric field among `paths`; numeric strings are accepted.
pub fn number_at(value: &Value, paths: &[&str]) -> Option<i64> {
    paths.iter().find_map(|path| {
        let found = path
            .split('.')
            .try_fold(value, |current, key| current.get(key))?;
        match found {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().trim_start_matches('+').parse().ok(),
            _ => None,
        }
    })
}

fn value_at<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths.iter().find_map(|path| {
        path.split('.')
            .try_fold(value, |current, key| current.get(key))
            .filter(|v| !v.is_null())
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    pub name: String,
    pub age: Option<String>,
    pub position: Option<String>,
    pub club: Option<String>,
    pub nationality: Option<String>,
    pub market_value: Option<String>,
    pub height: Option<String>,
    pub foot: Option<String>,
    pub shirt_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub joined: Option<String>,
    pub contract_expires: Option<String>,
}

impl PlayerSummary {
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            name: text_at(value, &["name", "fullName"])?,
            age: text_at(value, &["age"]),
            position: text_at(value, &["position.main", "position"]).map(|p| position_name(&p)),
            club: text_at(value, &["club.name", "club", "currentClub"]),
            nationality: text_at(value, &["nationality", "citizenship", "nationalities"]),
            market_value: value_at(value, &["marketValue", "market_value"]).and_then(market_value),
            height: number_at(value, &["height"]).map(|cm| format!("{} cm", cm)),
            foot: text_at(value, &["foot"]),
            shirt_number: text_at(value, &["shirtNumber"]).map(|n| n.trim_start_matches('#').to_string()),
            date_of_birth: text_at(value, &["dateOfBirth"]),
            joined: text_at(value, &["club.joined"]),
            contract_expires: text_at(value, &["club.contractExpires", "contractExpires"]),
        })
    }

    pub fn facts(&self) -> Vec<Fact> {
        [
            Some(Fact {
                label: "Name",
                value: self.name.clone(),
            }),
            fact("Age", &self.age),
            fact("Position", &self.position),
            fact("Club", &self.club),
            fact("Nationality", &self.nationality),
            fact("Market value", &self.market_value),
            fact("Height", &self.height),
            fact("Preferred foot", &self.foot),
            fact("Shirt number", &self.shirt_number),
            fact("Date of birth", &self.date_of_birth),
            fact("Joined club", &self.joined),
            fact("Contract expires", &self.contract_expires),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubSummary {
    pub name: String,
    pub league: Option<String>,
    pub country: Option<String>,
    pub founded: Option<String>,
    pub stadium: Option<String>,
    pub stadium_seats: Option<String>,
    pub squad_size: Option<String>,
    pub average_age: Option<String>,
    pub market_value: Option<String>,
    /// `"Name (Position)"` for each squad member, when the squad was fetched.
    pub players: Vec<String>,
}

/// Replies and prompts list at most this many squad members.
pub const MAX_SQUAD_ROWS: usize = 30;

fn squad_member(value: &Value) -> Option<String> {
    let name = text_at(value, &["name"])?;
    Some(match text_at(value, &["position", "positions.main"]) {
        Some(position) => format!("{} ({})", name, position_name(&position)),
        None => name,
    })
}

impl ClubSummary {
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            name: text_at(value, &["name", "officialName"])?,
            league: text_at(value, &["league.name", "league"]),
            country: text_at(value, &["league.countryName", "country"]),
            founded: text_at(value, &["foundedOn", "founded"]),
            stadium: text_at(value, &["stadiumName", "stadium"]),
            stadium_seats: text_at(value, &["stadiumSeats"]),
            squad_size: text_at(value, &["squad.size", "squad"]),
            average_age: text_at(value, &["squad.averageAge"]),
            market_value: value_at(value, &["currentMarketValue", "marketValue"])
                .and_then(market_value),
            players: value
                .get("players")
                .and_then(Value::as_array)
                .map(|list| list.iter().filter_map(squad_member).collect())
                .unwrap_or_default(),
        })
    }

    pub fn facts(&self) -> Vec<Fact> {
        let squad = (!self.players.is_empty()).then(|| Fact {
            label: "Squad players",
            value: self
                .players
                .iter()
                .take(MAX_SQUAD_ROWS)
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        });
        [
            Some(Fact {
                label: "Club",
                value: self.name.clone(),
            }),
            fact("League", &self.league),
            fact("Country", &self.country),
            fact("Founded", &self.founded),
            fact("Stadium", &self.stadium),
            fact("Stadium capacity", &self.stadium_seats),
            fact("Squad size", &self.squad_size),
            fact("Average age", &self.average_age),
            fact("Squad market value", &self.market_value),
            squad,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRow {
    pub from: String,
    pub to: String,
    pub date: Option<String>,
    pub season: Option<String>,
    pub fee: Option<String>,
}

impl TransferRow {
    fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            from: text_at(value, &["clubFrom.name", "from.name", "from", "clubFrom"])?,
            to: text_at(value, &["clubTo.name", "to.name", "to", "clubTo"])?,
            date: text_at(value, &["date"]),
            season: text_at(value, &["season"]),
            fee: value_at(value, &["fee"]).and_then(|fee| match fee {
                Value::Number(_) => market_value(fee),
                other => as_text(other),
            }),
        })
    }

    /// `Barcelona → Paris Saint-Germain (2021-08-10)`
    pub fn line(&self) -> String {
        match &self.date {
            Some(date) => format!("{} → {} ({})", self.from, self.to, date),
            None => format!("{} → {}", self.from, self.to),
        }
    }
}

/// `{"player": name, "transfers": [...]}` as assembled by the fetch plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    pub player: String,
    /// Most recent first.
    pub rows: Vec<TransferRow>,
}

impl TransferSummary {
    pub fn from_value(value: &Value) -> Option<Self> {
        let player = text_at(value, &["player", "name"])?;
        let rows = value
            .get("transfers")?
            .as_array()?
            .iter()
            .filter_map(TransferRow::from_value)
            .collect();
        Some(Self { player, rows })
    }

    pub fn facts(&self) -> Vec<Fact> {
        let mut facts = vec![
            Fact {
                label: "Player",
                value: self.player.clone(),
            },
            Fact {
                label: "Transfers on record",
                value: self.rows.len().to_string(),
            },
        ];
        facts.extend(self.rows.iter().take(MAX_TRANSFER_ROWS).map(|row| Fact {
            label: "Transfer",
            value: match &row.fee {
                Some(fee) => format!("{}, fee {}", row.line(), fee),
                None => row.line(),
            },
        }));
        facts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub position: i64,
    pub club: String,
    pub points: Option<i64>,
    pub played: Option<i64>,
    pub goal_difference: Option<i64>,
}

impl TableRow {
    fn from_value(value: &Value, index: usize) -> Option<Self> {
        Some(Self {
            position: number_at(value, &["position", "rank"]).unwrap_or(index as i64 + 1),
            club: text_at(value, &["club.name", "clubName", "club", "name"])?,
            points: number_at(value, &["points"]),
            played: number_at(value, &["matches", "played"]),
            goal_difference: number_at(value, &["goalDifference"]),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsSummary {
    pub competition: Option<String>,
    pub rows: Vec<TableRow>,
}

impl StandingsSummary {
    pub fn from_value(value: &Value) -> Option<Self> {
        let rows = match value {
            Value::Array(items) => items,
            _ => ["table", "standings", "clubs"]
                .iter()
                .find_map(|key| value.get(*key)?.as_array())?,
        };
        let rows: Vec<TableRow> = rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| TableRow::from_value(row, i))
            .collect();
        if rows.is_empty() {
            return None;
        }
        Some(Self {
            competition: text_at(value, &["competition", "name"]),
            rows,
        })
    }

    pub fn facts(&self) -> Vec<Fact> {
        let mut facts = Vec::new();
        if let Some(name) = &self.competition {
            facts.push(Fact {
                label: "Competition",
                value: name.clone(),
            });
        }
        facts.extend(self.rows.iter().take(MAX_TRANSFER_ROWS).map(|row| Fact {
            label: "Position",
            value: match row.points {
                Some(points) => format!("{}. {} ({} pts)", row.position, row.club, points),
                None => format!("{}. {}", row.position, row.club),
            },
        }));
        facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_player_summary_from_profile() {
        let payload = json!({
            "id": "28003",
            "name": "Lionel Messi",
            "age": "37",
            "height": 170,
            "position": {"main": "Right Winger", "other": ["Centre-Forward"]},
            "club": {"id": "69261", "name": "Inter Miami CF", "contractExpires": "2025-12-31"},
            "citizenship": ["Argentina", "Spain"],
            "marketValue": 18000000,
            "shirtNumber": "#10"
        });
        let player = PlayerSummary::from_value(&payload).unwrap();
        assert_eq!(player.name, "Lionel Messi");
        assert_eq!(player.age.as_deref(), Some("37"));
        assert_eq!(player.position.as_deref(), Some("Right Winger"));
        assert_eq!(player.club.as_deref(), Some("Inter Miami CF"));
        assert_eq!(player.nationality.as_deref(), Some("Argentina, Spain"));
        assert_eq!(player.market_value.as_deref(), Some("€18.00m"));
        assert_eq!(player.height.as_deref(), Some("170 cm"));
        assert_eq!(player.shirt_number.as_deref(), Some("10"));
        assert_eq!(player.contract_expires.as_deref(), Some("2025-12-31"));
        assert!(player.facts().iter().any(|f| f.label == "Club"));
    }

    #[test]
    fn test_player_summary_lenient_shapes() {
        let payload = json!({"name": "Erling Haaland", "club": "Manchester City", "position": "cf"});
        let player = PlayerSummary::from_value(&payload).unwrap();
        assert_eq!(player.club.as_deref(), Some("Manchester City"));
        assert_eq!(player.position.as_deref(), Some("Centre-Forward"));
        assert_eq!(player.age, None);
        assert!(PlayerSummary::from_value(&json!({"id": "1"})).is_none());
    }

    #[test]
    fn test_club_summary() {
        let payload = json!({
            "name": "Real Madrid",
            "league": {"name": "LaLiga", "countryName": "Spain"},
            "foundedOn": "1902-03-06",
            "stadiumName": "Santiago Bernabéu",
            "stadiumSeats": 83186,
            "squad": {"size": 25, "averageAge": 26.4},
            "currentMarketValue": 1360000000
        });
        let club = ClubSummary::from_value(&payload).unwrap();
        assert_eq!(club.league.as_deref(), Some("LaLiga"));
        assert_eq!(club.stadium.as_deref(), Some("Santiago Bernabéu"));
        assert_eq!(club.stadium_seats.as_deref(), Some("83186"));
        assert_eq!(club.squad_size.as_deref(), Some("25"));
        assert_eq!(club.market_value.as_deref(), Some("€1360.00m"));
        assert!(club.players.is_empty());
        assert!(!club.facts().iter().any(|f| f.label == "Squad players"));
    }

    #[test]
    fn test_club_summary_with_squad() {
        let payload = json!({
            "name": "Arsenal",
            "players": [
                {"id": "433177", "name": "Bukayo Saka", "position": "Right Winger"},
                {"id": "316264", "name": "Martin Ødegaard", "position": "am"},
                {"id": "0", "name": "Trialist"},
                {"id": "1"}
            ]
        });
        let club = ClubSummary::from_value(&payload).unwrap();
        assert_eq!(
            club.players,
            vec![
                "Bukayo Saka (Right Winger)".to_string(),
                "Martin Ødegaard (Attacking Midfield)".to_string(),
                "Trialist".to_string(),
            ]
        );
        let squad = club.facts().into_iter().find(|f| f.label == "Squad players").unwrap();
        assert!(squad.value.starts_with("Bukayo Saka (Right Winger), Martin Ødegaard"));
    }

    #[test]
    fn test_transfer_summary() {
        let payload = json!({
            "player": "Lionel Messi",
            "transfers": [
                {"clubFrom": {"name": "Paris SG"}, "clubTo": {"name": "Inter Miami"}, "date": "2023-07-15", "fee": "free transfer"},
                {"clubFrom": {"name": "Barcelona"}, "clubTo": {"name": "Paris SG"}, "date": "2021-08-10"},
                {"clubFrom": {"name": "Nowhere"}}
            ]
        });
        let summary = TransferSummary::from_value(&payload).unwrap();
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.rows[0].line(), "Paris SG → Inter Miami (2023-07-15)");
        assert_eq!(summary.rows[0].fee.as_deref(), Some("free transfer"));
        assert_eq!(summary.facts()[1].value, "2");
    }

    #[test]
    fn test_standings_summary() {
        let payload = json!({
            "competition": "Premier League",
            "table": [
                {"position": 1, "club": {"name": "Liverpool"}, "points": 84, "matches": 38, "goalDifference": 45},
                {"clubName": "Arsenal", "points": "74"}
            ]
        });
        let table = StandingsSummary::from_value(&payload).unwrap();
        assert_eq!(table.competition.as_deref(), Some("Premier League"));
        assert_eq!(table.rows[0].goal_difference, Some(45));
        assert_eq!(table.rows[1].position, 2);
        assert_eq!(table.rows[1].points, Some(74));
        assert!(StandingsSummary::from_value(&json!({"table": []})).is_none());
    }
}
