//! # Response Composer
//!
//! File: cli/src/chatbot/compose.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Turns an `ApiResult` into the text shown to the user.
//!
//! - **Failure path**: every `ApiFailure` maps to a fixed, style-aware
//!   message. The language model is never consulted for failures.
//! - **Success path**: the `Phrasing` chosen by the caller decides whether a
//!   language model phrases the reply (`Phrasing::Llm`) or the built-in
//!   templates do (`Phrasing::Template`). A model that times out, fails or
//!   returns nothing falls back to the templates.
//! - **Templates**: deterministic, varied only by `ResponseStyle`. Casual
//!   replies are short and use emoji, professional replies are labelled lines
//!   without emoji, detailed replies add every numeric field available.
//!
//! `clarify` and `fallback` cover turns where no API call is made: a missing
//! name, and an utterance that could not be classified.
//!
use super::facts::{
    number_at, ClubSummary, Fact, PlayerSummary, StandingsSummary, TransferSummary,
    MAX_SQUAD_ROWS, MAX_TRANSFER_ROWS,
};
use super::format::join_list;
use super::types::{ApiFailure, ApiResult, Entities, EntityRole, Intent, ResponseStyle};
use crate::common::llm::{LanguageModel, LlmFailure};
use crate::core::error::Result;
use crate::core::templating::{self, PromptContext};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// How the success path is phrased for one reply.
#[derive(Debug)]
pub enum Phrasing<'a, L> {
    Llm(&'a L),
    Template,
}

impl<'a, L> Phrasing<'a, L> {
    /// `Llm` when a model is configured, otherwise `Template`.
    pub fn select(llm: Option<&'a L>) -> Self {
        match llm {
            Some(model) => Phrasing::Llm(model),
            None => Phrasing::Template,
        }
    }
}

// Derived Clone/Copy would require `L: Clone`.
impl<L> Clone for Phrasing<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for Phrasing<'_, L> {}

#[derive(Debug, Clone)]
pub struct Composer {
    llm_timeout: Duration,
}

impl Composer {
    pub fn new(llm_timeout: Duration) -> Self {
        Self { llm_timeout }
    }

    /// Produces the reply for one answered question.
    pub async fn compose<L: LanguageModel>(
        &self,
        phrasing: Phrasing<'_, L>,
        utterance: &str,
        intent: Intent,
        entities: &Entities,
        api_result: &ApiResult,
        style: ResponseStyle,
    ) -> String {
        let payload = match api_result {
            Ok(payload) => payload,
            Err(failure) => return failure_reply(failure, style),
        };

        if let Phrasing::Llm(model) = phrasing {
            match self
                .phrase_with_model(model, utterance, intent, entities, payload, style)
                .await
            {
                Ok(text) => {
                    debug!("Reply phrased by {}", model.name());
                    return text;
                }
                Err(reason) => warn!("Falling back to templates: {}", reason),
            }
        } else {
            debug!("Reply phrased by templates");
        }
        self.template(intent, entities, payload, style)
    }

    async fn phrase_with_model<L: LanguageModel>(
        &self,
        model: &L,
        utterance: &str,
        intent: Intent,
        entities: &Entities,
        payload: &Value,
        style: ResponseStyle,
    ) -> std::result::Result<String, String> {
        let prompt = build_prompt(utterance, intent, entities, payload, style)
            .map_err(|e| format!("prompt could not be rendered: {:#}", e))?;
        let generated = tokio::time::timeout(self.llm_timeout, model.generate(&prompt))
            .await
            .unwrap_or(Err(LlmFailure::Timeout))
            .map_err(|e| e.to_string())?;
        let text = generated.trim();
        if text.is_empty() {
            return Err("language model returned empty text".to_string());
        }
        Ok(text.to_string())
    }

    /// Deterministic reply built from the payload.
    pub fn template(
        &self,
        intent: Intent,
        entities: &Entities,
        payload: &Value,
        style: ResponseStyle,
    ) -> String {
        let reply = match intent {
            Intent::PlayerInfo => PlayerSummary::from_value(payload).map(|p| player_reply(&p, style)),
            Intent::TeamInfo => ClubSummary::from_value(payload).map(|c| club_reply(&c, style)),
            Intent::TransferHistory => {
                TransferSummary::from_value(payload).map(|t| transfers_reply(&t, style))
            }
            Intent::LeagueTable => StandingsSummary::from_value(payload).map(|s| {
                let fallback_name = entities
                    .get(&EntityRole::Competition)
                    .map(String::as_str)
                    .unwrap_or("League");
                standings_reply(&s, fallback_name, style)
            }),
            Intent::Compare => compare_reply(entities, payload, style),
            Intent::Unknown => Some(Self::fallback(style)),
        };
        reply.unwrap_or_else(|| {
            warn!("Payload for {} could not be summarized", intent);
            failure_reply(&ApiFailure::Malformed("unexpected payload".into()), style)
        })
    }

    /// Asks for the name an intent needs when none was found.
    pub fn clarify(intent: Intent, style: ResponseStyle) -> String {
        let (question, example) = match intent {
            Intent::PlayerInfo => ("Which player do you mean?", "Tell me about Lionel Messi"),
            Intent::TransferHistory => (
                "Whose transfer history would you like?",
                "Kylian Mbappé transfers",
            ),
            Intent::TeamInfo => ("Which club do you mean?", "Tell me about Real Madrid"),
            Intent::LeagueTable => ("Which league's table would you like?", "Premier League table"),
            Intent::Compare => ("Who should I compare?", "Compare Messi and Ronaldo"),
            Intent::Unknown => return Self::fallback(style),
        };
        match style {
            ResponseStyle::Casual => format!("🤔 {} Try something like \"{}\".", question, example),
            _ => format!("{} For example: \"{}\".", question, example),
        }
    }

    /// Greeting and help text for utterances that could not be classified.
    pub fn fallback(style: ResponseStyle) -> String {
        let examples = "- \"Tell me about Lionel Messi\"\n\
                        - \"Cristiano Ronaldo stats\"\n\
                        - \"Kylian Mbappé transfers\"\n\
                        - \"Tell me about Real Madrid\"\n\
                        - \"Premier League table\"\n\
                        - \"Compare Messi and Ronaldo\"";
        match style {
            ResponseStyle::Casual => format!(
                "Hey there! ⚽ I'm your football buddy. Ask me about players, clubs, transfers or league tables:\n\n{}\n\nJust ask naturally!",
                examples
            ),
            ResponseStyle::Professional => format!(
                "Hello. I am a football information assistant. I can provide player profiles, club information, transfer histories and league tables.\n\nExample questions:\n{}",
                examples
            ),
            ResponseStyle::Detailed => format!(
                "Greetings! I can provide comprehensive football information: player profiles with market valuations and contract details, club information, complete transfer histories, league standings and side-by-side comparisons.\n\nExample questions:\n{}",
                examples
            ),
        }
    }
}

/// Fixed message for each failure category.
pub fn failure_reply(failure: &ApiFailure, style: ResponseStyle) -> String {
    match (failure, style) {
        (ApiFailure::NotFound { query }, ResponseStyle::Casual) => format!(
            "😕 Sorry, I couldn't find any results for \"{}\". Could you check the spelling?",
            query
        ),
        (ApiFailure::NotFound { query }, _) => format!(
            "Sorry, no results were found for \"{}\". Please check the spelling and try again.",
            query
        ),
        (ApiFailure::RateLimited, ResponseStyle::Casual) => {
            "⏳ I'm getting a lot of questions right now. Please try again shortly!".to_string()
        }
        (ApiFailure::RateLimited, _) => {
            "The football data service is busy at the moment. Please try again shortly."
                .to_string()
        }
        (_, ResponseStyle::Casual) => {
            "⚠️ Something went wrong while fetching the football data. Please try again in a moment."
                .to_string()
        }
        (_, _) => {
            "The football data could not be retrieved right now. Please try again later."
                .to_string()
        }
    }
}

/// Renders the language-model prompt from structured facts.
pub fn build_prompt(
    utterance: &str,
    intent: Intent,
    entities: &Entities,
    payload: &Value,
    style: ResponseStyle,
) -> Result<String> {
    let mut context = PromptContext::new(style, utterance, intent);
    for (role, value) in entities {
        context = context.with_entity(role.as_str(), value.as_str());
    }
    for Fact { label, value } in facts_for(intent, entities, payload) {
        context = context.with_fact(label, value);
    }
    templating::render_prompt(&context)
}

fn facts_for(intent: Intent, entities: &Entities, payload: &Value) -> Vec<Fact> {
    match intent {
        Intent::PlayerInfo => PlayerSummary::from_value(payload)
            .map(|p| p.facts())
            .unwrap_or_default(),
        Intent::TeamInfo => ClubSummary::from_value(payload)
            .map(|c| c.facts())
            .unwrap_or_default(),
        Intent::TransferHistory => TransferSummary::from_value(payload)
            .map(|t| t.facts())
            .unwrap_or_default(),
        Intent::LeagueTable => StandingsSummary::from_value(payload)
            .map(|s| s.facts())
            .unwrap_or_default(),
        Intent::Compare => {
            let clubs = entities.contains_key(&EntityRole::Team1);
            payload
                .as_array()
                .map(|sides| {
                    sides
                        .iter()
                        .flat_map(|side| {
                            if clubs {
                                ClubSummary::from_value(side).map(|c| c.facts())
                            } else {
                                PlayerSummary::from_value(side).map(|p| p.facts())
                            }
                            .unwrap_or_default()
                        })
                        .collect()
                })
                .unwrap_or_default()
        }
        Intent::Unknown => Vec::new(),
    }
}

fn labelled(lines: &mut Vec<String>, label: &str, value: &Option<String>) {
    if let Some(value) = value {
        lines.push(format!("**{}:** {}", label, value));
    }
}

fn player_reply(p: &PlayerSummary, style: ResponseStyle) -> String {
    match style {
        ResponseStyle::Casual => {
            let mut text = format!("⚽ **{}**\n\n{}", p.name, p.name);
            let role = p.position.as_deref().unwrap_or("footballer");
            match &p.age {
                Some(age) => text.push_str(&format!(" is a {}-year-old {}", age, role)),
                None => text.push_str(&format!(" is a {}", role)),
            }
            match &p.club {
                Some(club) => text.push_str(&format!(" who plays for {}.", club)),
                None => text.push('.'),
            }
            if let Some(nationality) = &p.nationality {
                text.push_str(&format!(" Nationality: {}.", nationality));
            }
            if let Some(value) = &p.market_value {
                text.push_str(&format!(" Market value is around {}.", value));
            }
            text.push_str(" 🌟");
            text
        }
        ResponseStyle::Professional | ResponseStyle::Detailed => {
            let mut lines = vec![format!("**Player Profile: {}**", p.name), String::new()];
            labelled(&mut lines, "Age", &p.age);
            labelled(&mut lines, "Position", &p.position);
            labelled(&mut lines, "Current Club", &p.club);
            labelled(&mut lines, "Nationality", &p.nationality);
            labelled(&mut lines, "Market Value", &p.market_value);
            if style == ResponseStyle::Detailed {
                labelled(&mut lines, "Date of Birth", &p.date_of_birth);
                labelled(&mut lines, "Height", &p.height);
                labelled(&mut lines, "Preferred Foot", &p.foot);
                labelled(&mut lines, "Shirt Number", &p.shirt_number);
                labelled(&mut lines, "Joined Club", &p.joined);
                labelled(&mut lines, "Contract Expires", &p.contract_expires);
            }
            lines.join("\n")
        }
    }
}

fn club_reply(c: &ClubSummary, style: ResponseStyle) -> String {
    match style {
        ResponseStyle::Casual => {
            let mut text = format!("🏟️ **{}**\n\n", c.name);
            match &c.league {
                Some(league) => text.push_str(&format!("{} play in the {}.", c.name, league)),
                None => text.push_str(&format!("Here's what I know about {}.", c.name)),
            }
            if let Some(founded) = &c.founded {
                text.push_str(&format!(" Founded: {}.", founded));
            }
            if let Some(stadium) = &c.stadium {
                text.push_str(&format!(" Home ground: {}.", stadium));
            }
            text.push_str(" ⚽");
            if !c.players.is_empty() {
                text.push_str(&format!("\n\n👥 **Squad**\n{}", squad_lines(&c.players, 11, "• ")));
            }
            text
        }
        ResponseStyle::Professional | ResponseStyle::Detailed => {
            let mut lines = vec![format!("**Club Information: {}**", c.name), String::new()];
            labelled(&mut lines, "League", &c.league);
            labelled(&mut lines, "Founded", &c.founded);
            labelled(&mut lines, "Stadium", &c.stadium);
            if style == ResponseStyle::Detailed {
                labelled(&mut lines, "Country", &c.country);
                labelled(&mut lines, "Stadium Capacity", &c.stadium_seats);
                labelled(&mut lines, "Squad Size", &c.squad_size);
                labelled(&mut lines, "Average Age", &c.average_age);
                labelled(&mut lines, "Squad Market Value", &c.market_value);
            }
            if !c.players.is_empty() {
                let limit = if style == ResponseStyle::Detailed {
                    MAX_SQUAD_ROWS
                } else {
                    15
                };
                lines.push(String::new());
                lines.push(format!("**Squad ({} players):**", c.players.len()));
                lines.push(squad_lines(&c.players, limit, "- "));
            }
            lines.join("\n")
        }
    }
}

fn squad_lines(players: &[String], limit: usize, bullet: &str) -> String {
    let mut lines: Vec<String> = players
        .iter()
        .take(limit)
        .map(|p| format!("{}{}", bullet, p))
        .collect();
    if players.len() > limit {
        lines.push(format!("...and {} more", players.len() - limit));
    }
    lines.join("\n")
}

fn transfers_reply(t: &TransferSummary, style: ResponseStyle) -> String {
    if t.rows.is_empty() {
        return match style {
            ResponseStyle::Casual => format!("🔄 No transfers on record for {} yet.", t.player),
            _ => format!("No transfers are on record for {}.", t.player),
        };
    }
    match style {
        ResponseStyle::Casual => {
            let mut text = format!(
                "🔄 **Transfer history for {}**\n\nFound {} moves! The most recent:\n",
                t.player,
                t.rows.len()
            );
            for row in t.rows.iter().take(3) {
                text.push_str(&format!("• {}\n", row.line()));
            }
            text.trim_end().to_string()
        }
        ResponseStyle::Professional => {
            let mut lines = vec![format!("**Transfer History: {}**", t.player), String::new()];
            lines.extend(
                t.rows
                    .iter()
                    .take(5)
                    .enumerate()
                    .map(|(i, row)| format!("{}. {}", i + 1, row.line())),
            );
            lines.join("\n")
        }
        ResponseStyle::Detailed => {
            let mut lines = vec![
                format!("**Complete Transfer History: {}**", t.player),
                format!("{} transfers on record.", t.rows.len()),
                String::new(),
            ];
            for (i, row) in t.rows.iter().take(MAX_TRANSFER_ROWS).enumerate() {
                let mut line = format!("{}. {}", i + 1, row.line());
                if let Some(season) = &row.season {
                    line.push_str(&format!(", season {}", season));
                }
                if let Some(fee) = &row.fee {
                    line.push_str(&format!(", fee {}", fee));
                }
                lines.push(line);
            }
            lines.join("\n")
        }
    }
}

fn standings_reply(s: &StandingsSummary, fallback_name: &str, style: ResponseStyle) -> String {
    let name = s.competition.as_deref().unwrap_or(fallback_name);
    let points = |p: Option<i64>| p.map(|p| format!("{} pts", p)).unwrap_or_else(|| "-".into());
    match style {
        ResponseStyle::Casual => {
            let mut text = format!("📊 **{} table**\n\n", name);
            for row in s.rows.iter().take(5) {
                text.push_str(&format!("{}. {} ({})\n", row.position, row.club, points(row.points)));
            }
            if let Some(leader) = s.rows.first() {
                text.push_str(&format!("\n🏆 {} are top right now!", leader.club));
            }
            text
        }
        ResponseStyle::Professional => {
            let mut lines = vec![format!("**{} Standings**", name), String::new()];
            lines.extend(s.rows.iter().take(10).map(|row| {
                format!("{}. {} - {}", row.position, row.club, points(row.points))
            }));
            lines.join("\n")
        }
        ResponseStyle::Detailed => {
            let mut lines = vec![
                format!("**{} Standings**", name),
                String::new(),
                "Pos | Club | Played | GD | Points".to_string(),
            ];
            let num = |n: Option<i64>| n.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
            lines.extend(s.rows.iter().map(|row| {
                format!(
                    "{} | {} | {} | {} | {}",
                    row.position,
                    row.club,
                    num(row.played),
                    row.goal_difference
                        .map(|gd| format!("{:+}", gd))
                        .unwrap_or_else(|| "-".into()),
                    num(row.points)
                )
            }));
            lines.join("\n")
        }
    }
}

fn compare_reply(entities: &Entities, payload: &Value, style: ResponseStyle) -> Option<String> {
    let sides = payload.as_array()?;
    let (left, right) = match sides.as_slice() {
        [left, right, ..] => (left, right),
        _ => return None,
    };
    if entities.contains_key(&EntityRole::Team1) {
        let (a, b) = (ClubSummary::from_value(left)?, ClubSummary::from_value(right)?);
        return Some(compare_clubs(&a, &b, style));
    }
    let (a, b) = (PlayerSummary::from_value(left)?, PlayerSummary::from_value(right)?);
    let values = (
        number_at(left, &["marketValue"]),
        number_at(right, &["marketValue"]),
    );
    Some(compare_players(&a, &b, values, style))
}

fn player_line(p: &PlayerSummary) -> String {
    let mut parts = Vec::new();
    if let Some(age) = &p.age {
        parts.push(format!("{} years old", age));
    }
    if let Some(position) = &p.position {
        parts.push(position.clone());
    }
    if let Some(club) = &p.club {
        parts.push(club.clone());
    }
    if let Some(value) = &p.market_value {
        parts.push(value.clone());
    }
    if parts.is_empty() {
        p.name.clone()
    } else {
        format!("{}: {}", p.name, parts.join(", "))
    }
}

fn compare_players(
    a: &PlayerSummary,
    b: &PlayerSummary,
    values: (Option<i64>, Option<i64>),
    style: ResponseStyle,
) -> String {
    let verdict = match values {
        (Some(x), Some(y)) if x > y => Some(format!("{} has the higher market value.", a.name)),
        (Some(x), Some(y)) if y > x => Some(format!("{} has the higher market value.", b.name)),
        (Some(_), Some(_)) => Some("Both are valued the same.".to_string()),
        _ => None,
    };
    match style {
        ResponseStyle::Casual => {
            let mut text = format!(
                "🆚 **{} vs {}**\n\n• {}\n• {}",
                a.name,
                b.name,
                player_line(a),
                player_line(b)
            );
            if let Some(verdict) = verdict {
                text.push_str(&format!("\n\n💰 {}", verdict));
            }
            text
        }
        ResponseStyle::Professional => {
            let mut lines = vec![
                format!("**Player Comparison: {} vs {}**", a.name, b.name),
                String::new(),
                format!("- {}", player_line(a)),
                format!("- {}", player_line(b)),
            ];
            if let Some(verdict) = verdict {
                lines.push(String::new());
                lines.push(verdict);
            }
            lines.join("\n")
        }
        ResponseStyle::Detailed => {
            let rows: [(&str, &Option<String>, &Option<String>); 8] = [
                ("Age", &a.age, &b.age),
                ("Position", &a.position, &b.position),
                ("Club", &a.club, &b.club),
                ("Nationality", &a.nationality, &b.nationality),
                ("Market Value", &a.market_value, &b.market_value),
                ("Height", &a.height, &b.height),
                ("Preferred Foot", &a.foot, &b.foot),
                ("Contract Expires", &a.contract_expires, &b.contract_expires),
            ];
            let mut lines = vec![
                format!("**Detailed Comparison: {} vs {}**", a.name, b.name),
                String::new(),
                format!("Attribute | {} | {}", a.name, b.name),
            ];
            for (label, x, y) in rows {
                if x.is_some() || y.is_some() {
                    lines.push(format!(
                        "{} | {} | {}",
                        label,
                        x.as_deref().unwrap_or("-"),
                        y.as_deref().unwrap_or("-")
                    ));
                }
            }
            if let Some(verdict) = verdict {
                lines.push(String::new());
                lines.push(verdict);
            }
            lines.join("\n")
        }
    }
}

fn compare_clubs(a: &ClubSummary, b: &ClubSummary, style: ResponseStyle) -> String {
    let line = |c: &ClubSummary| {
        let parts: Vec<String> = [&c.league, &c.stadium, &c.market_value]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        if parts.is_empty() {
            c.name.clone()
        } else {
            format!("{}: {}", c.name, join_list(&parts))
        }
    };
    match style {
        ResponseStyle::Casual => format!(
            "🆚 **{} vs {}**\n\n• {}\n• {}",
            a.name,
            b.name,
            line(a),
            line(b)
        ),
        ResponseStyle::Professional => format!(
            "**Club Comparison: {} vs {}**\n\n- {}\n- {}",
            a.name,
            b.name,
            line(a),
            line(b)
        ),
        ResponseStyle::Detailed => {
            let rows: [(&str, &Option<String>, &Option<String>); 8] = [
                ("League", &a.league, &b.league),
                ("Country", &a.country, &b.country),
                ("Founded", &a.founded, &b.founded),
                ("Stadium", &a.stadium, &b.stadium),
                ("Stadium Capacity", &a.stadium_seats, &b.stadium_seats),
                ("Squad Size", &a.squad_size, &b.squad_size),
                ("Average Age", &a.average_age, &b.average_age),
                ("Squad Market Value", &a.market_value, &b.market_value),
            ];
            let mut lines = vec![
                format!("**Detailed Club Comparison: {} vs {}**", a.name, b.name),
                String::new(),
                format!("Attribute | {} | {}", a.name, b.name),
            ];
            for (label, x, y) in rows {
                if x.is_some() || y.is_some() {
                    lines.push(format!(
                        "{} | {} | {}",
                        label,
                        x.as_deref().unwrap_or("-"),
                        y.as_deref().unwrap_or("-")
                    ));
                }
            }
            lines.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::llm::LlmFailure;
    use serde_json::json;
    use std::cell::Cell;

    fn has_emoji(text: &str) -> bool {
        text.chars().any(|c| {
            matches!(c as u32, 0x1F300..=0x1FAFF | 0x2600..=0x27BF | 0x2B50 | 0x23F3 | 0xFE0F)
        })
    }

    struct ScriptedModel {
        reply: std::result::Result<String, LlmFailure>,
        calls: Cell<usize>,
    }

    impl LanguageModel for ScriptedModel {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, LlmFailure> {
            self.calls.set(self.calls.get() + 1);
            self.reply.clone()
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn messi() -> Value {
        json!({
            "name": "Lionel Messi",
            "age": 37,
            "position": {"main": "Right Winger"},
            "club": {"name": "Inter Miami CF", "contractExpires": "2025-12-31"},
            "citizenship": ["Argentina"],
            "height": 170,
            "marketValue": 18000000
        })
    }

    fn player_entities(name: &str) -> Entities {
        Entities::from([(EntityRole::Player, name.to_string())])
    }

    #[tokio::test]
    async fn test_failure_never_calls_model() {
        let composer = Composer::new(Duration::from_secs(1));
        let model = ScriptedModel {
            reply: Ok("should not be used".into()),
            calls: Cell::new(0),
        };
        let result: ApiResult = Err(ApiFailure::NotFound {
            query: "Zzzqqx".into(),
        });
        let reply = composer
            .compose(
                Phrasing::Llm(&model),
                "Tell me about Zzzqqx",
                Intent::PlayerInfo,
                &player_entities("Zzzqqx"),
                &result,
                ResponseStyle::Casual,
            )
            .await;
        assert!(reply.contains("Zzzqqx"));
        assert!(reply.contains("Sorry"));
        assert_eq!(model.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_model_text_is_used_verbatim() {
        let composer = Composer::new(Duration::from_secs(1));
        let model = ScriptedModel {
            reply: Ok("  Messi is magic.  ".into()),
            calls: Cell::new(0),
        };
        let reply = composer
            .compose(
                Phrasing::Llm(&model),
                "Tell me about Lionel Messi",
                Intent::PlayerInfo,
                &player_entities("Lionel Messi"),
                &Ok(messi()),
                ResponseStyle::Casual,
            )
            .await;
        assert_eq!(reply, "Messi is magic.");
        assert_eq!(model.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back_to_template() {
        let composer = Composer::new(Duration::from_secs(1));
        for failure in [
            Err(LlmFailure::Unavailable("quota".into())),
            Err(LlmFailure::Timeout),
            Ok("   ".to_string()),
        ] {
            let model = ScriptedModel {
                reply: failure,
                calls: Cell::new(0),
            };
            let reply = composer
                .compose(
                    Phrasing::Llm(&model),
                    "Tell me about Lionel Messi",
                    Intent::PlayerInfo,
                    &player_entities("Lionel Messi"),
                    &Ok(messi()),
                    ResponseStyle::Professional,
                )
                .await;
            assert!(reply.starts_with("**Player Profile: Lionel Messi**"));
            assert_eq!(model.calls.get(), 1);
        }
    }

    #[test]
    fn test_player_templates_by_style() {
        let composer = Composer::new(Duration::from_secs(1));
        let entities = player_entities("Lionel Messi");
        let casual = composer.template(Intent::PlayerInfo, &entities, &messi(), ResponseStyle::Casual);
        assert!(casual.contains("Lionel Messi"));
        assert!(casual.contains("Inter Miami CF"));
        assert!(casual.contains("Right Winger"));
        assert!(has_emoji(&casual));

        let professional =
            composer.template(Intent::PlayerInfo, &entities, &messi(), ResponseStyle::Professional);
        assert!(professional.contains("**Current Club:** Inter Miami CF"));
        assert!(!professional.contains("Height"));
        assert!(!has_emoji(&professional));

        let detailed = composer.template(Intent::PlayerInfo, &entities, &messi(), ResponseStyle::Detailed);
        assert!(detailed.contains("**Height:** 170 cm"));
        assert!(detailed.contains("**Contract Expires:** 2025-12-31"));
        assert!(detailed.contains("€18.00m"));
    }

    #[test]
    fn test_failure_replies_by_category() {
        let not_found = ApiFailure::NotFound { query: "Zzzqqx".into() };
        for style in [ResponseStyle::Casual, ResponseStyle::Professional, ResponseStyle::Detailed] {
            assert!(failure_reply(&not_found, style).contains("\"Zzzqqx\""));
            assert!(failure_reply(&ApiFailure::RateLimited, style).contains("try again shortly"));
            assert!(failure_reply(&ApiFailure::NetworkError("x".into()), style).contains("try again"));
        }
        assert!(!has_emoji(&failure_reply(&not_found, ResponseStyle::Professional)));
        assert!(!has_emoji(&failure_reply(&ApiFailure::RateLimited, ResponseStyle::Professional)));
    }

    #[test]
    fn test_unreadable_payload_is_generic_failure() {
        let composer = Composer::new(Duration::from_secs(1));
        let reply = composer.template(
            Intent::TeamInfo,
            &Entities::new(),
            &json!({"unexpected": true}),
            ResponseStyle::Professional,
        );
        assert!(reply.contains("could not be retrieved"));
    }

    #[test]
    fn test_compare_players_contrasts_both() {
        let composer = Composer::new(Duration::from_secs(1));
        let entities = Entities::from([
            (EntityRole::Player1, "Messi".to_string()),
            (EntityRole::Player2, "Ronaldo".to_string()),
        ]);
        let ronaldo = json!({"name": "Cristiano Ronaldo", "age": 39, "club": {"name": "Al-Nassr"}, "marketValue": 15000000});
        let payload = json!([messi(), ronaldo]);
        let reply = composer.template(Intent::Compare, &entities, &payload, ResponseStyle::Professional);
        assert!(reply.contains("Lionel Messi"));
        assert!(reply.contains("Cristiano Ronaldo"));
        assert!(reply.contains("Lionel Messi has the higher market value."));

        let detailed = composer.template(Intent::Compare, &entities, &payload, ResponseStyle::Detailed);
        assert!(detailed.contains("Club | Inter Miami CF | Al-Nassr"));
    }

    fn club_pair() -> (Entities, Value) {
        let entities = Entities::from([
            (EntityRole::Team1, "Liverpool".to_string()),
            (EntityRole::Team2, "Chelsea".to_string()),
        ]);
        let payload = json!([
            {
                "name": "Liverpool FC",
                "league": {"name": "Premier League"},
                "stadiumName": "Anfield",
                "stadiumSeats": 61276,
                "squad": {"size": 27, "averageAge": 26.1},
                "currentMarketValue": 1050000000
            },
            {
                "name": "Chelsea FC",
                "league": {"name": "Premier League"},
                "stadiumName": "Stamford Bridge",
                "stadiumSeats": 40173,
                "squad": {"size": 33, "averageAge": 23.8}
            }
        ]);
        (entities, payload)
    }

    #[test]
    fn test_compare_clubs_detailed_adds_numbers() {
        let composer = Composer::new(Duration::from_secs(1));
        let (entities, payload) = club_pair();

        let professional = composer.template(Intent::Compare, &entities, &payload, ResponseStyle::Professional);
        assert!(professional.starts_with("**Club Comparison: Liverpool FC vs Chelsea FC**"));
        assert!(!professional.contains("61276"));

        let detailed = composer.template(Intent::Compare, &entities, &payload, ResponseStyle::Detailed);
        assert_ne!(detailed, professional);
        assert!(detailed.contains("Attribute | Liverpool FC | Chelsea FC"));
        assert!(detailed.contains("Stadium Capacity | 61276 | 40173"));
        assert!(detailed.contains("Squad Size | 27 | 33"));
        assert!(detailed.contains("Average Age | 26.1 | 23.8"));
        assert!(detailed.contains("Squad Market Value | €1050.00m | -"));
    }

    #[test]
    fn test_club_comparison_prompt_uses_club_facts() {
        let (entities, payload) = club_pair();
        let prompt = build_prompt(
            "Compare Liverpool and Chelsea",
            Intent::Compare,
            &entities,
            &payload,
            ResponseStyle::Casual,
        )
        .unwrap();
        assert!(prompt.contains("- Club: Liverpool FC"));
        assert!(prompt.contains("- Club: Chelsea FC"));
        assert!(prompt.contains("- League: Premier League"));
        assert!(prompt.contains("- Stadium: Anfield"));
        assert!(prompt.contains("- Stadium: Stamford Bridge"));
    }

    /// A model that never answers.
    struct StalledModel;

    impl LanguageModel for StalledModel {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, LlmFailure> {
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn test_stalled_model_times_out_to_template() {
        let composer = Composer::new(Duration::from_millis(50));
        let reply = tokio::time::timeout(
            Duration::from_secs(5),
            composer.compose(
                Phrasing::Llm(&StalledModel),
                "Tell me about Lionel Messi",
                Intent::PlayerInfo,
                &player_entities("Lionel Messi"),
                &Ok(messi()),
                ResponseStyle::Professional,
            ),
        )
        .await
        .expect("composer must give up on the model by itself");
        assert!(reply.starts_with("**Player Profile: Lionel Messi**"), "{}", reply);
    }

    #[test]
    fn test_club_reply_lists_squad() {
        let composer = Composer::new(Duration::from_secs(1));
        let players: Vec<Value> = (1..=20)
            .map(|n| json!({"name": format!("Player {}", n), "position": "cb"}))
            .collect();
        let payload = json!({"name": "Arsenal", "league": {"name": "Premier League"}, "players": players});
        let entities = Entities::from([(EntityRole::Team, "Arsenal".to_string())]);

        let professional = composer.template(Intent::TeamInfo, &entities, &payload, ResponseStyle::Professional);
        assert!(professional.contains("**Squad (20 players):**"));
        assert!(professional.contains("- Player 1 (Centre-Back)"));
        assert!(professional.contains("- Player 15 (Centre-Back)"));
        assert!(!professional.contains("- Player 16 "));
        assert!(professional.contains("...and 5 more"));

        let detailed = composer.template(Intent::TeamInfo, &entities, &payload, ResponseStyle::Detailed);
        assert!(detailed.contains("- Player 20 (Centre-Back)"));
        assert!(!detailed.contains("more"));

        let casual = composer.template(Intent::TeamInfo, &entities, &payload, ResponseStyle::Casual);
        assert!(casual.contains("• Player 11 (Centre-Back)"));
        assert!(casual.contains("...and 9 more"));
    }

    #[test]
    fn test_transfers_and_standings_templates() {
        let composer = Composer::new(Duration::from_secs(1));
        let transfers = json!({
            "player": "Lionel Messi",
            "transfers": [
                {"clubFrom": {"name": "Paris SG"}, "clubTo": {"name": "Inter Miami"}, "date": "2023-07-15"},
                {"clubFrom": {"name": "Barcelona"}, "clubTo": {"name": "Paris SG"}, "date": "2021-08-10", "fee": 0}
            ]
        });
        let reply = composer.template(Intent::TransferHistory, &Entities::new(), &transfers, ResponseStyle::Casual);
        assert!(reply.contains("Paris SG → Inter Miami (2023-07-15)"));

        let table = json!({"table": [{"position": 1, "club": "Liverpool", "points": 84, "goalDifference": 45}]});
        let entities = Entities::from([(EntityRole::Competition, "Premier League".to_string())]);
        let detailed = composer.template(Intent::LeagueTable, &entities, &table, ResponseStyle::Detailed);
        assert!(detailed.contains("**Premier League Standings**"));
        assert!(detailed.contains("1 | Liverpool | - | +45 | 84"));
    }

    #[test]
    fn test_clarify_and_fallback() {
        assert!(Composer::clarify(Intent::PlayerInfo, ResponseStyle::Casual).contains("Which player"));
        assert!(Composer::clarify(Intent::Compare, ResponseStyle::Professional).contains("compare"));
        assert_eq!(
            Composer::clarify(Intent::Unknown, ResponseStyle::Detailed),
            Composer::fallback(ResponseStyle::Detailed)
        );
        assert!(!has_emoji(&Composer::fallback(ResponseStyle::Professional)));
        assert!(Composer::fallback(ResponseStyle::Casual).contains("Premier League table"));
    }

    #[test]
    fn test_prompt_carries_facts_not_raw_json() {
        let prompt = build_prompt(
            "Tell me about Lionel Messi",
            Intent::PlayerInfo,
            &player_entities("Lionel Messi"),
            &messi(),
            ResponseStyle::Casual,
        )
        .unwrap();
        assert!(prompt.contains("- Club: Inter Miami CF"));
        assert!(prompt.contains("- player: Lionel Messi"));
        assert!(!prompt.contains("\"marketValue\""));
    }
}
