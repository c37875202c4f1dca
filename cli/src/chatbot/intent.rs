//! # Intent Extractor
//!
//! File: cli/src/chatbot/intent.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Turns one utterance (plus the conversation so far) into a
//! `Classification`: exactly one `Intent` and the named entities it needs.
//! Classification is a pure function of `(utterance, history)`. It never
//! fails and never panics; anything it cannot make sense of is `Unknown`.
//!
//! ## Architecture
//!
//! 1. **Normalization**: trim, truncate to `MAX_INPUT_CHARS`, lower-case.
//! 2. **Cue rules**: `CUE_RULES` is an ordered table evaluated top to bottom;
//!    the first rule with a matching cue phrase decides the intent.
//! 3. **Candidates**: names are collected in priority order from quoted
//!    text, proper-noun spans, the club/competition lexicon and finally
//!    capture patterns on the lower-cased text.
//! 4. **Default heuristic** (no cue matched): known club → `TeamInfo`, any
//!    other name → the configured `NameFallback`, a pronoun that resolves
//!    through history → the matching intent, otherwise `Unknown`.
//! 5. **Back-references**: pronouns ("his", "them") and bare follow-ups
//!    ("transfers?") borrow the missing name from the history.
//!
//! ## Examples
//!
//! ```rust,ignore
//! let extractor = IntentExtractor::new(&config.chat)?;
//! let c = extractor.classify("Compare Messi and Ronaldo", &session.history);
//! assert_eq!(c.intent, Intent::Compare);
//! assert_eq!(c.entity(EntityRole::Player1), Some("Messi"));
//! ```
//!
use super::format::title_case;
use super::lexicon::{self, COMPETITIONS, KNOWN_TEAMS};
use super::session::ConversationHistory;
use super::types::{Classification, Entities, EntityRole, Intent, NameFallback};
use crate::core::config::ChatConfig;
use crate::core::error::{FootbotError, Result};
use anyhow::anyhow;
use regex::Regex;
use tracing::debug;

/// Utterances are cut to this many characters before matching.
pub const MAX_INPUT_CHARS: usize = 1000;

/// One row of the ordered rule table.
#[derive(Debug, Clone, Copy)]
pub struct CueRule {
    pub intent: Intent,
    pub cues: &'static [&'static str],
}

/// Evaluated top to bottom against the lower-cased words of the utterance.
pub const CUE_RULES: &[CueRule] = &[
    CueRule {
        intent: Intent::Compare,
        cues: &[
            "compare",
            " vs ",
            " vs. ",
            " versus ",
            "who is better",
            "better than",
            "head to head",
        ],
    },
    CueRule {
        intent: Intent::LeagueTable,
        cues: &["table", "standings", "top of the", "leading the", "league position"],
    },
    CueRule {
        intent: Intent::TransferHistory,
        cues: &[
            "transfer",
            "moved to",
            "moved from",
            "career moves",
            "where did",
            "who bought",
            "signed for",
            "previous clubs",
        ],
    },
    CueRule {
        intent: Intent::TeamInfo,
        cues: &[
            "club info",
            "team info",
            "team details",
            "football club",
            "squad",
            "stadium",
            "founded",
        ],
    },
    CueRule {
        intent: Intent::PlayerInfo,
        cues: &[
            "stats",
            "statistics",
            "profile",
            "worth",
            "market value",
            "how old",
            "what position",
            "bio",
            "career",
        ],
    },
];

/// Name captures tried on the lower-cased utterance, in order.
const NAME_PATTERNS: &[&str] = &[
    r"how much is (.+?) worth",
    r"(?:what|how) about (.+)",
    r"tell me about (.+)",
    r"who is (.+)",
    r"(?:information|details|info) (?:about|on) (.+)",
    r"where did (.+?) play",
    r"who bought (.+)",
    r"(.+?)(?:'s)? (?:transfer history|transfers|career moves|previous clubs)",
    r"(.+?)(?:'s)? (?:market value|statistics|stats|profile|bio|career|worth)",
    r"(.+?)(?:'s)? (?:club info|team info|team details|football club|squad|stadium)",
];

/// Competition captures tried when the lexicon has no match.
const COMPETITION_PATTERNS: &[&str] = &[
    r"(?:top of|leading) (?:the )?(.+)",
    r"(.+?) (?:league table|table|standings)",
];

/// Splits "X vs Y" style comparisons when fewer than two names were found.
const COMPARISON_SPLIT: &str =
    r"^(?:compare|who is better,?|who's better,?|head to head,?|is)?\s*(.+?)\s+(?:vs\.?|versus|and|or|with|to|better than)\s+(.+?)$";

#[derive(Debug)]
pub struct IntentExtractor {
    name_patterns: Vec<Regex>,
    competition_patterns: Vec<Regex>,
    comparison_split: Regex,
    quoted: Regex,
    extra_teams: Vec<String>,
    fallback: NameFallback,
}

/// Per-utterance working set.
struct Analysis<'a> {
    original: &'a str,
    lower: String,
    words: Vec<String>,
}

impl<'a> Analysis<'a> {
    fn new(original: &'a str) -> Self {
        let lower = original.to_lowercase();
        let cleaned: String = lower
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '\'' || c == '-' {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        let words: Vec<String> = cleaned.split_whitespace().map(str::to_string).collect();
        Self {
            original,
            lower,
            words,
        }
    }

    /// Word-boundary containment of a lower-case phrase.
    fn contains_phrase(&self, phrase: &str) -> bool {
        let joined = format!(" {} ", self.words.join(" "));
        joined.contains(&format!(" {} ", phrase))
    }

    /// Cues match whole words. A single-word cue of four letters or more also
    /// matches as a word prefix ("transfer" in "transferred"). Punctuation next
    /// to a cue ("Messi vs, Ronaldo?") is normalized away.
    fn has_cue(&self, cue: &str) -> bool {
        let cue = cue.trim().trim_end_matches('.');
        if cue.contains(' ') {
            return self.contains_phrase(cue);
        }
        self.words
            .iter()
            .any(|word| word == cue || (cue.len() >= 4 && word.starts_with(cue)))
    }

    fn pronoun_kind(&self) -> Option<PronounKind> {
        let word_is = |set: &[&str]| {
            self.words
                .iter()
                .any(|w| set.contains(&w.trim_matches('\'')))
        };
        if word_is(lexicon::PLAYER_PRONOUNS) {
            Some(PronounKind::Player)
        } else if word_is(lexicon::TEAM_PRONOUNS) {
            Some(PronounKind::Team)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PronounKind {
    Player,
    Team,
}

impl IntentExtractor {
    pub fn new(config: &ChatConfig) -> Result<Self> {
        Ok(Self {
            name_patterns: compile_all(NAME_PATTERNS)?,
            competition_patterns: compile_all(COMPETITION_PATTERNS)?,
            comparison_split: compile(COMPARISON_SPLIT)?,
            quoted: compile(r#""([^"]+)"|“([^”]+)”|‘([^’]+)’|(?:^|\s)'([^']+)'(?:\s|$|[?.!,])"#)?,
            extra_teams: config
                .extra_teams
                .iter()
                .map(|t| t.trim().to_lowercase())
                .collect(),
            fallback: config.unknown_name_fallback,
        })
    }

    /// Classifies one utterance in the context of the session's history.
    pub fn classify(&self, utterance: &str, history: &ConversationHistory) -> Classification {
        let trimmed = utterance.trim();
        if trimmed.is_empty() {
            return Classification::unknown();
        }
        let text: String = trimmed.chars().take(MAX_INPUT_CHARS).collect();
        let analysis = Analysis::new(&text);

        let cue_intent = CUE_RULES
            .iter()
            .find(|rule| rule.cues.iter().any(|cue| analysis.has_cue(cue)))
            .map(|rule| rule.intent);

        let classification = match cue_intent {
            Some(Intent::Compare) => self.classify_compare(&analysis, history),
            Some(Intent::LeagueTable) => self.classify_table(&analysis, history),
            Some(intent) => self.classify_single(intent, &analysis, history),
            None => self.classify_default(&analysis, history),
        };
        debug!(
            "Classified '{}' as {} with {:?}",
            text, classification.intent, classification.entities
        );
        classification
    }

    fn classify_single(
        &self,
        intent: Intent,
        analysis: &Analysis,
        history: &ConversationHistory,
    ) -> Classification {
        let mut entities = Entities::new();
        let role = match intent.required_role() {
            Some(role) => role,
            None => return Classification { intent, entities },
        };

        let candidates = self.candidates(analysis);
        let chosen = if role == EntityRole::Team {
            candidates
                .iter()
                .find(|c| self.is_team(c))
                .or_else(|| candidates.first())
                .cloned()
        } else {
            candidates.first().cloned()
        };

        let value = chosen.or_else(|| resolve_back_reference(role, history));
        if let Some(value) = value {
            entities.insert(role, value);
        }
        Classification { intent, entities }
    }

    fn classify_table(&self, analysis: &Analysis, history: &ConversationHistory) -> Classification {
        let mut entities = Entities::new();
        let competition = self
            .lexicon_match(analysis, COMPETITIONS)
            .or_else(|| self.capture(&self.competition_patterns, analysis))
            .or_else(|| {
                history
                    .last_entity_for(EntityRole::Competition)
                    .map(str::to_string)
            });
        if let Some(name) = competition {
            entities.insert(EntityRole::Competition, name);
        }
        Classification {
            intent: Intent::LeagueTable,
            entities,
        }
    }

    fn classify_compare(&self, analysis: &Analysis, history: &ConversationHistory) -> Classification {
        let mut names = self.candidates(analysis);
        if names.len() < 2 {
            if let Some((left, right)) = self.split_comparison(analysis) {
                names = vec![left, right];
            }
        }

        if names.len() < 2 && analysis.pronoun_kind().is_some() {
            let from_history = |roles: &[EntityRole]| -> Vec<String> {
                history
                    .recent_values(roles, 2)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            };
            let mut remembered = from_history(&EntityRole::PLAYERS[..]);
            if remembered.len() < 2 && names.is_empty() {
                let teams = from_history(&EntityRole::TEAMS[..]);
                if teams.len() == 2 {
                    remembered = teams;
                }
            }
            match names.first().cloned() {
                // "compare him with Ronaldo": the pronoun is the other side.
                Some(named) => {
                    if let Some(other) = remembered
                        .into_iter()
                        .find(|v| !v.eq_ignore_ascii_case(&named))
                    {
                        names = vec![other, named];
                    }
                }
                // "compare them": oldest of the two first.
                None if remembered.len() == 2 => {
                    names = remembered.into_iter().rev().collect();
                }
                None => {}
            }
        }

        let mut entities = Entities::new();
        if let [left, right, ..] = names.as_slice() {
            let (first, second) = if self.is_team(left) && self.is_team(right) {
                (EntityRole::Team1, EntityRole::Team2)
            } else {
                (EntityRole::Player1, EntityRole::Player2)
            };
            entities.insert(first, left.clone());
            entities.insert(second, right.clone());
        } else if let Some(only) = names.first() {
            entities.insert(EntityRole::Player1, only.clone());
        }
        Classification {
            intent: Intent::Compare,
            entities,
        }
    }

    fn classify_default(&self, analysis: &Analysis, history: &ConversationHistory) -> Classification {
        let candidates = self.candidates(analysis);
        let mut entities = Entities::new();

        if let Some(team) = candidates.iter().find(|c| self.is_team(c)) {
            entities.insert(EntityRole::Team, team.clone());
            return Classification {
                intent: Intent::TeamInfo,
                entities,
            };
        }
        if let Some(name) = candidates.first() {
            let (intent, role) = match self.fallback {
                NameFallback::Player => (Intent::PlayerInfo, EntityRole::Player),
                NameFallback::Team => (Intent::TeamInfo, EntityRole::Team),
            };
            entities.insert(role, name.clone());
            return Classification { intent, entities };
        }
        if let Some(competition) = self.lexicon_match(analysis, COMPETITIONS) {
            entities.insert(EntityRole::Competition, competition);
            return Classification {
                intent: Intent::LeagueTable,
                entities,
            };
        }

        let resolved = match analysis.pronoun_kind() {
            Some(PronounKind::Player) => history
                .last_entity_for(EntityRole::Player)
                .map(|v| (Intent::PlayerInfo, EntityRole::Player, v)),
            Some(PronounKind::Team) => history
                .last_entity_for(EntityRole::Team)
                .map(|v| (Intent::TeamInfo, EntityRole::Team, v))
                .or_else(|| {
                    history
                        .last_entity_for(EntityRole::Player)
                        .map(|v| (Intent::PlayerInfo, EntityRole::Player, v))
                }),
            None => None,
        };
        match resolved {
            Some((intent, role, value)) => {
                entities.insert(role, value.to_string());
                Classification { intent, entities }
            }
            None => Classification::unknown(),
        }
    }

    /// Candidate names in priority order, de-duplicated, competitions excluded.
    fn candidates(&self, analysis: &Analysis) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();

        for caps in self.quoted.captures_iter(analysis.original) {
            if let Some(m) = caps.iter().skip(1).flatten().next() {
                self.push_candidate(&mut found, m.as_str());
            }
        }
        for span in proper_noun_spans(analysis.original) {
            self.push_candidate(&mut found, &span);
        }
        for (key, _) in KNOWN_TEAMS {
            if analysis.contains_phrase(key) {
                self.push_candidate(&mut found, key);
            }
        }
        for team in &self.extra_teams {
            if analysis.contains_phrase(team) {
                self.push_candidate(&mut found, team);
            }
        }
        if found.is_empty() {
            if let Some(captured) = self.capture(&self.name_patterns, analysis) {
                self.push_candidate(&mut found, &captured);
            }
        }
        found
    }

    fn push_candidate(&self, found: &mut Vec<String>, name: &str) {
        let name = self.canonical(name);
        if !name.is_empty()
            && !is_competition_fragment(&name)
            && !found.iter().any(|f| f.eq_ignore_ascii_case(&name))
        {
            found.push(name);
        }
    }

    /// Lexicon display form for known names, otherwise the name as written.
    fn canonical(&self, name: &str) -> String {
        let trimmed = name.trim();
        if let Some(display) = lexicon::lookup(KNOWN_TEAMS, trimmed) {
            return display.to_string();
        }
        if let Some(extra) = self
            .extra_teams
            .iter()
            .find(|t| t.eq_ignore_ascii_case(trimmed))
        {
            return title_case(extra);
        }
        trimmed.to_string()
    }

    fn is_team(&self, name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        lexicon::lookup(KNOWN_TEAMS, &lower).is_some()
            || KNOWN_TEAMS.iter().any(|(_, display)| display.to_lowercase() == lower)
            || self.extra_teams.contains(&lower)
            || lexicon::has_club_indicator(&lower)
    }

    fn lexicon_match(&self, analysis: &Analysis, table: &[(&str, &str)]) -> Option<String> {
        table
            .iter()
            .find(|(key, _)| analysis.contains_phrase(key))
            .map(|(_, display)| display.to_string())
    }

    /// First capture that cleans up into something name-like.
    fn capture(&self, patterns: &[Regex], analysis: &Analysis) -> Option<String> {
        patterns.iter().find_map(|re| {
            let raw = re.captures(&analysis.lower)?.get(1)?.as_str();
            let cleaned = clean_name(raw)?;
            Some(
                lexicon::lookup(COMPETITIONS, &cleaned)
                    .map(str::to_string)
                    .unwrap_or_else(|| title_case(&cleaned)),
            )
        })
    }

    fn split_comparison(&self, analysis: &Analysis) -> Option<(String, String)> {
        let text = analysis
            .lower
            .trim()
            .trim_end_matches(|c: char| matches!(c, '?' | '!' | '.'));
        let caps = self.comparison_split.captures(text)?;
        let left = clean_name(caps.get(1)?.as_str())?;
        let right = clean_name(caps.get(2)?.as_str())?;
        Some((self.canonical(&title_case(&left)), self.canonical(&title_case(&right))))
    }
}

/// Whether a club question is about the players rather than the club itself
/// ("Arsenal squad", "who plays for Chelsea's roster").
pub fn asks_for_squad(utterance: &str) -> bool {
    Analysis::new(utterance)
        .words
        .iter()
        .any(|w| lexicon::SQUAD_WORDS.contains(&w.trim_end_matches("'s")))
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        anyhow!(FootbotError::Pattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
    })
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile(p)).collect()
}

/// "Premier League", or the "Serie" left over when "A" is dropped from a span.
fn is_competition_fragment(name: &str) -> bool {
    let lower = name.to_lowercase();
    let prefix = format!("{} ", lower);
    COMPETITIONS
        .iter()
        .any(|(key, display)| *key == lower || key.starts_with(&prefix) || display.to_lowercase() == lower)
}

/// Name a follow-up refers to when it carries no name of its own.
fn resolve_back_reference(role: EntityRole, history: &ConversationHistory) -> Option<String> {
    if let Some(value) = history.last_entity_for(role) {
        return Some(value.to_string());
    }
    let family: &[EntityRole] = match role {
        EntityRole::Player => &EntityRole::PLAYERS,
        EntityRole::Team => &EntityRole::TEAMS,
        _ => return None,
    };
    history
        .recent_values(family, 1)
        .first()
        .map(|v| v.to_string())
}

/// Strips punctuation and stop words from a captured fragment and checks
/// that what is left looks like a name.
fn clean_name(raw: &str) -> Option<String> {
    let words: Vec<&str> = raw
        .split_whitespace()
        .map(|w| {
            let w = w.trim_matches(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''));
            w.strip_suffix("'s").unwrap_or(w)
        })
        .filter(|w| !w.is_empty() && !lexicon::is_stop_word(w) && !lexicon::is_sentence_starter(w))
        .collect();
    let name = words.join(" ");
    is_likely_name(&name).then_some(name)
}

fn is_likely_name(name: &str) -> bool {
    let len = name.chars().count();
    let word_count = name.split_whitespace().count();
    (2..=50).contains(&len)
        && (1..=4).contains(&word_count)
        && name
            .chars()
            .all(|c| c.is_alphabetic() || c.is_ascii_digit() || matches!(c, ' ' | '-' | '\'' | '.'))
        && name.chars().any(char::is_alphabetic)
}

/// Runs of capitalized words, e.g. "Tell me about Virgil van Dijk" →
/// `["Virgil van Dijk"]`. Function words never join a span, and neither does
/// a sentence starter in first position ("Get", "Has", "Cheers"). A particle
/// joins only between two capitalized words; trailing punctuation ends a span.
fn proper_noun_spans(text: &str) -> Vec<String> {
    let mut spans = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut pending_particle: Option<String> = None;
    let mut sentence_start = true;

    for raw in text.split_whitespace() {
        let ends_span = raw.ends_with(|c: char| matches!(c, ',' | '?' | '!' | '.' | ';' | ':'));
        let opens_sentence = sentence_start;
        sentence_start = raw.ends_with(|c: char| matches!(c, '?' | '!' | '.'));
        let token = raw.trim_matches(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''));
        let token = token
            .strip_suffix("'s")
            .or_else(|| token.strip_suffix("’s"))
            .unwrap_or(token)
            .trim_end_matches('\'');

        let capitalized = token.chars().next().is_some_and(char::is_uppercase);
        let starter = opens_sentence && lexicon::is_sentence_starter(token);
        if capitalized && !starter && !lexicon::is_function_word(token) {
            if let Some(particle) = pending_particle.take() {
                current.push(particle);
            }
            current.push(token.to_string());
        } else if !current.is_empty()
            && !ends_span
            && pending_particle.is_none()
            && lexicon::is_particle(token)
        {
            pending_particle = Some(token.to_string());
            continue;
        } else {
            pending_particle = None;
            flush(&mut current, &mut spans);
        }
        if ends_span {
            pending_particle = None;
            flush(&mut current, &mut spans);
        }
    }
    flush(&mut current, &mut spans);
    spans
}

fn flush(current: &mut Vec<String>, spans: &mut Vec<String>) {
    if !current.is_empty() {
        spans.push(current.join(" "));
        current.clear();
    }
}
