//! Static word lists used by the intent extractor.
//!
//! Keys are lower-case; where a display form differs from simple title-casing
//! it is listed next to the key.

/// Clubs recognized by name. `(lower-case key, display name)`.
pub const KNOWN_TEAMS: &[(&str, &str)] = &[
    ("real madrid", "Real Madrid"),
    ("barcelona", "Barcelona"),
    ("fc barcelona", "Barcelona"),
    ("manchester united", "Manchester United"),
    ("man united", "Manchester United"),
    ("man utd", "Manchester United"),
    ("manchester city", "Manchester City"),
    ("man city", "Manchester City"),
    ("liverpool", "Liverpool"),
    ("chelsea", "Chelsea"),
    ("arsenal", "Arsenal"),
    ("tottenham", "Tottenham Hotspur"),
    ("tottenham hotspur", "Tottenham Hotspur"),
    ("spurs", "Tottenham Hotspur"),
    ("bayern munich", "Bayern Munich"),
    ("bayern", "Bayern Munich"),
    ("psg", "Paris Saint-Germain"),
    ("paris saint-germain", "Paris Saint-Germain"),
    ("juventus", "Juventus"),
    ("ac milan", "AC Milan"),
    ("inter milan", "Inter Milan"),
    ("atletico madrid", "Atlético Madrid"),
    ("atlético madrid", "Atlético Madrid"),
    ("borussia dortmund", "Borussia Dortmund"),
    ("dortmund", "Borussia Dortmund"),
    ("ajax", "Ajax"),
    ("porto", "FC Porto"),
    ("fc porto", "FC Porto"),
    ("benfica", "Benfica"),
    ("inter miami", "Inter Miami"),
    ("al nassr", "Al-Nassr"),
    ("al-nassr", "Al-Nassr"),
];

/// Competitions whose tables can be requested. `(lower-case key, display name)`.
pub const COMPETITIONS: &[(&str, &str)] = &[
    ("premier league", "Premier League"),
    ("epl", "Premier League"),
    ("la liga", "La Liga"),
    ("laliga", "La Liga"),
    ("bundesliga", "Bundesliga"),
    ("serie a", "Serie A"),
    ("ligue 1", "Ligue 1"),
    ("eredivisie", "Eredivisie"),
    ("primeira liga", "Primeira Liga"),
    ("champions league", "Champions League"),
    ("europa league", "Europa League"),
    ("conference league", "Conference League"),
    ("mls", "MLS"),
    ("major league soccer", "MLS"),
];

/// A trailing (or leading) word that marks a name as a club.
pub const CLUB_INDICATORS: &[&str] = &[
    "fc", "afc", "cf", "ac", "united", "city", "athletic", "hotspur", "rovers", "wanderers",
    "albion",
];

/// Words that may appear lower-case inside a person's name.
pub const NAME_PARTICLES: &[&str] = &["van", "de", "da", "von", "dos", "der", "den", "di", "del"];

/// Pronouns that point back at a player.
pub const PLAYER_PRONOUNS: &[&str] = &["he", "him", "his", "she", "her", "hers"];

/// Pronouns that point back at a club first, then at a player.
pub const TEAM_PRONOUNS: &[&str] = &["they", "them", "their", "it", "its"];

/// Capitalized words that never start or continue a proper-noun span.
pub const FUNCTION_WORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "bio", "bye", "can", "career", "club", "compare", "cool",
    "could", "details", "did", "do", "does", "evening", "for", "give", "good", "great",
    "greetings", "hello", "help", "hey", "hi", "his", "her", "he", "she", "him", "how", "i",
    "in", "info", "information", "is", "it", "its", "market", "me", "morning", "my",
    "nice", "no", "of", "ok", "okay", "or", "please", "profile", "show", "squad", "stadium",
    "standings", "stats", "statistics", "table", "team", "tell", "thank", "thanks", "than",
    "the", "their", "them", "they", "to", "transfer", "transfers", "value", "versus", "vs",
    "was", "what", "when", "where", "which", "who", "whos", "who's", "why", "with", "worth",
    "yes", "you",
];

/// Imperatives, auxiliaries and greetings that are capitalized only because
/// they open a sentence ("Get his stats", "Has he moved?", "Cheers").
pub const SENTENCE_STARTERS: &[&str] = &[
    "get", "list", "find", "show", "give", "tell", "fetch", "check", "search", "look",
    "display", "describe", "explain", "let", "has", "have", "had", "is", "are", "was",
    "were", "does", "do", "did", "can", "could", "should", "would", "cheers", "hello", "hi",
    "hey", "howdy", "hiya", "yo", "greetings", "thanks", "ta", "morning", "evening",
    "afternoon", "goodbye", "bye", "welcome",
];

/// Words that turn a club question into a squad listing.
pub const SQUAD_WORDS: &[&str] = &["squad", "squads", "players", "roster", "lineup", "line-up"];

/// Words stripped from captured names before they are used.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "any", "are", "be", "better", "bio", "can", "career", "club",
    "compare", "could", "current", "currently", "details", "did", "do", "does", "find",
    "football", "for", "get", "give", "history", "how", "i", "in", "info", "information", "is",
    "league", "many", "market", "me", "moves", "much", "now", "of", "old", "on", "or", "please",
    "player", "position", "profile", "right", "season", "show", "soccer", "standings", "stats",
    "statistics", "team", "tell", "than", "the", "this", "top", "transfer", "transfers", "value",
    "versus", "vs", "was", "what", "what's", "whats", "where", "which", "who", "who's", "whos",
    "with", "worth", "you", "he", "him", "his", "she", "her", "hers", "they", "them", "their",
    "it", "its",
];

pub fn lookup<'a>(table: &'a [(&str, &'a str)], key: &str) -> Option<&'a str> {
    let key = key.trim().to_lowercase();
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, display)| *display)
}

pub fn is_function_word(word: &str) -> bool {
    FUNCTION_WORDS.contains(&word.to_lowercase().as_str())
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word.to_lowercase().as_str())
}

pub fn is_sentence_starter(word: &str) -> bool {
    SENTENCE_STARTERS.contains(&word.to_lowercase().as_str())
}

pub fn is_particle(word: &str) -> bool {
    NAME_PARTICLES.contains(&word)
}

/// True when the first or last word of `name` is a club indicator ("FC", "United", ...).
pub fn has_club_indicator(name: &str) -> bool {
    let lower = name.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    if words.len() < 2 {
        return false;
    }
    let first = words[0];
    let last = words[words.len() - 1];
    CLUB_INDICATORS.contains(&last) || matches!(first, "fc" | "afc" | "ac")
}
