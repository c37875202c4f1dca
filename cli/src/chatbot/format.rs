//! Small text formatting helpers shared by the extractor and the composer.

use super::lexicon::NAME_PARTICLES;

/// Title-cases a name: `"virgil van dijk"` → `"Virgil van Dijk"`.
/// Name particles stay lower-case unless they start the name; hyphenated
/// parts are capitalized individually.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && NAME_PARTICLES.contains(&lower.as_str()) {
                lower
            } else {
                lower
                    .split('-')
                    .map(capitalize)
                    .collect::<Vec<_>>()
                    .join("-")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Formats a market value. Numbers are treated as euros (`180000000` →
/// `€180.00m`); strings that already carry a currency symbol pass through.
pub fn market_value(raw: &serde_json::Value) -> Option<String> {
    match raw {
        serde_json::Value::Number(n) => n.as_f64().map(euros),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("unknown") || s == "-" {
                None
            } else if s.contains('€') || s.contains('$') || s.contains('£') {
                Some(s.to_string())
            } else if let Ok(n) = s.replace(',', "").parse::<f64>() {
                Some(euros(n))
            } else {
                Some(format!("€{}", s))
            }
        }
        _ => None,
    }
}

fn euros(amount: f64) -> String {
    if amount >= 1_000_000.0 {
        format!("€{:.2}m", amount / 1_000_000.0)
    } else if amount >= 1_000.0 {
        format!("€{:.0}k", amount / 1_000.0)
    } else {
        format!("€{:.0}", amount)
    }
}

/// Expands position abbreviations (`cf` → `Centre-Forward`). Unknown values
/// are returned title-cased.
pub fn position_name(raw: &str) -> String {
    let expanded = match raw.trim().to_lowercase().as_str() {
        "gk" | "goalkeeper" => "Goalkeeper",
        "cb" | "centre-back" | "center-back" => "Centre-Back",
        "lb" | "left-back" => "Left-Back",
        "rb" | "right-back" => "Right-Back",
        "dm" | "cdm" | "defensive midfield" => "Defensive Midfield",
        "cm" | "central midfield" => "Central Midfield",
        "am" | "cam" | "attacking midfield" => "Attacking Midfield",
        "lm" | "left midfield" => "Left Midfield",
        "rm" | "right midfield" => "Right Midfield",
        "lw" | "left winger" => "Left Winger",
        "rw" | "right winger" => "Right Winger",
        "cf" | "centre-forward" | "center-forward" => "Centre-Forward",
        "ss" | "second striker" => "Second Striker",
        "st" | "striker" => "Striker",
        _ => return title_case(raw),
    };
    expanded.to_string()
}

/// Truncates to at most `max` characters, ending with `...` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// `["a", "b", "c"]` → `"a, b and c"`.
pub fn join_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{} and {}", rest.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title_case_keeps_particles() {
        assert_eq!(title_case("virgil van dijk"), "Virgil van Dijk");
        assert_eq!(title_case("kylian mbappé"), "Kylian Mbappé");
        assert_eq!(title_case("alexander-arnold"), "Alexander-Arnold");
        assert_eq!(title_case("de bruyne"), "De Bruyne");
    }

    #[test]
    fn test_market_value() {
        assert_eq!(market_value(&json!(180000000)), Some("€180.00m".into()));
        assert_eq!(market_value(&json!(750000)), Some("€750k".into()));
        assert_eq!(market_value(&json!("€25.00m")), Some("€25.00m".into()));
        assert_eq!(market_value(&json!("$3m")), Some("$3m".into()));
        assert_eq!(market_value(&json!("Unknown")), None);
        assert_eq!(market_value(&json!(null)), None);
    }

    #[test]
    fn test_position_name() {
        assert_eq!(position_name("cf"), "Centre-Forward");
        assert_eq!(position_name("GK"), "Goalkeeper");
        assert_eq!(position_name("right winger"), "Right Winger");
        assert_eq!(position_name("sweeper"), "Sweeper");
    }

    #[test]
    fn test_truncate_and_join() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long sentence", 10), "a very...");
        let items = vec!["Barcelona".to_string(), "PSG".into(), "Inter Miami".into()];
        assert_eq!(join_list(&items), "Barcelona, PSG and Inter Miami");
        assert_eq!(join_list(&items[..1]), "Barcelona");
    }
}
