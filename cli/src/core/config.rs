//! # Footbot Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module implements the configuration system for Footbot, handling loading,
//! merging, validation, and access to configuration data. It supports a multi-level
//! configuration approach that combines defaults, user settings, project-specific
//! overrides and environment variables.
//!
//! ## Architecture
//!
//! Configuration sources (later sources win):
//! 1. Default values defined in the code
//! 2. User-specific `config.toml` in the platform config dir (e.g. `~/.config/footbot/`)
//! 3. Project-specific `.footbot.toml` in the current directory or ancestors
//! 4. An explicit `--config <path>` file
//! 5. Environment: `FOOTBOT_API_URL`, `GEMINI_API_KEY`, `FOOTBOT_STYLE`
//!
//! Files are merged table-by-table before deserialization, so a project file
//! only needs to mention the keys it changes. Command-line flags (`--style`,
//! `--no-llm`, `--api-url`) are applied on top by the command handlers.
//!
//! ## Examples
//!
//! ```toml
//! [api]
//! base_url = "https://transfermarkt-api.fly.dev"
//! max_retries = 2
//!
//! [llm]
//! model = "gemini-2.0-flash"
//!
//! [chat]
//! history_limit = 10
//! default_style = "professional"
//! unknown_name_fallback = "player"
//! extra_teams = ["Celtic", "Rangers"]
//! ```
//!
//! ```rust,ignore
//! let cfg = config::load_config(None)?;
//! let limit = cfg.chat.history_limit;
//! ```
//!
use crate::chatbot::types::{NameFallback, ResponseStyle};
use crate::core::error::{FootbotError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Settings for the football statistics API client.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ApiConfig {
    /// Base URL of the Transfermarkt API deployment.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Retries for network errors and rate limiting (not counting the first attempt).
    pub max_retries: u32,
    /// Initial backoff; doubled after every retry.
    pub backoff_ms: u64,
    /// How long a successful response is memoized. `0` disables the cache.
    pub cache_ttl_secs: u64,
    /// Most responses kept at once; the least recently used go first. `0` disables the cache.
    pub cache_capacity: usize,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://transfermarkt-api.fly.dev".to_string(),
            timeout_secs: 10,
            max_retries: 2,
            backoff_ms: 500,
            cache_ttl_secs: 3600,
            cache_capacity: 1000,
            user_agent: "Football-Chatbot/1.0".to_string(),
        }
    }
}

/// Settings for the optional LLM used to phrase replies.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct LlmConfig {
    /// Set to `false` to always use the built-in templates.
    pub enabled: bool,
    /// Gemini API key. Usually supplied through `GEMINI_API_KEY` instead.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 30,
            temperature: 0.7,
            max_output_tokens: 300,
        }
    }
}

impl LlmConfig {
    /// An LLM is only used when enabled *and* a non-empty key is present.
    pub fn is_available(&self) -> bool {
        self.enabled
            && self
                .api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty())
    }
}

/// Settings for the conversation itself.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ChatConfig {
    /// Maximum number of turns kept per session (oldest evicted first).
    pub history_limit: usize,
    /// Style new sessions start with.
    pub default_style: ResponseStyle,
    /// What an unrecognized capitalized name is assumed to be.
    pub unknown_name_fallback: NameFallback,
    /// Club names added to the built-in lexicon of known teams.
    pub extra_teams: Vec<String>,
    /// Name shown in the REPL prompt.
    pub bot_name: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: 10,
            default_style: ResponseStyle::Casual,
            unknown_name_fallback: NameFallback::Player,
            extra_teams: Vec::new(),
            bot_name: "Footbot".to_string(),
        }
    }
}

const PROJECT_CONFIG_FILENAME: &str = ".footbot.toml";

/// Loads, merges, overrides and validates the configuration.
///
/// `explicit` is the `--config` path (tilde-expanded); it must exist when given.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut merged = toml::Table::new();

    if let Some(user) = load_user_config()? {
        merge_tables(&mut merged, user);
    }
    if let Some(project) = load_project_config()? {
        merge_tables(&mut merged, project);
    }
    if let Some(path) = explicit {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
        info!("Loading configuration from: {}", expanded.display());
        merge_tables(&mut merged, load_table_from_path(&expanded)?);
    }

    let mut config: Config = toml::Value::Table(merged)
        .try_into()
        .context("Failed to interpret merged configuration")?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", redacted(&config));
    Ok(config)
}

fn load_user_config() -> Result<Option<toml::Table>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "Footbot", "footbot") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_table_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<toml::Table>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(path) = find_project_config_path(&current_dir) {
        info!("Loading project configuration from: {}", path.display());
        load_table_from_path(&path).map(Some)
    } else {
        debug!("No project configuration file (.footbot.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

/// Walks up from `start` looking for `.footbot.toml`, stopping at a repository root.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_table_from_path(path: &Path) -> Result<toml::Table> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Recursively overlays `overlay` onto `base`. Nested tables merge key by key;
/// any other value (including arrays) replaces the base value.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Applies environment overrides. `lookup` is injected so tests don't touch the process env.
fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("FOOTBOT_API_URL").filter(|v| !v.trim().is_empty()) {
        debug!("FOOTBOT_API_URL overrides api.base_url");
        config.api.base_url = url;
    }
    if let Some(key) = lookup("GEMINI_API_KEY").filter(|v| !v.trim().is_empty()) {
        debug!("GEMINI_API_KEY provided via environment");
        config.llm.api_key = Some(key);
    }
    if let Some(style) = lookup("FOOTBOT_STYLE").filter(|v| !v.trim().is_empty()) {
        config.chat.default_style = style
            .parse()
            .context("Invalid FOOTBOT_STYLE environment variable")?;
    }
    Ok(())
}

pub(crate) fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating final configuration...");
    if config.chat.history_limit == 0 {
        return Err(anyhow!(FootbotError::Config(
            "chat.history_limit must be at least 1".to_string()
        )));
    }
    for (name, url) in [("api.base_url", &config.api.base_url), ("llm.base_url", &config.llm.base_url)] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!(FootbotError::Config(format!(
                "{} must be an http(s) URL, got '{}'",
                name, url
            ))));
        }
    }
    if config.api.timeout_secs == 0 || config.llm.timeout_secs == 0 {
        return Err(anyhow!(FootbotError::Config(
            "timeouts must be greater than zero seconds".to_string()
        )));
    }
    if config.api.max_retries > 5 {
        return Err(anyhow!(FootbotError::Config(format!(
            "api.max_retries is {}; at most 5 retries are allowed",
            config.api.max_retries
        ))));
    }
    if config.chat.extra_teams.iter().any(|t| t.trim().is_empty()) {
        return Err(anyhow!(FootbotError::Config(
            "chat.extra_teams cannot contain empty names".to_string()
        )));
    }
    debug!("Configuration validation successful.");
    Ok(())
}

/// Copy of the config safe to log (API key masked).
fn redacted(config: &Config) -> Config {
    let mut copy = config.clone();
    if copy.llm.api_key.is_some() {
        copy.llm.api_key = Some("***".to_string());
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_deserialize_partial_toml_keeps_defaults() {
        let toml_content = r#"
            [api]
            base_url = "http://localhost:8000"
            max_retries = 0

            [chat]
            history_limit = 4
            default_style = "detailed"
            unknown_name_fallback = "team"
            extra_teams = ["Celtic"]
        "#;

        let config: Config = toml::from_str(toml_content).expect("Failed to parse TOML");

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.max_retries, 0);
        assert_eq!(config.api.timeout_secs, 10); // Default
        assert_eq!(config.chat.history_limit, 4);
        assert_eq!(config.chat.default_style, ResponseStyle::Detailed);
        assert_eq!(config.chat.unknown_name_fallback, NameFallback::Team);
        assert_eq!(config.chat.extra_teams, vec!["Celtic"]);
        assert_eq!(config.llm, LlmConfig::default());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[chat]\nhistory = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_tables_overlays_nested_keys() {
        let mut base: toml::Table = toml::from_str(
            "[api]\nbase_url = \"http://a\"\ntimeout_secs = 5\n[chat]\nextra_teams = [\"X\"]\n",
        )
        .unwrap();
        let overlay: toml::Table =
            toml::from_str("[api]\ntimeout_secs = 9\n[chat]\nextra_teams = [\"Y\"]\n").unwrap();

        merge_tables(&mut base, overlay);
        let config: Config = toml::Value::Table(base).try_into().unwrap();

        assert_eq!(config.api.base_url, "http://a");
        assert_eq!(config.api.timeout_secs, 9);
        assert_eq!(config.chat.extra_teams, vec!["Y"]);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("FOOTBOT_API_URL", "http://127.0.0.1:9999"),
            ("GEMINI_API_KEY", "secret"),
            ("FOOTBOT_STYLE", "Professional"),
        ]);
        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.api.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.llm.api_key.as_deref(), Some("secret"));
        assert!(config.llm.is_available());
        assert_eq!(config.chat.default_style, ResponseStyle::Professional);
    }

    #[test]
    fn test_env_override_bad_style_is_error() {
        let mut config = Config::default();
        let result = apply_env_overrides(&mut config, |k| {
            (k == "FOOTBOT_STYLE").then(|| "loud".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_llm_unavailable_without_key_or_when_disabled() {
        let mut llm = LlmConfig::default();
        assert!(!llm.is_available());
        llm.api_key = Some("  ".into());
        assert!(!llm.is_available());
        llm.api_key = Some("k".into());
        llm.enabled = false;
        assert!(!llm.is_available());
    }

    #[test]
    fn test_validate_config_valid_defaults() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_config_zero_history() {
        let mut config = Config::default();
        config.chat.history_limit = 0;
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("history_limit must be at least 1"));
    }

    #[test]
    fn test_validate_config_bad_url() {
        let mut config = Config::default();
        config.api.base_url = "ftp://nope".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_find_project_config_stops_at_git_root() {
        let temp_dir = tempdir().unwrap();
        let repo = temp_dir.path().join("repo");
        let nested = repo.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir(repo.join(".git")).unwrap();

        assert_eq!(find_project_config_path(&nested), None);

        fs::write(repo.join("a").join(PROJECT_CONFIG_FILENAME), "").unwrap();
        assert_eq!(
            find_project_config_path(&nested),
            Some(repo.join("a").join(PROJECT_CONFIG_FILENAME))
        );
    }

    #[test]
    fn test_load_explicit_config_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(&path, "[chat]\nhistory_limit = 3\n").unwrap();

        let table = load_table_from_path(&path).unwrap();
        let config: Config = toml::Value::Table(table).try_into().unwrap();
        assert_eq!(config.chat.history_limit, 3);
    }
}
