//! # Footbot Statistics API Module (`common::transfermarkt`)
//!
//! File: cli/src/common/transfermarkt/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module is the boundary to the external football statistics service
//! (a Transfermarkt API deployment). The chat engine never talks HTTP itself;
//! it calls the `FootballApi` trait and receives an `ApiResult`, which is
//! either a JSON payload or a categorized `ApiFailure`.
//!
//! ## Architecture
//!
//! - **`FootballApi`**: one async method per logical operation. Implemented by
//!   `TransfermarktClient` in production and by in-memory fakes in tests.
//! - **`client`**: the `reqwest` implementation with timeout, retry/backoff
//!   (via `common::network`) and response memoization.
//! - **`cache`**: the TTL cache used by the client.
//!
//! Status mapping: 404 → `NotFound`, 429 → `RateLimited`, 5xx/connect/timeout
//! → `NetworkError`, any other non-2xx or undecodable body → `Malformed`.
//! Only `NetworkError` and `RateLimited` are retried.
//!
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub mod cache;
pub mod client;

pub use cache::CacheStats;
pub use client::TransfermarktClient;

/// Why an API call produced no usable payload.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiFailure {
    #[error("no results for '{query}'")]
    NotFound { query: String },

    #[error("rate limited by the statistics API")]
    RateLimited,

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiFailure {
    /// Whether retrying the same request might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiFailure::NetworkError(_) | ApiFailure::RateLimited)
    }
}

/// Outcome of one API operation.
pub type ApiResult = Result<Value, ApiFailure>;

/// The statistics operations the chat engine relies on.
///
/// Search operations resolve to the *top hit* (or `NotFound` when the search
/// is empty); the others take the id found in that hit.
#[allow(async_fn_in_trait)]
pub trait FootballApi {
    async fn search_player(&self, name: &str) -> ApiResult;
    async fn get_player_profile(&self, player_id: &str) -> ApiResult;
    async fn search_club(&self, name: &str) -> ApiResult;
    async fn get_club_profile(&self, club_id: &str) -> ApiResult;
    /// The club's current squad.
    async fn get_club_players(&self, club_id: &str) -> ApiResult;
    async fn get_transfers(&self, player_id: &str) -> ApiResult;
    /// Resolves the competition by name, then fetches its table.
    async fn get_standings(&self, competition: &str) -> ApiResult;
}

/// Extracts the `id` of a search hit. The API is inconsistent about numeric vs string ids.
pub fn id_of(hit: &Value) -> Option<String> {
    match hit.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Returns the first element of `payload["results"]`.
pub fn first_result(payload: &Value, query: &str) -> ApiResult {
    let results = payload
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiFailure::Malformed("search response has no 'results' array".into()))?;
    results.first().cloned().ok_or_else(|| ApiFailure::NotFound {
        query: query.to_string(),
    })
}

/// Overlays the fields of a search hit onto a detail payload, keeping
/// detail fields where both exist only if the hit's value is null.
pub fn merge_hit(mut detail: Value, hit: &Value) -> Value {
    if let (Some(target), Some(source)) = (detail.as_object_mut(), hit.as_object()) {
        for (key, value) in source {
            if !value.is_null() || !target.contains_key(key) {
                target.insert(key.clone(), value.clone());
            }
        }
    }
    detail
}
