//! # Transfermarkt HTTP Client
//!
//! File: cli/src/common/transfermarkt/client.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `reqwest`-based implementation of `FootballApi`. Every GET goes through
//! `get_json`, which consults the response cache, performs the request with
//! bounded retries, maps the outcome onto `ApiFailure`, and memoizes
//! successes.
//!
//! Endpoints used:
//! - `GET /players/search?query=<name>` and `GET /clubs/search?query=<name>`
//! - `GET /players/{id}`, `GET /players/{id}/transfers`, `GET /clubs/{id}`,
//!   `GET /clubs/{id}/players`
//! - `GET /competitions/search?query=<name>` then `GET /competitions/{id}/tables`
//!
use super::cache::{cache_key, CacheStats, ResponseCache};
use super::{first_result, id_of, ApiFailure, ApiResult, FootballApi};
use crate::common::network::{retry_with_backoff, RetryPolicy};
use crate::core::config::ApiConfig;
use crate::core::error::{FootbotError, Result};
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for a Transfermarkt API deployment.
#[derive(Debug)]
pub struct TransfermarktClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
    cache: ResponseCache,
}

impl TransfermarktClient {
    /// Builds the client from the `[api]` configuration section.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|source| FootbotError::HttpClient { source })?;

        info!("Statistics API client ready for {}", config.base_url);
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::new(config.max_retries, Duration::from_millis(config.backoff_ms)),
            cache: ResponseCache::new(
                Duration::from_secs(config.cache_ttl_secs),
                config.cache_capacity,
            ),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Data cache cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// GET `endpoint` with query `params`. `subject` names the thing being
    /// looked up and is carried by `NotFound`.
    async fn get_json(&self, endpoint: &str, params: &[(&str, &str)], subject: &str) -> ApiResult {
        let key = cache_key(endpoint, params);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(cached);
        }

        let url = format!("{}{}", self.base_url, endpoint);
        let result = retry_with_backoff(&self.retry, ApiFailure::is_transient, || {
            self.fetch_once(&url, params, subject)
        })
        .await;

        match &result {
            Ok(value) => self.cache.insert(key, value.clone()),
            Err(failure) => warn!("Request to {} failed: {}", endpoint, failure),
        }
        result
    }

    async fn fetch_once(&self, url: &str, params: &[(&str, &str)], subject: &str) -> ApiResult {
        debug!("GET {} {:?}", url, params);
        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if let Some(failure) = status_failure(status, subject) {
            return Err(failure);
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiFailure::Malformed(format!("invalid JSON body: {}", e)))
    }

    /// Search endpoint → top hit.
    async fn search(&self, endpoint: &str, name: &str) -> ApiResult {
        let payload = self.get_json(endpoint, &[("query", name)], name).await?;
        first_result(&payload, name)
    }
}

/// Maps a non-success status to a failure; `None` for 2xx.
fn status_failure(status: StatusCode, subject: &str) -> Option<ApiFailure> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::NOT_FOUND => ApiFailure::NotFound {
            query: subject.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => ApiFailure::RateLimited,
        s if s.is_server_error() => ApiFailure::NetworkError(format!("server returned {}", s)),
        s => ApiFailure::Malformed(format!("unexpected status {}", s)),
    })
}

fn transport_failure(err: reqwest::Error) -> ApiFailure {
    if err.is_timeout() {
        ApiFailure::NetworkError("request timed out".to_string())
    } else if err.is_connect() {
        ApiFailure::NetworkError(format!("connection failed: {}", err))
    } else if err.is_decode() {
        ApiFailure::Malformed(err.to_string())
    } else {
        ApiFailure::NetworkError(err.to_string())
    }
}

impl FootballApi for TransfermarktClient {
    async fn search_player(&self, name: &str) -> ApiResult {
        self.search("/players/search", name).await
    }

    async fn get_player_profile(&self, player_id: &str) -> ApiResult {
        self.get_json(&format!("/players/{}", player_id), &[], player_id)
            .await
    }

    async fn search_club(&self, name: &str) -> ApiResult {
        self.search("/clubs/search", name).await
    }

    async fn get_club_profile(&self, club_id: &str) -> ApiResult {
        self.get_json(&format!("/clubs/{}", club_id), &[], club_id)
            .await
    }

    async fn get_club_players(&self, club_id: &str) -> ApiResult {
        self.get_json(&format!("/clubs/{}/players", club_id), &[], club_id)
            .await
    }

    async fn get_transfers(&self, player_id: &str) -> ApiResult {
        self.get_json(&format!("/players/{}/transfers", player_id), &[], player_id)
            .await
    }

    async fn get_standings(&self, competition: &str) -> ApiResult {
        let hit = self.search("/competitions/search", competition).await?;
        let id = id_of(&hit).ok_or_else(|| {
            ApiFailure::Malformed(format!("competition hit for '{}' has no id", competition))
        })?;
        let mut table = self
            .get_json(&format!("/competitions/{}/tables", id), &[], competition)
            .await?;
        if let (Some(obj), Some(name)) = (table.as_object_mut(), hit.get("name")) {
            obj.entry("competition").or_insert_with(|| name.clone());
        }
        Ok(table)
    }
}
