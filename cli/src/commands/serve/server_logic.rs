//! # Footbot HTTP Server Implementation
//!
//! File: cli/src/commands/serve/server_logic.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The Axum application behind `footbot serve`:
//! - JSON chat endpoint backed by a shared, read-only `Chatbot`
//! - In-memory session store, one `tokio::sync::Mutex` per session so a
//!   conversation handles one message at a time while others proceed. Idle
//!   sessions are evicted whenever a new one starts, and the store is capped
//! - Port availability checking with automatic fallback
//! - CORS and request tracing middleware
//! - Graceful shutdown on Ctrl+C / SIGTERM
//!
use crate::chatbot::session::ChatSession;
use crate::chatbot::types::ResponseStyle;
use crate::chatbot::{ChatReply, Chatbot};
use crate::common::llm::GeminiClient;
use crate::common::transfermarkt::TransfermarktClient;
use crate::core::error::{FootbotError, Result};
use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

pub type ProductionBot = Chatbot<TransfermarktClient, GeminiClient>;

/// Effective settings for one server run.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
    pub enable_cors: bool,
    pub history_limit: usize,
    pub default_style: ResponseStyle,
    pub session_limits: SessionLimits,
}

/// When the store ends conversations on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub idle_timeout: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            max_sessions: 1000,
        }
    }
}

type SharedSession = Arc<tokio::sync::Mutex<ChatSession>>;

struct StoredSession {
    session: SharedSession,
    last_used: Instant,
}

/// Live conversations keyed by session id.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, StoredSession>>,
    next_id: AtomicU64,
    limits: SessionLimits,
}

impl SessionStore {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, StoredSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Starts a new session and returns its id. Idle sessions are dropped
    /// first; if the store is still full the least recently used one goes.
    pub fn create(&self, history_limit: usize, style: ResponseStyle) -> (String, SharedSession) {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id = format!("{:x}-{}", chrono::Utc::now().timestamp_millis(), n);
        let session = Arc::new(tokio::sync::Mutex::new(ChatSession::new(history_limit, style)));

        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, stored| stored.last_used.elapsed() < self.limits.idle_timeout);
        let expired = before - sessions.len();
        if expired > 0 {
            info!("Ended {} idle session(s)", expired);
        }
        while sessions.len() >= self.limits.max_sessions.max(1) {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, stored)| stored.last_used)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    sessions.remove(&key);
                    warn!("Session limit reached; ended least recently used session {}", key);
                }
                None => break,
            }
        }
        sessions.insert(
            id.clone(),
            StoredSession {
                session: Arc::clone(&session),
                last_used: Instant::now(),
            },
        );
        drop(sessions);

        info!("Session {} started", id);
        (id, session)
    }

    /// Looks up a live session and marks it as used. A session idle past the
    /// timeout is ended here rather than returned.
    pub fn get(&self, id: &str) -> Option<SharedSession> {
        let mut sessions = self.lock();
        let stored = sessions.get_mut(id)?;
        if stored.last_used.elapsed() >= self.limits.idle_timeout {
            sessions.remove(id);
            info!("Session {} expired after being idle", id);
            return None;
        }
        stored.last_used = Instant::now();
        Some(Arc::clone(&stored.session))
    }

    pub fn remove(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
pub struct AppState {
    bot: Arc<ProductionBot>,
    sessions: Arc<SessionStore>,
    history_limit: usize,
    default_style: ResponseStyle,
}

impl AppState {
    pub fn new(
        bot: ProductionBot,
        history_limit: usize,
        default_style: ResponseStyle,
        limits: SessionLimits,
    ) -> Self {
        Self {
            bot: Arc::new(bot),
            sessions: Arc::new(SessionStore::new(limits)),
            history_limit,
            default_style,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub style: Option<ResponseStyle>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub reply: ChatReply,
}

/// Error body: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<FootbotError> for ApiError {
    fn from(err: FootbotError) -> Self {
        let status = match err {
            FootbotError::SessionNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Binds (falling back to the next free port) and serves until shutdown.
pub async fn run_server(bot: ProductionBot, settings: ServerSettings) -> Result<()> {
    let max_port_attempts = 10;
    let addr = find_available_port(settings.host, settings.port, max_port_attempts).await?;

    let llm_status = if bot.has_llm() { "on" } else { "off (templates)" };
    let api_url = bot.api().base_url().to_string();
    let state = AppState::new(
        bot,
        settings.history_limit,
        settings.default_style,
        settings.session_limits,
    );
    let app = create_app(state, settings.enable_cors);

    println!("\n=================================================================");
    println!("⚽ Footbot chat API:  http://{}/api/chat", addr);
    println!("🩺 Health check:      http://{}/health", addr);
    println!("📡 Statistics API:    {}", api_url);
    println!("🤖 Language model:    {}", llm_status);
    println!("🎨 Default style:     {}", settings.default_style);
    println!("🔒 CORS enabled:      {}", settings.enable_cors);
    println!(
        "💬 Sessions:          up to {}, idle timeout {}s",
        settings.session_limits.max_sessions,
        settings.session_limits.idle_timeout.as_secs()
    );
    println!("=================================================================\n");

    info!("Starting chat server on {}", addr);
    println!("Server starting! Press Ctrl+C to stop.");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener to address {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| FootbotError::Server(e.to_string()))?;

    println!("\nServer shutdown complete.");
    Ok(())
}

/// Builds the router with its middleware stack.
pub fn create_app(state: AppState, enable_cors: bool) -> Router {
    let cors_layer = if enable_cors {
        info!("CORS middleware enabled (permissive).");
        CorsLayer::permissive()
    } else {
        info!("CORS middleware disabled.");
        CorsLayer::new()
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::default().include_headers(false))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/sessions/{id}", delete(end_session))
        .route("/health", get(health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(cors_layer),
        )
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> std::result::Result<Json<ChatResponse>, ApiError> {
    let (session_id, session) = match request.session_id {
        Some(id) => {
            let session = state
                .sessions
                .get(&id)
                .ok_or_else(|| FootbotError::SessionNotFound { id: id.clone() })?;
            (id, session)
        }
        None => state
            .sessions
            .create(state.history_limit, state.default_style),
    };

    let mut session = session.lock().await;
    if let Some(style) = request.style {
        session.style = style;
    }
    let reply = state.bot.respond(&mut session, &request.message).await;
    Ok(Json(ChatResponse { session_id, reply }))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<StatusCode, ApiError> {
    if state.sessions.remove(&id) {
        info!("Session {} ended", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(FootbotError::SessionNotFound { id }.into())
    }
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let cache = state.bot.api().cache_stats();
    Json(json!({
        "status": "ok",
        "sessions": state.sessions.len(),
        "cache": cache,
        "llm": state.bot.has_llm(),
    }))
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
            Err(e) => {
                error!(
                    "Failed to install SIGTERM handler: {}. Shutdown on SIGTERM might not work.",
                    e
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Tries `start_port`, then the following ports, up to `max_attempts` in total.
async fn find_available_port(
    req_host: IpAddr,
    start_port: u16,
    max_attempts: u8,
) -> Result<SocketAddr> {
    let mut current_port = start_port;
    for attempt in 0..max_attempts {
        let addr = SocketAddr::new(req_host, current_port);
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                drop(listener);
                if attempt > 0 {
                    info!(
                        "Port {} was unavailable, using port {} instead.",
                        start_port, current_port
                    );
                }
                return Ok(addr);
            }
            Err(e) => {
                warn!(
                    "Attempt {}: Port {} on host {} is unavailable (Error: {}). Trying next port...",
                    attempt + 1,
                    current_port,
                    req_host,
                    e
                );
                current_port = current_port.checked_add(1).ok_or_else(|| {
                    FootbotError::Server(format!("no port above {} to try", current_port))
                })?;
            }
        }
    }

    Err(FootbotError::Server(format!(
        "Could not find an available port on host {} starting from port {} after trying {} ports.",
        req_host, start_port, max_attempts
    ))
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::net::Ipv4Addr;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let mut config = Config::default();
        config.llm.enabled = false;
        // Never contacted: the requests below need no statistics data.
        config.api.base_url = "http://127.0.0.1:9".into();
        let bot = Chatbot::from_config(&config).unwrap();
        create_app(
            AppState::new(bot, 5, ResponseStyle::Professional, SessionLimits::default()),
            true,
        )
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sessions"], 0);
        assert_eq!(body["llm"], false);
    }

    #[tokio::test]
    async fn test_chat_starts_session_and_replies() {
        let response = test_app()
            .oneshot(chat_request(json!({"message": "hello"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(!body["session_id"].as_str().unwrap().is_empty());
        assert_eq!(body["intent"], "unknown");
        assert!(body["reply"].as_str().unwrap().contains("football"));
        assert_eq!(body["suggestions"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_session_keeps_history_and_can_be_deleted() {
        let app = test_app();
        let first = body_json(
            app.clone()
                .oneshot(chat_request(json!({"message": "Compare them"})))
                .await
                .unwrap(),
        )
        .await;
        let id = first["session_id"].as_str().unwrap().to_string();
        assert_eq!(first["intent"], "compare");
        assert!(first["reply"].as_str().unwrap().contains("compare"));

        let second = app
            .clone()
            .oneshot(chat_request(json!({"session_id": id, "message": "hi", "style": "casual"})))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(body_json(second).await["session_id"], id.as_str());

        let deleted = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/sessions/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let gone = app
            .oneshot(chat_request(json!({"session_id": id, "message": "hi"})))
            .await
            .unwrap();
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
        assert!(body_json(gone).await["error"]
            .as_str()
            .unwrap()
            .contains("not found"));
    }

    #[tokio::test]
    async fn test_find_available_port_start_occupied() -> Result<()> {
        let host = Ipv4Addr::LOCALHOST.into();
        let start_port = 51000;
        let _listener = TcpListener::bind(SocketAddr::new(host, start_port)).await?;

        let addr = find_available_port(host, start_port, 5).await?;
        assert!(addr.port() > start_port);
        assert!(addr.port() < start_port + 5);
        Ok(())
    }

    #[test]
    fn test_session_store() {
        let store = SessionStore::default();
        let (a, _) = store.create(3, ResponseStyle::Casual);
        let (b, _) = store.create(3, ResponseStyle::Casual);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert!(store.get(&a).is_some());
        assert!(store.remove(&a));
        assert!(!store.remove(&a));
        assert!(store.get(&a).is_none());
    }

    #[test]
    fn test_idle_sessions_are_evicted() {
        let store = SessionStore::new(SessionLimits {
            idle_timeout: Duration::from_millis(20),
            max_sessions: 100,
        });
        let (stale, _) = store.create(3, ResponseStyle::Casual);
        let (also_stale, _) = store.create(3, ResponseStyle::Casual);
        std::thread::sleep(Duration::from_millis(40));

        assert!(store.get(&also_stale).is_none());
        let (fresh, _) = store.create(3, ResponseStyle::Casual);
        assert_eq!(store.len(), 1);
        assert!(store.get(&stale).is_none());
        assert!(store.get(&fresh).is_some());
    }

    #[test]
    fn test_store_is_capped_by_least_recent_use() {
        let store = SessionStore::new(SessionLimits {
            idle_timeout: Duration::from_secs(60),
            max_sessions: 2,
        });
        let (a, _) = store.create(3, ResponseStyle::Casual);
        std::thread::sleep(Duration::from_millis(2));
        let (b, _) = store.create(3, ResponseStyle::Casual);
        std::thread::sleep(Duration::from_millis(2));
        // Touching `a` makes `b` the least recently used.
        assert!(store.get(&a).is_some());
        std::thread::sleep(Duration::from_millis(2));
        let (c, _) = store.create(3, ResponseStyle::Casual);

        assert_eq!(store.len(), 2);
        assert!(store.get(&a).is_some());
        assert!(store.get(&b).is_none());
        assert!(store.get(&c).is_some());
    }
}
