use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use axum::{
    Json, Router,
    extract::{Path, Query, State, WebSocketUpgrade},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use common::records::{DeviceType, LeaderboardEntry, PlayerProfile};
use common::{ConnectionId, UserId, log};

use crate::leaderboard::{Leaderboard, MemoryLeaderboardStore};
use crate::server_config::ServerConfig;
use crate::session_recorder::SessionLog;
use crate::ws_handler::{handle_game_socket, handle_leaderboard_socket};

#[derive(Clone)]
pub struct WebServerState {
    pub config: Arc<ServerConfig>,
    pub sessions: Arc<SessionLog>,
    pub leaderboard: Arc<Leaderboard<MemoryLeaderboardStore>>,
    next_connection: Arc<AtomicU64>,
}

impl WebServerState {
    pub fn new(
        config: ServerConfig,
        sessions: SessionLog,
        leaderboard: Leaderboard<MemoryLeaderboardStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            leaderboard: Arc::new(leaderboard),
            next_connection: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn next_connection_id(&self) -> ConnectionId {
        let id = self.next_connection.fetch_add(1, Ordering::Relaxed);
        ConnectionId::new(format!("conn-{}", id))
    }
}

pub fn build_router(state: WebServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/ws", get(game_ws_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .route("/leaderboard/ws", get(leaderboard_ws_handler))
        .route("/profiles/{user_id}", get(profile_handler));

    if let Some(static_files_path) = &state.config.static_files_path {
        log!("Serving static files from {}", static_files_path.display());
        app = app.nest_service("/ui", ServeDir::new(static_files_path));
    }

    app.layer(cors).with_state(state)
}

pub async fn run_web_server(
    state: WebServerState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), String> {
    let addr = state.config.socket_addr()?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
    log!("Web server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| format!("Web server error: {}", e))
}

async fn game_ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<WebServerState>,
) -> impl IntoResponse {
    let device_type = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(DeviceType::from_user_agent)
        .unwrap_or_default();
    ws.on_upgrade(move |socket| handle_game_socket(socket, state, device_type))
}

async fn leaderboard_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<WebServerState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_leaderboard_socket(socket, state))
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

/// Requested limits are clamped to `1..=leaderboard_limit`.
async fn leaderboard_handler(
    State(state): State<WebServerState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, (StatusCode, String)> {
    let max = state.config.leaderboard_limit;
    let limit = query.limit.unwrap_or(max).clamp(1, max);

    state
        .leaderboard
        .top(limit)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn profile_handler(
    State(state): State<WebServerState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<PlayerProfile>, StatusCode> {
    state
        .sessions
        .profile(&user_id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
