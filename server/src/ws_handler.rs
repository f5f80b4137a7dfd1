use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use common::games::SessionRng;
use common::games::snake::{GameMode, GameState};
use common::records::DeviceType;
use common::{ConnectionId, UserId, log, log_error};

use crate::broadcaster::{ClientBroadcaster, ClientSender};
use crate::messages::{ClientMessage, ServerMessage};
use crate::scheduler::{GameCommand, GameScheduler};
use crate::score_reporter::{PlayerInfo, ScoreReporter};
use crate::session_stats::SessionStats;
use crate::web_server::WebServerState;

struct ActiveGame {
    commands: mpsc::Sender<GameCommand>,
    handle: JoinHandle<SessionStats>,
}

pub async fn handle_game_socket(socket: WebSocket, state: WebServerState, device_type: DeviceType) {
    let connection_id = state.next_connection_id();
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::channel::<ServerMessage>(128);
    let send_task = spawn_sender(ws_sender, rx);

    log!("[{}] WebSocket connected ({:?})", connection_id, device_type);
    let mut game: Option<ActiveGame> = None;

    while let Some(result) = ws_receiver.next().await {
        let text = match result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                log!("[{}] WebSocket error: {}", connection_id, e);
                break;
            }
        };

        let message = match parse_client_message(text.as_str()) {
            Ok(message) => message,
            Err(e) => {
                send_error(&tx, &connection_id, e).await;
                continue;
            }
        };

        match message {
            ClientMessage::Connect {
                user_id,
                username,
                game_mode,
            } => {
                if game.is_some() {
                    send_error(&tx, &connection_id, "Already connected".to_string()).await;
                    continue;
                }
                let player = player_from_connect(user_id, username, device_type);
                game = Some(start_game(&state, &connection_id, &tx, player, game_mode));
            }
            other => {
                let Some(active) = &game else {
                    send_error(&tx, &connection_id, "Not connected: send connect first".to_string()).await;
                    continue;
                };
                if let Some(command) = other.into_command()
                    && active.commands.send(command).await.is_err()
                {
                    log_error!("[{}] Game loop is gone", connection_id);
                    break;
                }
            }
        }
    }

    if let Some(active) = game {
        drop(active.commands);
        match active.handle.await {
            Ok(stats) => log!(
                "[{}] Session ended: {} games, best score {}",
                connection_id,
                stats.games_played,
                stats.best_score
            ),
            Err(e) => log_error!("[{}] Game loop failed: {}", connection_id, e),
        }
    }

    log!("[{}] WebSocket connection ended", connection_id);
    send_task.abort();
}

pub async fn handle_leaderboard_socket(socket: WebSocket, state: WebServerState) {
    let connection_id = state.next_connection_id();
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::channel::<ServerMessage>(16);
    let send_task = spawn_sender(ws_sender, rx);

    let listener_tx = tx.clone();
    let listener_connection = connection_id.clone();
    let listener_id = state
        .leaderboard
        .register_listener(move |entries| {
            let update = ServerMessage::Leaderboard {
                entries: entries.to_vec(),
            };
            if let Err(e) = listener_tx.try_send(update) {
                log!("[{}] Dropped leaderboard update: {}", listener_connection, e);
            }
        })
        .await;

    match state.leaderboard.top(state.leaderboard.limit()).await {
        Ok(entries) => send_to_client(&tx, &connection_id, ServerMessage::Leaderboard { entries }).await,
        Err(e) => {
            log_error!("[{}] Failed to read leaderboard: {}", connection_id, e);
            send_error(&tx, &connection_id, "Leaderboard unavailable".to_string()).await;
        }
    }

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                log!("[{}] Leaderboard WebSocket error: {}", connection_id, e);
                break;
            }
        }
    }

    state.leaderboard.unregister_listener(listener_id).await;
    send_task.abort();
}

fn start_game(
    state: &WebServerState,
    connection_id: &ConnectionId,
    tx: &ClientSender,
    player: Option<PlayerInfo>,
    game_mode: GameMode,
) -> ActiveGame {
    match &player {
        Some(player) => log!("[{}] {} ({}) joined", connection_id, player.username, player.user_id),
        None => log!("[{}] Guest joined", connection_id),
    }

    let mut rng = SessionRng::from_random();
    let initial = GameState::new(
        state.config.game,
        game_mode,
        &mut rng,
        chrono::Utc::now().timestamp_millis(),
    );
    let reporter = ScoreReporter::new(player, state.sessions.clone(), state.leaderboard.clone());
    let broadcaster = ClientBroadcaster::new(connection_id.clone(), tx.clone());
    let scheduler = GameScheduler::new(
        connection_id.clone(),
        initial,
        rng,
        broadcaster,
        reporter,
        state.config.swipe_threshold_px,
    );

    let (commands, commands_rx) = mpsc::channel(32);
    let handle = tokio::spawn(scheduler.run(commands_rx));
    ActiveGame { commands, handle }
}

fn spawn_sender(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<ServerMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    log_error!("Failed to serialize server message: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    })
}

fn parse_client_message(text: &str) -> Result<ClientMessage, String> {
    serde_json::from_str(text).map_err(|e| format!("Invalid message: {}", e))
}

/// Only a connect carrying a user id identifies a player; a missing name
/// falls back to the id.
fn player_from_connect(
    user_id: Option<UserId>,
    username: Option<String>,
    device_type: DeviceType,
) -> Option<PlayerInfo> {
    let user_id = user_id.filter(|id| !id.as_str().is_empty())?;
    let username = username
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| user_id.to_string());
    Some(PlayerInfo {
        user_id,
        username,
        device_type,
    })
}

async fn send_to_client(tx: &ClientSender, connection_id: &ConnectionId, message: ServerMessage) {
    if let Err(e) = tx.send(message).await {
        log!("[{}] Failed to send message: {}", connection_id, e);
    }
}

async fn send_error(tx: &ClientSender, connection_id: &ConnectionId, message: String) {
    send_to_client(tx, connection_id, ServerMessage::Error { message }).await;
}
