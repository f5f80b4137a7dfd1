use std::future::Future;
use tokio::sync::mpsc;

use common::games::snake::GameState;
use common::{ConnectionId, log};

use crate::messages::ServerMessage;
use crate::session_stats::SessionStats;

pub trait GameBroadcaster: Send + Sync + 'static {
    fn broadcast_state(&self, state: GameState) -> impl Future<Output = ()> + Send;

    fn broadcast_game_over(
        &self,
        state: GameState,
        stats: SessionStats,
    ) -> impl Future<Output = ()> + Send;
}

pub type ClientSender = mpsc::Sender<ServerMessage>;

/// Sends game updates to a single WebSocket connection.
#[derive(Clone)]
pub struct ClientBroadcaster {
    connection_id: ConnectionId,
    sender: ClientSender,
}

impl std::fmt::Debug for ClientBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBroadcaster")
            .field("connection_id", &self.connection_id)
            .finish()
    }
}

impl ClientBroadcaster {
    pub fn new(connection_id: ConnectionId, sender: ClientSender) -> Self {
        Self {
            connection_id,
            sender,
        }
    }

    async fn send(&self, message: ServerMessage) {
        if let Err(e) = self.sender.send(message).await {
            log!("[{}] Failed to send to client: {}", self.connection_id, e);
        }
    }
}

impl GameBroadcaster for ClientBroadcaster {
    async fn broadcast_state(&self, state: GameState) {
        self.send(ServerMessage::State { state }).await;
    }

    async fn broadcast_game_over(&self, state: GameState, stats: SessionStats) {
        self.send(ServerMessage::GameOver { state, stats }).await;
    }
}
