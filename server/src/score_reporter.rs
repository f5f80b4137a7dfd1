use std::sync::Arc;
use chrono::Utc;
use tokio::task::JoinHandle;

use common::games::snake::GameState;
use common::records::{DeviceType, SessionRecord};
use common::{UserId, log, log_error};

use crate::leaderboard::{Leaderboard, LeaderboardStore};
use crate::session_recorder::SessionRecorder;

/// Receives the final state of every run, between ticks.
pub trait GameOverSink: Send + Sync + 'static {
    fn on_game_over(&self, state: &GameState);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerInfo {
    pub user_id: UserId,
    pub username: String,
    pub device_type: DeviceType,
}

/// Persists finished runs of a signed-in player. Work runs in a spawned
/// task; failures are logged and never reach the game.
pub struct ScoreReporter<R: SessionRecorder, S: LeaderboardStore> {
    player: Option<PlayerInfo>,
    recorder: Arc<R>,
    leaderboard: Arc<Leaderboard<S>>,
}

impl<R: SessionRecorder, S: LeaderboardStore> ScoreReporter<R, S> {
    pub fn new(player: Option<PlayerInfo>, recorder: Arc<R>, leaderboard: Arc<Leaderboard<S>>) -> Self {
        Self {
            player,
            recorder,
            leaderboard,
        }
    }

    pub fn report(&self, state: &GameState) -> Option<JoinHandle<()>> {
        let player = self.player.clone()?;
        if state.score == 0 {
            return None;
        }

        let record = SessionRecord::from_final_state(
            player.user_id.clone(),
            state,
            player.device_type,
            Utc::now(),
        );
        let score = state.score;
        let recorder = self.recorder.clone();
        let leaderboard = self.leaderboard.clone();

        Some(tokio::spawn(async move {
            if let Err(e) = recorder.record(record).await {
                log_error!("[{}] Failed to record session: {}", player.user_id, e);
            }

            match leaderboard.submit(&player.user_id, &player.username, score).await {
                Ok(true) => log!("[{}] New best score {}", player.user_id, score),
                Ok(false) => {}
                Err(e) => log_error!("[{}] Failed to update leaderboard: {}", player.user_id, e),
            }
        }))
    }
}

impl<R: SessionRecorder, S: LeaderboardStore> GameOverSink for ScoreReporter<R, S> {
    fn on_game_over(&self, state: &GameState) {
        let _ = self.report(state);
    }
}
