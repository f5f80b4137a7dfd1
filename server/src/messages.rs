use serde::{Deserialize, Serialize};

use common::UserId;
use common::games::snake::{DifficultyTier, Direction, GameMode, GameState};
use common::records::LeaderboardEntry;

use crate::scheduler::GameCommand;
use crate::session_stats::SessionStats;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Guests omit the user; their runs are never persisted.
    Connect {
        user_id: Option<UserId>,
        username: Option<String>,
        #[serde(default)]
        game_mode: GameMode,
    },
    Start,
    Pause,
    Direction {
        direction: Direction,
    },
    Key {
        key: String,
    },
    Swipe {
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
    },
    SetDifficulty {
        difficulty: DifficultyTier,
    },
}

impl ClientMessage {
    /// `None` for `Connect`, which is handled by the connection itself.
    pub fn into_command(self) -> Option<GameCommand> {
        match self {
            ClientMessage::Connect { .. } => None,
            ClientMessage::Start => Some(GameCommand::Start),
            ClientMessage::Pause => Some(GameCommand::TogglePause),
            ClientMessage::Direction { direction } => Some(GameCommand::ChangeDirection(direction)),
            ClientMessage::Key { key } => Some(GameCommand::Key(key)),
            ClientMessage::Swipe {
                start_x,
                start_y,
                end_x,
                end_y,
            } => Some(GameCommand::Swipe {
                start: (start_x, start_y),
                end: (end_x, end_y),
            }),
            ClientMessage::SetDifficulty { difficulty } => Some(GameCommand::SetDifficulty(difficulty)),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    State { state: GameState },
    GameOver { state: GameState, stats: SessionStats },
    Leaderboard { entries: Vec<LeaderboardEntry> },
    Error { message: String },
}
