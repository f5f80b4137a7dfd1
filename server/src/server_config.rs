use std::net::SocketAddr;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use common::config::Validate;
use common::games::snake::{DEFAULT_SWIPE_THRESHOLD_PX, GameSettings};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Served under `/ui` when set.
    pub static_files_path: Option<PathBuf>,
    /// JSON-lines log of finished sessions; in-memory only when unset.
    pub sessions_file: Option<PathBuf>,
    /// JSON snapshot of the leaderboard, reloaded on startup.
    pub leaderboard_file: Option<PathBuf>,
    pub leaderboard_limit: usize,
    pub swipe_threshold_px: f64,
    pub game: GameSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            static_files_path: None,
            sessions_file: None,
            leaderboard_file: None,
            leaderboard_limit: 10,
            swipe_threshold_px: DEFAULT_SWIPE_THRESHOLD_PX,
            game: GameSettings::default(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        self.bind_address
            .parse()
            .map_err(|e| format!("Invalid bind address '{}': {}", self.bind_address, e))
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        self.socket_addr()?;
        if self.leaderboard_limit < 1 || self.leaderboard_limit > 100 {
            return Err("Leaderboard limit must be between 1 and 100".to_string());
        }
        if self.swipe_threshold_px.is_nan() || self.swipe_threshold_px <= 0.0 {
            return Err("Swipe threshold must be positive".to_string());
        }
        self.game.validate()
    }
}
