//! Fixed-schema payloads handed to the persistence collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;
use crate::games::snake::{GameMode, GameState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    #[default]
    Desktop,
}

impl DeviceType {
    pub fn from_user_agent(user_agent: &str) -> Self {
        let agent = user_agent.to_lowercase();
        if agent.contains("mobi") || agent.contains("android") {
            DeviceType::Mobile
        } else {
            DeviceType::Desktop
        }
    }
}

/// One finished run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: UserId,
    pub score: u64,
    pub level: u32,
    pub duration_secs: u64,
    pub max_length: usize,
    pub food_eaten: u64,
    /// Power-ups do not exist yet; always 0.
    pub power_ups_collected: u32,
    pub game_mode: GameMode,
    pub device_type: DeviceType,
    pub created_at: String,
}

impl SessionRecord {
    pub fn from_final_state(
        user_id: UserId,
        state: &GameState,
        device_type: DeviceType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            score: state.score,
            level: state.level,
            duration_secs: state.elapsed_secs(now.timestamp_millis()),
            // The snake never shrinks within a run.
            max_length: state.snake.len(),
            food_eaten: state.food_eaten,
            power_ups_collected: 0,
            game_mode: state.game_mode,
            device_type,
            created_at: now.to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub username: String,
    pub score: u64,
    pub achieved_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub user_id: UserId,
    pub total_score: u64,
    pub games_played: u64,
}

impl PlayerProfile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            total_score: 0,
            games_played: 0,
        }
    }

    pub fn apply(&mut self, record: &SessionRecord) {
        self.total_score += record.score;
        self.games_played += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::games::SessionRng;
    use crate::games::snake::GameSettings;

    #[test]
    fn test_device_type_from_user_agent() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";
        let android = "Mozilla/5.0 (Linux; ANDROID 14; Pixel 8)";
        let desktop = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
        assert_eq!(DeviceType::from_user_agent(iphone), DeviceType::Mobile);
        assert_eq!(DeviceType::from_user_agent(android), DeviceType::Mobile);
        assert_eq!(DeviceType::from_user_agent(desktop), DeviceType::Desktop);
    }

    #[test]
    fn test_record_from_final_state() {
        let started = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let finished = Utc.with_ymd_and_hms(2026, 3, 1, 12, 1, 30).unwrap();
        let mut rng = SessionRng::new(11);
        let mut state = GameState::new(
            GameSettings::default(),
            GameMode::TimeAttack,
            &mut rng,
            started.timestamp_millis(),
        );
        state.score = 70;
        state.food_eaten = 7;
        state.is_game_over = true;

        let record = SessionRecord::from_final_state(
            UserId::new("u-1"),
            &state,
            DeviceType::Mobile,
            finished,
        );

        assert_eq!(record.duration_secs, 90);
        assert_eq!(record.max_length, 3);
        assert_eq!(record.score, 70);
        assert_eq!(record.food_eaten, 7);
        assert_eq!(record.power_ups_collected, 0);
        assert_eq!(record.game_mode, GameMode::TimeAttack);
        assert_eq!(record.created_at, finished.to_rfc3339());
    }

    #[test]
    fn test_profile_accumulates() {
        let mut profile = PlayerProfile::new(UserId::new("u-2"));
        let record = SessionRecord {
            user_id: UserId::new("u-2"),
            score: 30,
            level: 1,
            duration_secs: 12,
            max_length: 6,
            food_eaten: 3,
            power_ups_collected: 0,
            game_mode: GameMode::Classic,
            device_type: DeviceType::Desktop,
            created_at: String::new(),
        };
        profile.apply(&record);
        profile.apply(&record);
        assert_eq!(profile.total_score, 60);
        assert_eq!(profile.games_played, 2);
    }
}
