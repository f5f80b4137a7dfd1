use serde::{Deserialize, Serialize};

use crate::config::Validate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
        }
    }
}

/// Rules of a run. Speeds are tick periods in milliseconds, so a smaller
/// value means a faster snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub grid_size: usize,
    pub score_per_food: u64,
    pub speed_increment_ms: u64,
    pub min_speed_ms: u64,
    pub foods_per_speed_up: u64,
    pub easy_speed_ms: u64,
    pub medium_speed_ms: u64,
    pub hard_speed_ms: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            grid_size: 20,
            score_per_food: 10,
            speed_increment_ms: 5,
            min_speed_ms: 50,
            foods_per_speed_up: 5,
            easy_speed_ms: 150,
            medium_speed_ms: 100,
            hard_speed_ms: 75,
        }
    }
}

impl GameSettings {
    pub fn speed_for(&self, tier: DifficultyTier) -> u64 {
        match tier {
            DifficultyTier::Easy => self.easy_speed_ms,
            DifficultyTier::Medium => self.medium_speed_ms,
            DifficultyTier::Hard => self.hard_speed_ms,
        }
    }
}

impl Validate for GameSettings {
    fn validate(&self) -> Result<(), String> {
        if self.grid_size < 5 || self.grid_size > 100 {
            return Err("Grid size must be between 5 and 100".to_string());
        }
        if self.score_per_food == 0 {
            return Err("Score per food must be positive".to_string());
        }
        if self.min_speed_ms == 0 {
            return Err("Minimum speed must be at least 1ms".to_string());
        }
        if self.foods_per_speed_up == 0 {
            return Err("Foods per speed-up must be positive".to_string());
        }
        for tier in [DifficultyTier::Easy, DifficultyTier::Medium, DifficultyTier::Hard] {
            let speed = self.speed_for(tier);
            if speed < self.min_speed_ms || speed > 5000 {
                return Err(format!(
                    "The {} speed must be between {}ms and 5000ms",
                    tier.as_str(),
                    self.min_speed_ms
                ));
            }
        }
        Ok(())
    }
}
