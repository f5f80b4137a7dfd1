use serde::Serialize;

use common::games::snake::GameState;

/// Running totals for one connection, reported with every game over.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub games_played: u32,
    pub best_score: u64,
    pub total_food: u64,
    pub total_time_secs: u64,
}

impl SessionStats {
    /// Runs that end without scoring are not counted.
    pub fn record_game(&mut self, state: &GameState, now_ms: i64) {
        if state.score == 0 {
            return;
        }
        self.games_played += 1;
        self.best_score = self.best_score.max(state.score);
        self.total_food += state.food_eaten;
        self.total_time_secs += state.elapsed_secs(now_ms);
    }
}
