use serde::{Deserialize, Serialize};

use crate::games::SessionRng;
use crate::log;
use super::food::generate_random_food;
use super::settings::{DifficultyTier, GameSettings};
use super::snake::Snake;
use super::types::{Direction, GameEndReason, GameMode, Position};

/// One run of the game. Every transition borrows the current state and
/// returns the next one; the caller replaces its copy wholesale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub settings: GameSettings,
    pub snake: Snake,
    pub food: Position,
    /// Heading applied on the next tick.
    pub direction: Direction,
    /// Last accepted request, committed as `direction` at the end of a tick.
    pub next_direction: Direction,
    pub score: u64,
    pub is_game_over: bool,
    pub is_paused: bool,
    pub level: u32,
    pub speed_ms: u64,
    pub food_eaten: u64,
    pub start_time_ms: i64,
    pub game_mode: GameMode,
    pub end_reason: Option<GameEndReason>,
}

impl GameState {
    /// A fresh, paused game waiting for `start`.
    pub fn new(settings: GameSettings, game_mode: GameMode, rng: &mut SessionRng, now_ms: i64) -> Self {
        Self::fresh(settings, game_mode, rng, now_ms, true)
    }

    fn fresh(
        settings: GameSettings,
        game_mode: GameMode,
        rng: &mut SessionRng,
        now_ms: i64,
        is_paused: bool,
    ) -> Self {
        let snake = Snake::initial(settings.grid_size);
        let food = generate_random_food(&snake, settings.grid_size, rng);
        let end_reason = food.is_none().then_some(GameEndReason::BoardFilled);

        Self {
            settings,
            food: food.unwrap_or_else(|| snake.head()),
            snake,
            direction: Direction::Right,
            next_direction: Direction::Right,
            score: 0,
            is_game_over: end_reason.is_some(),
            is_paused,
            level: 1,
            speed_ms: settings.speed_for(DifficultyTier::Medium),
            food_eaten: 0,
            start_time_ms: now_ms,
            game_mode,
            end_reason,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.is_paused && !self.is_game_over
    }

    /// Whole seconds since `start`, never negative.
    pub fn elapsed_secs(&self, now_ms: i64) -> u64 {
        (now_ms - self.start_time_ms).max(0) as u64 / 1000
    }

    /// Restart from any state, keeping the settings and game mode.
    pub fn start(&self, rng: &mut SessionRng, now_ms: i64) -> Self {
        Self::fresh(self.settings, self.game_mode, rng, now_ms, false)
    }

    pub fn toggle_pause(&self) -> Self {
        if self.is_game_over {
            return self.clone();
        }
        Self {
            is_paused: !self.is_paused,
            ..self.clone()
        }
    }

    /// Buffers `requested` for the next tick unless it would reverse the
    /// current heading.
    pub fn change_direction(&self, requested: Direction) -> Self {
        if self.is_game_over || requested.is_opposite(&self.direction) {
            return self.clone();
        }
        Self {
            next_direction: requested,
            ..self.clone()
        }
    }

    pub fn set_difficulty(&self, tier: DifficultyTier) -> Self {
        if self.is_game_over {
            return self.clone();
        }
        Self {
            speed_ms: self.settings.speed_for(tier),
            ..self.clone()
        }
    }

    pub fn tick(&self, rng: &mut SessionRng) -> Self {
        if !self.is_running() {
            return self.clone();
        }

        let grid_size = self.settings.grid_size;
        let new_head = self.snake.head().step(self.direction, grid_size);

        // Checked against the pre-move body: the cell the tail is about to
        // leave still counts.
        if self.snake.contains(&new_head) {
            log!("Snake hit itself at {} with score {}", new_head, self.score);
            return Self {
                is_game_over: true,
                end_reason: Some(GameEndReason::SelfCollision),
                ..self.clone()
            };
        }

        let mut next = self.clone();
        next.snake.push_head(new_head);

        if new_head == self.food {
            next.score += self.settings.score_per_food * u64::from(self.level);
            next.food_eaten += 1;

            if next.food_eaten % self.settings.foods_per_speed_up == 0 {
                next.speed_ms = self
                    .speed_ms
                    .saturating_sub(self.settings.speed_increment_ms)
                    .max(self.settings.min_speed_ms);
                log!("Speed up after {} food: {}ms -> {}ms", next.food_eaten, self.speed_ms, next.speed_ms);
            }

            match generate_random_food(&next.snake, grid_size, rng) {
                Some(food) => next.food = food,
                None => {
                    log!("Board filled at length {} with score {}", next.snake.len(), next.score);
                    next.is_game_over = true;
                    next.end_reason = Some(GameEndReason::BoardFilled);
                }
            }
        } else {
            next.snake.drop_tail();
        }

        next.direction = self.next_direction;
        next
    }
}
