mod food;
mod game_state;
mod input;
mod settings;
mod snake;
mod types;

pub use food::generate_random_food;
pub use game_state::GameState;
pub use input::{
    ControlAction, DEFAULT_SWIPE_THRESHOLD_PX, control_from_key, direction_from_key,
    swipe_direction,
};
pub use settings::{DifficultyTier, GameSettings};
pub use snake::{INITIAL_SNAKE_LENGTH, Snake};
pub use types::{Direction, GameEndReason, GameMode, Position, wrap};
