use super::types::Direction;

/// Minimum swipe travel, in pixels, along the dominant axis.
pub const DEFAULT_SWIPE_THRESHOLD_PX: f64 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlAction {
    /// Restart after game over, otherwise pause or resume.
    RestartOrTogglePause,
}

/// Arrow keys and WASD in either case.
pub fn direction_from_key(key: &str) -> Option<Direction> {
    match key {
        "ArrowUp" | "w" | "W" => Some(Direction::Up),
        "ArrowDown" | "s" | "S" => Some(Direction::Down),
        "ArrowLeft" | "a" | "A" => Some(Direction::Left),
        "ArrowRight" | "d" | "D" => Some(Direction::Right),
        _ => None,
    }
}

pub fn control_from_key(key: &str) -> Option<ControlAction> {
    match key {
        "Space" | " " => Some(ControlAction::RestartOrTogglePause),
        _ => None,
    }
}

/// Screen coordinates: y grows downwards. Equal travel on both axes counts
/// as vertical.
pub fn swipe_direction(start: (f64, f64), end: (f64, f64), threshold: f64) -> Option<Direction> {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let abs_dx = dx.abs();
    let abs_dy = dy.abs();

    if abs_dx.max(abs_dy) < threshold {
        return None;
    }

    if abs_dx > abs_dy {
        Some(if dx > 0.0 { Direction::Right } else { Direction::Left })
    } else {
        Some(if dy > 0.0 { Direction::Down } else { Direction::Up })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_map_case_insensitively() {
        assert_eq!(direction_from_key("ArrowLeft"), Some(Direction::Left));
        assert_eq!(direction_from_key("w"), Some(Direction::Up));
        assert_eq!(direction_from_key("W"), Some(Direction::Up));
        assert_eq!(direction_from_key("D"), Some(Direction::Right));
        assert_eq!(direction_from_key("s"), Some(Direction::Down));
        assert_eq!(direction_from_key("q"), None);
    }

    #[test]
    fn test_space_is_control() {
        assert_eq!(control_from_key("Space"), Some(ControlAction::RestartOrTogglePause));
        assert_eq!(control_from_key("Enter"), None);
    }

    #[test]
    fn test_short_swipe_ignored() {
        assert_eq!(swipe_direction((0.0, 0.0), (29.0, 10.0), DEFAULT_SWIPE_THRESHOLD_PX), None);
    }

    #[test]
    fn test_dominant_axis_wins() {
        let t = DEFAULT_SWIPE_THRESHOLD_PX;
        assert_eq!(swipe_direction((100.0, 100.0), (160.0, 120.0), t), Some(Direction::Right));
        assert_eq!(swipe_direction((100.0, 100.0), (40.0, 90.0), t), Some(Direction::Left));
        assert_eq!(swipe_direction((100.0, 100.0), (110.0, 20.0), t), Some(Direction::Up));
        assert_eq!(swipe_direction((100.0, 100.0), (90.0, 150.0), t), Some(Direction::Down));
    }

    #[test]
    fn test_diagonal_tie_is_vertical() {
        assert_eq!(
            swipe_direction((0.0, 0.0), (40.0, 40.0), DEFAULT_SWIPE_THRESHOLD_PX),
            Some(Direction::Down)
        );
    }
}
