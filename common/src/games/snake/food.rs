use std::collections::HashSet;

use crate::games::SessionRng;
use super::snake::Snake;
use super::types::Position;

/// Uniform draws tried before falling back to scanning for free cells.
const MAX_RANDOM_FOOD_ATTEMPTS: usize = 100;

/// Picks a cell not covered by `snake`. Rejection sampling first; on a
/// crowded board, a uniform pick among the remaining free cells. `None`
/// means the snake covers the whole grid.
pub fn generate_random_food(
    snake: &Snake,
    grid_size: usize,
    rng: &mut SessionRng,
) -> Option<Position> {
    for _ in 0..MAX_RANDOM_FOOD_ATTEMPTS {
        let candidate = Position::new(
            rng.random_range(0..grid_size),
            rng.random_range(0..grid_size),
        );
        if !snake.contains(&candidate) {
            return Some(candidate);
        }
    }

    let occupied: HashSet<Position> = snake.segments().copied().collect();
    let free: Vec<Position> = (0..grid_size)
        .flat_map(|y| (0..grid_size).map(move |x| Position::new(x, y)))
        .filter(|p| !occupied.contains(p))
        .collect();

    if free.is_empty() {
        return None;
    }
    Some(free[rng.random_range(0..free.len())])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_cells(grid_size: usize) -> Vec<Position> {
        (0..grid_size)
            .flat_map(|y| (0..grid_size).map(move |x| Position::new(x, y)))
            .collect()
    }

    #[test]
    fn test_food_never_lands_on_snake() {
        let grid_size = 20;
        let mut rng = SessionRng::new(1234);
        let cells = all_cells(grid_size);

        for _ in 0..1000 {
            let length = rng.random_range(1..grid_size * grid_size);
            let mut pool = cells.clone();
            let mut segments = Vec::with_capacity(length);
            for _ in 0..length {
                let idx = rng.random_range(0..pool.len());
                segments.push(pool.swap_remove(idx));
            }
            let snake = Snake::from_segments(segments).unwrap();

            let food = generate_random_food(&snake, grid_size, &mut rng)
                .expect("board has free cells");
            assert!(!snake.contains(&food));
            assert!(food.x < grid_size && food.y < grid_size);
        }
    }

    #[test]
    fn test_single_free_cell_is_found() {
        let grid_size = 6;
        let free_cell = Position::new(4, 1);
        let segments: Vec<Position> = all_cells(grid_size)
            .into_iter()
            .filter(|p| *p != free_cell)
            .collect();
        let snake = Snake::from_segments(segments).unwrap();
        let mut rng = SessionRng::new(99);

        assert_eq!(generate_random_food(&snake, grid_size, &mut rng), Some(free_cell));
    }

    #[test]
    fn test_full_board_yields_none() {
        let grid_size = 5;
        let snake = Snake::from_segments(all_cells(grid_size)).unwrap();
        let mut rng = SessionRng::new(3);

        assert_eq!(generate_random_food(&snake, grid_size, &mut rng), None);
    }
}
