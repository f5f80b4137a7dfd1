use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use common::games::SessionRng;
use common::games::snake::{
    generate_random_food, Direction, GameMode, GameSettings, GameState, Position, Snake,
};

fn crowded_snake(grid_size: usize, free_cells: usize) -> Snake {
    let total = grid_size * grid_size - free_cells;
    let cells = (0..grid_size)
        .flat_map(|y| (0..grid_size).map(move |x| Position::new(x, y)))
        .take(total);
    Snake::from_segments(cells).expect("grid is not empty")
}

fn bench_ticks(c: &mut Criterion) {
    c.bench_function("tick_1000_steps", |b| {
        b.iter(|| {
            let mut rng = SessionRng::new(42);
            let mut state = GameState::new(GameSettings::default(), GameMode::Classic, &mut rng, 0)
                .start(&mut rng, 0);
            let turns = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];
            for step in 0..1000 {
                if state.is_game_over {
                    state = state.start(&mut rng, 0);
                }
                state = state.change_direction(turns[(step / 5) % turns.len()]).tick(&mut rng);
            }
            black_box(state.score)
        })
    });
}

fn bench_food_placement(c: &mut Criterion) {
    let sparse = Snake::initial(20);
    let crowded = crowded_snake(20, 3);

    c.bench_function("food_sparse_board", |b| {
        let mut rng = SessionRng::new(7);
        b.iter(|| black_box(generate_random_food(&sparse, 20, &mut rng)))
    });

    c.bench_function("food_crowded_board", |b| {
        let mut rng = SessionRng::new(7);
        b.iter(|| black_box(generate_random_food(&crowded, 20, &mut rng)))
    });
}

criterion_group!(benches, bench_ticks, bench_food_placement);
criterion_main!(benches);
