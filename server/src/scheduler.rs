use std::time::Duration;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use common::games::SessionRng;
use common::games::snake::{
    ControlAction, DifficultyTier, Direction, GameState, control_from_key, direction_from_key,
    swipe_direction,
};
use common::{ConnectionId, log};

use crate::broadcaster::GameBroadcaster;
use crate::score_reporter::GameOverSink;
use crate::session_stats::SessionStats;

#[derive(Debug, Clone, PartialEq)]
pub enum GameCommand {
    Start,
    TogglePause,
    ChangeDirection(Direction),
    Key(String),
    Swipe { start: (f64, f64), end: (f64, f64) },
    SetDifficulty(DifficultyTier),
}

enum Wakeup {
    Command(Option<GameCommand>),
    Tick,
}

/// Owns one game and drives it from a single task: commands and timer
/// ticks are applied one at a time, so no transition is ever interleaved.
pub struct GameScheduler<B: GameBroadcaster, G: GameOverSink> {
    connection_id: ConnectionId,
    state: GameState,
    rng: SessionRng,
    timer: Option<Interval>,
    armed_period_ms: Option<u64>,
    broadcaster: B,
    sink: G,
    stats: SessionStats,
    swipe_threshold_px: f64,
}

impl<B: GameBroadcaster, G: GameOverSink> GameScheduler<B, G> {
    pub fn new(
        connection_id: ConnectionId,
        state: GameState,
        rng: SessionRng,
        broadcaster: B,
        sink: G,
        swipe_threshold_px: f64,
    ) -> Self {
        Self {
            connection_id,
            state,
            rng,
            timer: None,
            armed_period_ms: None,
            broadcaster,
            sink,
            stats: SessionStats::default(),
            swipe_threshold_px,
        }
    }

    /// Runs until the command channel closes and returns the totals of
    /// every finished run.
    pub async fn run(mut self, mut commands: mpsc::Receiver<GameCommand>) -> SessionStats {
        log!("[{}] Game loop started (seed {})", self.connection_id, self.rng.seed());
        self.broadcaster.broadcast_state(self.state.clone()).await;
        self.rearm();

        loop {
            let wakeup = tokio::select! {
                command = commands.recv() => Wakeup::Command(command),
                _ = next_tick(&mut self.timer) => Wakeup::Tick,
            };

            match wakeup {
                Wakeup::Command(Some(command)) => {
                    let next = self.apply(command);
                    self.commit(next).await;
                }
                Wakeup::Command(None) => break,
                Wakeup::Tick => {
                    let next = self.state.tick(&mut self.rng);
                    self.commit(next).await;
                }
            }
        }

        log!(
            "[{}] Game loop stopped after {} scored games",
            self.connection_id,
            self.stats.games_played
        );
        self.stats
    }

    fn apply(&mut self, command: GameCommand) -> GameState {
        match command {
            GameCommand::Start => self.restart(),
            GameCommand::TogglePause => self.state.toggle_pause(),
            GameCommand::ChangeDirection(direction) => self.state.change_direction(direction),
            GameCommand::Key(key) => {
                if let Some(direction) = direction_from_key(&key) {
                    return self.state.change_direction(direction);
                }
                match control_from_key(&key) {
                    Some(ControlAction::RestartOrTogglePause) if self.state.is_game_over => self.restart(),
                    Some(ControlAction::RestartOrTogglePause) => self.state.toggle_pause(),
                    None => self.state.clone(),
                }
            }
            GameCommand::Swipe { start, end } => {
                match swipe_direction(start, end, self.swipe_threshold_px) {
                    Some(direction) => self.state.change_direction(direction),
                    None => self.state.clone(),
                }
            }
            GameCommand::SetDifficulty(tier) => {
                if !self.state.is_paused {
                    log!("[{}] Ignoring difficulty change to {} while running", self.connection_id, tier.as_str());
                    return self.state.clone();
                }
                self.state.set_difficulty(tier)
            }
        }
    }

    fn restart(&mut self) -> GameState {
        self.state.start(&mut self.rng, Utc::now().timestamp_millis())
    }

    async fn commit(&mut self, next: GameState) {
        if next == self.state {
            return;
        }

        let finished = next.is_game_over && !self.state.is_game_over;
        self.state = next;
        self.rearm();

        if finished {
            self.stats.record_game(&self.state, Utc::now().timestamp_millis());
            log!(
                "[{}] Game over with score {} ({:?})",
                self.connection_id,
                self.state.score,
                self.state.end_reason
            );
            self.sink.on_game_over(&self.state);
            self.broadcaster
                .broadcast_game_over(self.state.clone(), self.stats.clone())
                .await;
        } else {
            self.broadcaster.broadcast_state(self.state.clone()).await;
        }
    }

    /// Keeps exactly one timer armed while the game runs, with the current
    /// speed as its period. A new speed applies from the next tick.
    fn rearm(&mut self) {
        let wanted = self.state.is_running().then_some(self.state.speed_ms);
        if wanted == self.armed_period_ms {
            return;
        }

        self.armed_period_ms = wanted;
        self.timer = wanted.map(|period_ms| {
            let period = Duration::from_millis(period_ms);
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            timer
        });
    }
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}
