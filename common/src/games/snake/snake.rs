use std::collections::VecDeque;
use serde::{Deserialize, Serialize};

use super::types::{Position, wrap};

pub const INITIAL_SNAKE_LENGTH: usize = 3;

/// Snake body, head first. Never empty once constructed through this API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    /// Head at the grid center, body trailing to the left of it.
    pub fn initial(grid_size: usize) -> Self {
        let center = (grid_size / 2) as i64;
        let body = (0..INITIAL_SNAKE_LENGTH as i64)
            .map(|offset| Position::new(wrap(center - offset, grid_size), center as usize))
            .collect();
        Self { body }
    }

    pub fn from_segments(segments: impl IntoIterator<Item = Position>) -> Option<Self> {
        let body: VecDeque<Position> = segments.into_iter().collect();
        if body.is_empty() {
            return None;
        }
        Some(Self { body })
    }

    pub fn head(&self) -> Position {
        *self.body.front().expect("Snake body should never be empty")
    }

    pub fn tail(&self) -> Position {
        *self.body.back().expect("Snake body should never be empty")
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.body.contains(position)
    }

    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }

    pub(crate) fn push_head(&mut self, head: Position) {
        self.body.push_front(head);
    }

    pub(crate) fn drop_tail(&mut self) {
        if self.body.len() > 1 {
            self.body.pop_back();
        }
    }
}
