use std::cell::OnceCell;
use std::collections::VecDeque;

use crate::state::GameState;
use crate::types::{Action, Bomb, CellType, Direction, Position};

mod blast;
mod search;
mod utils;

use self::blast::DangerMap;
use self::utils::TileSet;

/// Navigation and safety queries over one snapshot. Out-of-bounds input never panics;
/// queries fall back to `false`, `None`, an empty list or [`Action::NoOp`].
pub struct Navigator<'a> {
    state: &'a GameState,
    danger: OnceCell<DangerMap<'a>>,
}

struct Visit {
    pos: Position,
    first: Action,
    depth: u32,
}

impl<'a> Navigator<'a> {
    pub fn new(state: &'a GameState) -> Self {
        Self {
            state,
            danger: OnceCell::new(),
        }
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.is_open_floor(pos) && !self.state.has_bomb_at(pos)
    }

    pub fn adjacent_walkable(&self, pos: Position) -> Vec<Position> {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| pos.step(dir))
            .filter(|next| self.is_walkable(*next))
            .collect()
    }

    /// First move of a shortest walkable path from `start` to `target`.
    pub fn route_first_step(&self, start: Position, target: Position) -> Action {
        if start == target || !self.is_walkable(target) {
            return Action::NoOp;
        }
        self.breadth_first(start, false, |visit| {
            (visit.pos == target).then_some(visit.first)
        })
        .unwrap_or(Action::NoOp)
    }

    fn is_open_floor(&self, pos: Position) -> bool {
        matches!(self.state.cell_at(pos), Some(cell) if !cell.blocks_movement())
    }

    fn is_box(&self, pos: Position) -> bool {
        self.state.cell_at(pos) == Some(CellType::Box)
    }

    // Each tile carries the move that left `start` toward it. With `occupied_start` the
    // start only has to be open floor, so a bot standing on its own bomb can still search.
    fn breadth_first<T>(
        &self,
        start: Position,
        occupied_start: bool,
        mut found: impl FnMut(&Visit) -> Option<T>,
    ) -> Option<T> {
        let start_ok = if occupied_start {
            self.is_open_floor(start)
        } else {
            self.is_walkable(start)
        };
        if !start_ok {
            return None;
        }
        let mut visited = TileSet::new(self.state);
        visited.insert(start);
        let mut queue = VecDeque::new();
        queue.push_back(Visit {
            pos: start,
            first: Action::NoOp,
            depth: 0,
        });

        while let Some(visit) = queue.pop_front() {
            if let Some(result) = found(&visit) {
                return Some(result);
            }
            for dir in Direction::ALL {
                let Some(next) = visit.pos.step(dir) else {
                    continue;
                };
                if !self.is_walkable(next) || !visited.insert(next) {
                    continue;
                }
                let first = if visit.depth == 0 {
                    Action::from_direction(dir)
                } else {
                    visit.first
                };
                queue.push_back(Visit {
                    pos: next,
                    first,
                    depth: visit.depth + 1,
                });
            }
        }
        None
    }

    fn bombs(&self) -> &'a [Bomb] {
        &self.state.bombs
    }
}
