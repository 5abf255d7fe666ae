use crate::state::GameState;
use crate::types::Position;

#[derive(Clone, Debug)]
pub(super) struct TileSet<'a> {
    state: &'a GameState,
    bits: Vec<bool>,
}

impl<'a> TileSet<'a> {
    pub(super) fn new(state: &'a GameState) -> Self {
        Self {
            state,
            bits: vec![false; state.cell_count()],
        }
    }

    pub(super) fn insert(&mut self, pos: Position) -> bool {
        let Some(idx) = self.state.index_of(pos) else {
            return false;
        };
        match self.bits.get_mut(idx) {
            Some(bit) if !*bit => {
                *bit = true;
                true
            }
            _ => false,
        }
    }

    pub(super) fn contains(&self, pos: Position) -> bool {
        self.state
            .index_of(pos)
            .and_then(|idx| self.bits.get(idx))
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_reports_new_members_only() {
        let state = GameState::from_rows(&["...", "..."]);
        let mut set = TileSet::new(&state);
        assert!(set.insert(Position::new(2, 1)));
        assert!(!set.insert(Position::new(2, 1)));
        assert!(set.contains(Position::new(2, 1)));
        assert!(!set.contains(Position::new(1, 2)));
    }

    #[test]
    fn out_of_bounds_positions_are_ignored() {
        let state = GameState::from_rows(&["..."]);
        let mut set = TileSet::new(&state);
        assert!(!set.insert(Position::new(3, 0)));
        assert!(!set.insert(Position::new(-1, 0)));
        assert!(!set.contains(Position::new(3, 0)));
    }
}
