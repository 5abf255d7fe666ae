use crate::types::{Action, Bomb, Direction, Position};

use super::Navigator;

impl Navigator<'_> {
    /// Closest walkable tile (by steps) that is safe this tick, `start` included.
    pub fn nearest_safe_position(&self, start: Position) -> Option<Position> {
        self.breadth_first(start, false, |visit| {
            self.is_safe(visit.pos).then_some(visit.pos)
        })
    }

    /// Closest box measured by walking distance to a tile next to it. Boxes with no
    /// reachable walkable neighbor are never returned.
    pub fn nearest_box(&self, start: Position) -> Option<Position> {
        self.breadth_first(start, false, |visit| {
            Direction::ALL
                .into_iter()
                .filter_map(|dir| visit.pos.step(dir))
                .find(|neighbor| self.is_box(*neighbor))
        })
    }

    pub fn distance(&self, start: Position, target: Position) -> Option<u32> {
        self.breadth_first(start, false, |visit| {
            (visit.pos == target).then_some(visit.depth)
        })
    }

    pub fn safe_moves(&self, pos: Position) -> Vec<Action> {
        let mut moves: Vec<Action> = Direction::ALL
            .into_iter()
            .filter_map(|dir| Some((dir, pos.step(dir)?)))
            .filter(|(_, next)| self.is_walkable(*next) && self.is_safe(*next))
            .map(|(dir, _)| Action::from_direction(dir))
            .collect();
        if self.is_safe(pos) {
            moves.push(Action::NoOp);
        }
        moves
    }

    /// First move toward the nearest safe tile. Unlike [`Navigator::route_first_step`]
    /// this also works while standing on a bomb.
    pub fn escape_step(&self, start: Position) -> Action {
        self.breadth_first(start, true, |visit| {
            self.is_safe(visit.pos).then_some(visit.first)
        })
        .unwrap_or(Action::NoOp)
    }

    /// Whether a safe tile would stay reachable after dropping a bomb on `pos`.
    /// The new bomb is treated as detonating immediately, chain reactions included.
    pub fn can_escape_after_bomb(&self, pos: Position) -> bool {
        if !self.is_walkable(pos) {
            return false;
        }
        let mut hypothetical = self.state.clone();
        hypothetical.bombs.push(Bomb {
            position: pos,
            fuse: 0,
        });
        let nav = Navigator::new(&hypothetical);
        nav.breadth_first(pos, true, |visit| nav.is_safe(visit.pos).then_some(()))
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use crate::state::GameState;
    use crate::types::{Action, Bomb, CellType, Position};

    use super::super::Navigator;

    fn bomb(x: i32, y: i32, fuse: i32) -> Bomb {
        Bomb {
            position: Position::new(x, y),
            fuse,
        }
    }

    #[test]
    fn nearest_safe_position_returns_start_when_safe() {
        let state = GameState::from_rows(&["..."]);
        let nav = Navigator::new(&state);
        assert_eq!(
            nav.nearest_safe_position(Position::new(1, 0)),
            Some(Position::new(1, 0))
        );
    }

    #[test]
    fn nearest_safe_position_leaves_the_blast() {
        // Bomb at (0,1) covers column 0 and row 1; the first safe tile in BFS order is (1,0).
        let state = GameState::from_rows(&[".....", ".....", "....."])
            .with_bombs(vec![bomb(0, 1, 0)]);
        let nav = Navigator::new(&state);
        assert_eq!(
            nav.nearest_safe_position(Position::new(0, 0)),
            Some(Position::new(1, 0))
        );
        assert_eq!(
            nav.nearest_safe_position(Position::new(2, 1)),
            Some(Position::new(2, 0))
        );
    }

    #[test]
    fn nearest_safe_position_none_when_trapped() {
        let state = GameState::from_rows(&["..#", "###"]).with_bombs(vec![bomb(1, 0, 0)]);
        let nav = Navigator::new(&state);
        assert_eq!(nav.nearest_safe_position(Position::new(0, 0)), None);
    }

    #[test]
    fn nearest_safe_position_requires_walkable_start() {
        let state = GameState::from_rows(&["#.."]).with_bombs(vec![bomb(2, 0, 5)]);
        let nav = Navigator::new(&state);
        assert_eq!(nav.nearest_safe_position(Position::new(0, 0)), None);
        assert_eq!(nav.nearest_safe_position(Position::new(2, 0)), None);
        assert_eq!(nav.nearest_safe_position(Position::new(9, 9)), None);
    }

    #[test]
    fn nearest_box_prefers_reachable_box_over_closer_walled_box() {
        // The box at (2,0) is two tiles away but sealed behind walls; the box at the end
        // of the corridor is much farther yet reachable.
        let state = GameState::from_rows(&[
            ".#B#....",
            ".###.##.",
            "......#B",
        ]);
        let nav = Navigator::new(&state);
        let start = Position::new(0, 0);
        assert_eq!(state.cell_at(Position::new(2, 0)), Some(CellType::Box));
        assert_eq!(nav.nearest_box(start), Some(Position::new(7, 2)));
    }

    #[test]
    fn nearest_box_uses_up_right_down_left_neighbor_order() {
        let state = GameState::from_rows(&[".B.", "B.B", ".B."]);
        let nav = Navigator::new(&state);
        assert_eq!(
            nav.nearest_box(Position::new(1, 1)),
            Some(Position::new(1, 0))
        );
    }

    #[test]
    fn nearest_box_none_without_boxes_or_valid_start() {
        let state = GameState::from_rows(&["...", "..."]);
        let nav = Navigator::new(&state);
        assert_eq!(nav.nearest_box(Position::new(0, 0)), None);
        let boxed = GameState::from_rows(&["#B."]);
        let nav = Navigator::new(&boxed);
        assert_eq!(nav.nearest_box(Position::new(0, 0)), None);
        assert_eq!(nav.nearest_box(Position::new(-3, 0)), None);
        assert_eq!(nav.nearest_box(Position::new(2, 0)), Some(Position::new(1, 0)));
    }

    #[test]
    fn distance_counts_steps_around_obstacles() {
        let state = GameState::from_rows(&[".#.", "...", "..."]);
        let nav = Navigator::new(&state);
        assert_eq!(nav.distance(Position::new(0, 0), Position::new(2, 0)), Some(4));
        assert_eq!(nav.distance(Position::new(0, 0), Position::new(0, 0)), Some(0));
        assert_eq!(nav.distance(Position::new(0, 0), Position::new(1, 0)), None);
    }

    #[test]
    fn safe_moves_skip_blast_and_blocked_tiles() {
        let state = GameState::from_rows(&["...", "..#", "..."]).with_bombs(vec![bomb(0, 1, 0)]);
        let nav = Navigator::new(&state);
        // Standing at (1,1): left is the bomb, right is a wall, row 1 is in the blast.
        assert_eq!(
            nav.safe_moves(Position::new(1, 1)),
            vec![Action::MoveUp, Action::MoveDown]
        );
        assert_eq!(
            nav.safe_moves(Position::new(2, 0)),
            vec![Action::MoveLeft, Action::NoOp]
        );
    }

    #[test]
    fn escape_step_works_from_own_bomb() {
        let state = GameState::from_rows(&["....", "#.##"]).with_bombs(vec![bomb(1, 0, 2)]);
        let nav = Navigator::new(&state);
        assert_eq!(nav.nearest_safe_position(Position::new(1, 0)), None);
        assert_eq!(nav.escape_step(Position::new(1, 0)), Action::MoveRight);
    }

    #[test]
    fn can_escape_after_bomb_detects_dead_ends() {
        let corridor = GameState::from_rows(&["###.", "....", "###."]);
        let nav = Navigator::new(&corridor);
        assert!(nav.can_escape_after_bomb(Position::new(0, 1)));

        let dead_end = GameState::from_rows(&["###", "...", "###"]);
        let nav = Navigator::new(&dead_end);
        assert!(!nav.can_escape_after_bomb(Position::new(0, 1)));
        assert!(!nav.can_escape_after_bomb(Position::new(5, 5)));
    }
}
