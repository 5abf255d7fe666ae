use crate::config::BlastRules;
use crate::state::GameState;
use crate::types::{Bomb, CellType, Direction, Position};

use super::utils::TileSet;
use super::Navigator;

pub(super) struct DangerMap<'a> {
    tiles: TileSet<'a>,
    imminent: Vec<bool>,
}

impl<'a> DangerMap<'a> {
    pub(super) fn build(state: &'a GameState) -> Self {
        let mut tiles = TileSet::new(state);
        for bomb in &state.bombs {
            tiles.insert(bomb.position);
        }

        let blasts = detonations(state, state.rules);
        for footprint in blasts.iter().flatten() {
            for pos in footprint {
                tiles.insert(*pos);
            }
        }
        let imminent = blasts.iter().map(Option::is_some).collect();
        Self { tiles, imminent }
    }

    pub(super) fn contains(&self, pos: Position) -> bool {
        self.tiles.contains(pos)
    }
}

// The detonating tile plus a ray of up to `radius` tiles per direction. A wall stops the
// ray before itself; a box is hit and stops it when boxes absorb blasts.
pub(super) fn footprint(state: &GameState, rules: BlastRules, origin: Position) -> Vec<Position> {
    let mut tiles = Vec::new();
    if !state.in_bounds(origin) {
        return tiles;
    }
    tiles.push(origin);
    for dir in Direction::ALL {
        let mut cursor = origin;
        for _ in 0..rules.radius {
            let Some(next) = cursor.step(dir) else {
                break;
            };
            match state.cell_at(next) {
                None | Some(CellType::Wall) => break,
                Some(CellType::Box) => {
                    tiles.push(next);
                    if rules.box_absorbs {
                        break;
                    }
                }
                Some(CellType::Air) => tiles.push(next),
            }
            cursor = next;
        }
    }
    tiles
}

// Per bomb: its footprint when it goes off this tick (elapsed fuse, or caught in another
// detonating bomb's footprint), otherwise `None`.
fn detonations(state: &GameState, rules: BlastRules) -> Vec<Option<Vec<Position>>> {
    let mut queued: Vec<bool> = state.bombs.iter().map(Bomb::is_detonating).collect();
    let mut pending: Vec<usize> = (0..queued.len()).filter(|idx| queued[*idx]).collect();
    let mut blasts = vec![None; state.bombs.len()];

    while let Some(idx) = pending.pop() {
        let tiles = footprint(state, rules, state.bombs[idx].position);
        for (other, bomb) in state.bombs.iter().enumerate() {
            if !queued[other] && tiles.contains(&bomb.position) {
                queued[other] = true;
                pending.push(other);
            }
        }
        blasts[idx] = Some(tiles);
    }
    blasts
}

impl<'a> Navigator<'a> {
    /// False for out-of-bounds tiles, explosions, bomb tiles and anything an imminent
    /// bomb will hit this tick. Bombs with time left that no chain reaches are ignored.
    pub fn is_safe(&self, pos: Position) -> bool {
        self.state.in_bounds(pos)
            && !self.state.has_explosion_at(pos)
            && !self.danger().contains(pos)
    }

    pub fn blast_footprint(&self, origin: Position) -> Vec<Position> {
        footprint(self.state, self.state.rules, origin)
    }

    pub fn imminent_bombs(&self) -> Vec<Bomb> {
        self.bombs()
            .iter()
            .zip(&self.danger().imminent)
            .filter(|(_, detonates)| **detonates)
            .map(|(bomb, _)| *bomb)
            .collect()
    }

    fn danger(&self) -> &DangerMap<'a> {
        self.danger.get_or_init(|| DangerMap::build(self.state))
    }
}
