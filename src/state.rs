use crate::config::BlastRules;
use crate::constants::DETACHED_POSITION;
use crate::types::{Bomb, CellType, PlayerSnapshot, Position};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    pub cells: Vec<Vec<CellType>>,
    pub bombs: Vec<Bomb>,
    pub explosions: Vec<Position>,
    pub players: Vec<PlayerSnapshot>,
    pub me: PlayerSnapshot,
    pub opponents: Vec<PlayerSnapshot>,
    pub rules: BlastRules,
}

impl GameState {
    pub fn new(width: i32, height: i32, cells: Vec<Vec<CellType>>) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let mut cells = cells;
        cells.truncate(height as usize);
        cells.resize_with(height as usize, Vec::new);
        for row in &mut cells {
            row.resize(width as usize, CellType::Air);
        }
        Self {
            tick: 0,
            width,
            height,
            cells,
            bombs: Vec::new(),
            explosions: Vec::new(),
            players: Vec::new(),
            me: detached_player(""),
            opponents: Vec::new(),
            rules: BlastRules::default(),
        }
    }

    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0) as i32;
        let cells = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| match c {
                        '#' => CellType::Wall,
                        'B' => CellType::Box,
                        _ => CellType::Air,
                    })
                    .collect()
            })
            .collect();
        Self::new(width, height, cells)
    }

    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_rules(mut self, rules: BlastRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_bombs(mut self, bombs: Vec<Bomb>) -> Self {
        self.bombs = bombs;
        self
    }

    pub fn with_explosions(mut self, explosions: Vec<Position>) -> Self {
        self.explosions = explosions;
        self
    }

    pub fn with_players(mut self, players: Vec<PlayerSnapshot>, me_id: &str) -> Self {
        self.opponents = players
            .iter()
            .filter(|player| player.id != me_id)
            .cloned()
            .collect();
        self.players = players;
        self.me = self
            .player(me_id)
            .cloned()
            .unwrap_or_else(|| detached_player(me_id));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn cell_at(&self, pos: Position) -> Option<CellType> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
            .copied()
    }

    pub fn index_of(&self, pos: Position) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn cell_count(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.width as usize * self.height as usize
    }

    pub fn bomb_at(&self, pos: Position) -> Option<&Bomb> {
        self.bombs.iter().find(|bomb| bomb.position == pos)
    }

    pub fn has_bomb_at(&self, pos: Position) -> bool {
        self.bomb_at(pos).is_some()
    }

    pub fn has_explosion_at(&self, pos: Position) -> bool {
        self.explosions.contains(&pos)
    }

    pub fn player(&self, id: &str) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|player| player.id == id)
    }
}

fn detached_player(id: &str) -> PlayerSnapshot {
    PlayerSnapshot {
        id: id.to_string(),
        position: Position::new(DETACHED_POSITION.0, DETACHED_POSITION.1),
        health: 0,
        score: 0,
    }
}
