use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn step(self, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.delta();
        Some(Position {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }

    /// Runtime validity check for positions that did not come through the type system:
    /// both coordinates must be present, finite, integral and fit in `i32`.
    pub fn from_json(value: &Value) -> Option<Position> {
        match value {
            Value::Object(object) => Some(Position {
                x: coordinate(object.get("x")?)?,
                y: coordinate(object.get("y")?)?,
            }),
            Value::Array(items) if items.len() == 2 => Some(Position {
                x: coordinate(&items[0])?,
                y: coordinate(&items[1])?,
            }),
            _ => None,
        }
    }
}

fn coordinate(value: &Value) -> Option<i32> {
    if let Some(number) = value.as_i64() {
        return i32::try_from(number).ok();
    }
    if let Some(number) = value.as_u64() {
        return i32::try_from(number).ok();
    }
    let number = value.as_f64()?;
    if !number.is_finite() || number.fract() != 0.0 {
        return None;
    }
    if number < i32::MIN as f64 || number > i32::MAX as f64 {
        return None;
    }
    Some(number as i32)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CellType {
    #[default]
    Air,
    Wall,
    Box,
}

impl CellType {
    pub fn decode(value: &Value) -> Self {
        if let Some(raw) = value.as_str() {
            return match raw.trim().to_ascii_uppercase().as_str() {
                "WALL" => Self::Wall,
                "BOX" => Self::Box,
                _ => Self::Air,
            };
        }
        match value.as_i64() {
            Some(1) => Self::Wall,
            Some(2) => Self::Box,
            _ => Self::Air,
        }
    }

    pub fn is_known(value: &Value) -> bool {
        if let Some(raw) = value.as_str() {
            return matches!(
                raw.trim().to_ascii_uppercase().as_str(),
                "AIR" | "WALL" | "BOX"
            );
        }
        matches!(value.as_i64(), Some(0..=2))
    }

    pub fn blocks_movement(self) -> bool {
        matches!(self, Self::Wall | Self::Box)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    // Expansion order for every search; tie-breaking depends on it.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PlaceBomb,
    #[default]
    NoOp,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
        Action::PlaceBomb,
        Action::NoOp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::MoveUp => "move-up",
            Action::MoveDown => "move-down",
            Action::MoveLeft => "move-left",
            Action::MoveRight => "move-right",
            Action::PlaceBomb => "place-bomb",
            Action::NoOp => "no-op",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "move-up" | "up" => Some(Self::MoveUp),
            "move-down" | "down" => Some(Self::MoveDown),
            "move-left" | "left" => Some(Self::MoveLeft),
            "move-right" | "right" => Some(Self::MoveRight),
            "place-bomb" | "bomb" => Some(Self::PlaceBomb),
            "no-op" | "noop" | "none" | "wait" => Some(Self::NoOp),
            _ => None,
        }
    }

    pub fn from_direction(dir: Direction) -> Self {
        match dir {
            Direction::Up => Self::MoveUp,
            Direction::Right => Self::MoveRight,
            Direction::Down => Self::MoveDown,
            Direction::Left => Self::MoveLeft,
        }
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::MoveUp => Some(Direction::Up),
            Self::MoveRight => Some(Direction::Right),
            Self::MoveDown => Some(Direction::Down),
            Self::MoveLeft => Some(Direction::Left),
            Self::PlaceBomb | Self::NoOp => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bomb {
    pub position: Position,
    pub fuse: i32,
}

impl Bomb {
    pub fn is_detonating(&self) -> bool {
        self.fuse <= 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub id: String,
    pub position: Position,
    pub health: i32,
    pub score: i32,
}
