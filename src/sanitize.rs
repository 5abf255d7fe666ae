use serde_json::{json, Map, Value};

use crate::constants::{DETACHED_POSITION, MAX_FIELD_SIDE};
use crate::diagnostics::{DiagnosticSink, LogEvent, LogLevel};
use crate::state::GameState;
use crate::types::{Bomb, CellType, PlayerSnapshot, Position};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub dimensions_defaulted: bool,
    pub cells_defaulted: usize,
    pub rows_reshaped: usize,
    pub bombs_dropped: usize,
    pub fuses_defaulted: usize,
    pub explosions_dropped: usize,
    pub players_dropped: usize,
    pub players_detached: usize,
    pub me_missing: bool,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Turns a raw `game_state` payload into a [`GameState`]. Never fails: anything
/// unrecognised is defaulted and reported to `sink`.
///
/// `fallback_me` names the bot when the payload itself does not (`you` / `playerId`).
pub fn sanitize_snapshot(
    payload: &Value,
    fallback_me: Option<&str>,
    sink: &dyn DiagnosticSink,
) -> GameState {
    let (state, report) = sanitize_with_report(payload, fallback_me);
    if !report.is_clean() {
        sink.emit(
            LogEvent::new(
                LogLevel::Warn,
                "sanitize.defaulted",
                json!({
                    "dimensionsDefaulted": report.dimensions_defaulted,
                    "cellsDefaulted": report.cells_defaulted,
                    "rowsReshaped": report.rows_reshaped,
                    "bombsDropped": report.bombs_dropped,
                    "fusesDefaulted": report.fuses_defaulted,
                    "explosionsDropped": report.explosions_dropped,
                    "playersDropped": report.players_dropped,
                    "playersDetached": report.players_detached,
                    "meMissing": report.me_missing,
                }),
            )
            .at_tick(state.tick),
        );
    }
    state
}

pub fn sanitize_with_report(payload: &Value, fallback_me: Option<&str>) -> (GameState, SanitizeReport) {
    let mut report = SanitizeReport::default();
    let empty = Map::new();
    let object = match payload.as_object() {
        Some(object) => object,
        None => {
            report.dimensions_defaulted = true;
            report.me_missing = true;
            &empty
        }
    };

    let tick = object
        .get("tick")
        .and_then(parse_int)
        .map(|tick| tick.max(0) as u64)
        .unwrap_or(0);

    let raw_rows = object
        .get("cells")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let inferred_width = raw_rows
        .iter()
        .filter_map(Value::as_array)
        .map(Vec::len)
        .max()
        .unwrap_or(0) as i64;
    let width = parse_dimension(object.get("width"), inferred_width, &mut report);
    let height = parse_dimension(object.get("height"), raw_rows.len() as i64, &mut report);
    let cells = sanitize_cells(raw_rows, width, height, &mut report);

    let bombs = sanitize_bombs(object.get("bombs"), &mut report);
    let explosions = sanitize_explosions(object.get("explosions"), &mut report);
    let players = sanitize_players(object.get("players"), &mut report);

    let me_id = object
        .get("you")
        .or_else(|| object.get("playerId"))
        .and_then(Value::as_str)
        .or(fallback_me)
        .unwrap_or("")
        .to_string();
    if !players.iter().any(|player| player.id == me_id) {
        report.me_missing = true;
    }

    let state = GameState::new(width, height, cells)
        .with_tick(tick)
        .with_bombs(bombs)
        .with_explosions(explosions)
        .with_players(players, &me_id);
    (state, report)
}

fn parse_dimension(value: Option<&Value>, inferred: i64, report: &mut SanitizeReport) -> i32 {
    let parsed = match value {
        Some(value) => parse_int(value).filter(|n| *n >= 0),
        None => None,
    };
    let raw = match parsed {
        Some(n) => n,
        None => {
            report.dimensions_defaulted = true;
            inferred
        }
    };
    raw.clamp(0, i64::from(MAX_FIELD_SIDE)) as i32
}

fn sanitize_cells(
    raw_rows: &[Value],
    width: i32,
    height: i32,
    report: &mut SanitizeReport,
) -> Vec<Vec<CellType>> {
    let width = width as usize;
    let height = height as usize;
    if raw_rows.len() != height {
        report.rows_reshaped += 1;
    }
    raw_rows
        .iter()
        .take(height)
        .map(|raw_row| {
            let items = raw_row.as_array().map(Vec::as_slice).unwrap_or(&[]);
            if items.len() != width {
                report.rows_reshaped += 1;
            }
            items
                .iter()
                .take(width)
                .map(|item| {
                    if !CellType::is_known(item) {
                        report.cells_defaulted += 1;
                    }
                    CellType::decode(item)
                })
                .collect()
        })
        .collect()
}

fn sanitize_bombs(value: Option<&Value>, report: &mut SanitizeReport) -> Vec<Bomb> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut bombs = Vec::with_capacity(items.len());
    for item in items {
        let Some(position) = entity_position(item) else {
            report.bombs_dropped += 1;
            continue;
        };
        let fuse = match item.get("fuse").and_then(parse_int) {
            Some(fuse) => fuse.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            None => {
                report.fuses_defaulted += 1;
                0
            }
        };
        bombs.push(Bomb { position, fuse });
    }
    bombs
}

fn sanitize_explosions(value: Option<&Value>, report: &mut SanitizeReport) -> Vec<Position> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let position = entity_position(item);
            if position.is_none() {
                report.explosions_dropped += 1;
            }
            position
        })
        .collect()
}

fn sanitize_players(value: Option<&Value>, report: &mut SanitizeReport) -> Vec<PlayerSnapshot> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut players: Vec<PlayerSnapshot> = Vec::with_capacity(items.len());
    for item in items {
        let Some(id) = item.get("id").and_then(player_id) else {
            report.players_dropped += 1;
            continue;
        };
        if players.iter().any(|player| player.id == id) {
            report.players_dropped += 1;
            continue;
        }
        let position = entity_position(item).unwrap_or_else(|| {
            report.players_detached += 1;
            Position::new(DETACHED_POSITION.0, DETACHED_POSITION.1)
        });
        players.push(PlayerSnapshot {
            id,
            position,
            health: item.get("health").and_then(parse_int).map(clamp_i32).unwrap_or(0),
            score: item.get("score").and_then(parse_int).map(clamp_i32).unwrap_or(0),
        });
    }
    players
}

fn entity_position(item: &Value) -> Option<Position> {
    if let Some(nested) = item.get("position") {
        return Position::from_json(nested);
    }
    Position::from_json(item)
}

fn player_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn parse_int(value: &Value) -> Option<i64> {
    if let Some(number) = value.as_i64() {
        return Some(number);
    }
    if let Some(number) = value.as_u64() {
        return Some(i64::try_from(number).unwrap_or(i64::MAX));
    }
    let number = value.as_f64()?;
    if !number.is_finite() {
        return None;
    }
    let floored = number.floor();
    if floored < i64::MIN as f64 || floored > i64::MAX as f64 {
        return None;
    }
    Some(floored as i64)
}
