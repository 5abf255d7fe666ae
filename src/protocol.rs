use serde::Serialize;
use serde_json::Value;

use crate::types::Action;

#[derive(Debug, PartialEq)]
pub enum ParsedServerMessage {
    Welcome { player_id: String },
    GameState { tick: Option<u64>, payload: Value },
    GameOver { winner_id: Option<String> },
    Error { message: String },
    Ping { t: f64 },
}

pub fn parse_server_message(raw: &str) -> Option<ParsedServerMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "welcome" => {
            let player_id = object.get("playerId")?.as_str()?.trim().to_string();
            if player_id.is_empty() {
                return None;
            }
            Some(ParsedServerMessage::Welcome { player_id })
        }
        "game_state" | "state" => {
            let tick = object.get("tick").and_then(parse_tick);
            // Older servers inline the snapshot next to `type` instead of nesting it.
            let payload = match object.get("payload") {
                Some(payload) => payload.clone(),
                None => value.clone(),
            };
            let tick = tick.or_else(|| payload.get("tick").and_then(parse_tick));
            Some(ParsedServerMessage::GameState { tick, payload })
        }
        "game_over" => {
            let winner_id = match object.get("winnerId") {
                None | Some(Value::Null) => None,
                Some(value) => Some(value.as_str()?.to_string()),
            };
            Some(ParsedServerMessage::GameOver { winner_id })
        }
        "error" => {
            let message = object
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            Some(ParsedServerMessage::Error { message })
        }
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedServerMessage::Ping { t })
        }
        _ => None,
    }
}

// A tick that is not a non-negative number is dropped, never the snapshot carrying it.
fn parse_tick(value: &Value) -> Option<u64> {
    if let Some(tick) = value.as_u64() {
        return Some(tick);
    }
    let tick = value.as_f64()?;
    if !tick.is_finite() || tick < 0.0 || tick > u64::MAX as f64 {
        return None;
    }
    Some(tick.floor() as u64)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello {
        name: String,
    },
    Action {
        action: Action,
        #[serde(skip_serializing_if = "Option::is_none")]
        tick: Option<u64>,
    },
    Pong {
        t: f64,
    },
}

impl ClientMessage {
    pub fn encode(&self) -> String {
        // Every variant is plain data, so serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
