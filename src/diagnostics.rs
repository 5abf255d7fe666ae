use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEvent {
    pub level: LogLevel,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,
    pub details: Value,
}

impl LogEvent {
    pub fn new(level: LogLevel, event: &str, details: Value) -> Self {
        Self {
            level,
            event: event.to_string(),
            tick: None,
            details,
        }
    }

    pub fn at_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }
}

pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: LogEvent);
}

pub type SharedSink = Arc<dyn DiagnosticSink>;

#[derive(Serialize)]
struct StructuredLogLine<'a> {
    timestamp: String,
    #[serde(flatten)]
    event: &'a LogEvent,
}

pub struct StderrJsonSink {
    min_level: LogLevel,
}

impl StderrJsonSink {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl DiagnosticSink for StderrJsonSink {
    fn emit(&self, event: LogEvent) {
        if event.level < self.min_level {
            return;
        }
        let line = StructuredLogLine {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event: &event,
        };
        if let Ok(encoded) = serde_json::to_string(&line) {
            eprintln!("{encoded}");
        }
    }
}

pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _event: LogEvent) {}
}

#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn names(&self) -> Vec<String> {
        self.events().into_iter().map(|event| event.event).collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, event: LogEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn level_parsing_accepts_common_spellings() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse(" info "), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("loud"), None);
        assert!(LogLevel::Debug < LogLevel::Error);
    }

    #[test]
    fn structured_line_flattens_event_fields() {
        let event = LogEvent::new(LogLevel::Warn, "harness.timeout", json!({"ms": 250})).at_tick(7);
        let line = StructuredLogLine {
            timestamp: "2026-01-01T00:00:00.000Z".to_string(),
            event: &event,
        };
        let encoded = serde_json::to_value(&line).expect("log line should serialize");
        assert_eq!(
            encoded,
            json!({
                "timestamp": "2026-01-01T00:00:00.000Z",
                "level": "warn",
                "event": "harness.timeout",
                "tick": 7,
                "details": {"ms": 250},
            })
        );
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.emit(LogEvent::new(LogLevel::Info, "a", Value::Null));
        sink.emit(LogEvent::new(LogLevel::Error, "b", Value::Null));
        assert_eq!(sink.names(), vec!["a".to_string(), "b".to_string()]);
    }
}
