use std::time::Duration;

use crate::constants::{
    DEFAULT_BLAST_RADIUS, DEFAULT_BOT_NAME, DEFAULT_BOX_ABSORBS_BLAST, DEFAULT_DECISION_TIMEOUT_MS,
    DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_DELAY_MS, DEFAULT_SERVER_URL,
    MAX_BOT_NAME_LEN, MAX_DECISION_TIMEOUT_MS, MIN_DECISION_TIMEOUT_MS,
};
use crate::diagnostics::LogLevel;
use crate::error::{Result, SdkError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlastRules {
    pub radius: u32,
    pub box_absorbs: bool,
}

impl Default for BlastRules {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BLAST_RADIUS,
            box_absorbs: DEFAULT_BOX_ABSORBS_BLAST,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: String,
    pub token: Option<String>,
    pub bot_name: String,
    pub decision_timeout: Duration,
    pub reconnect_delay: Duration,
    pub max_reconnect_attempts: u32,
    pub log_level: LogLevel,
    pub blast: BlastRules,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            bot_name: DEFAULT_BOT_NAME.to_string(),
            decision_timeout: Duration::from_millis(DEFAULT_DECISION_TIMEOUT_MS),
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            log_level: LogLevel::Info,
            blast: BlastRules::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup("BOMBER_SERVER_URL").filter(|value| !value.trim().is_empty()) {
            config.server_url = url.trim().to_string();
        }
        config.token = lookup("BOMBER_TOKEN")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        if let Some(name) = lookup("BOMBER_BOT_NAME") {
            config.bot_name = sanitize_bot_name(&name);
        }
        if let Some(ms) = lookup("BOMBER_DECISION_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
            config.decision_timeout = normalize_decision_timeout(ms);
        }
        if let Some(ms) = lookup("BOMBER_RECONNECT_DELAY_MS").and_then(|v| v.parse::<u64>().ok()) {
            config.reconnect_delay = Duration::from_millis(ms);
        }
        if let Some(count) = lookup("BOMBER_MAX_RECONNECTS").and_then(|v| v.parse::<u32>().ok()) {
            config.max_reconnect_attempts = count;
        }
        if let Some(level) = lookup("BOMBER_LOG_LEVEL").and_then(|v| LogLevel::parse(&v)) {
            config.log_level = level;
        }
        if let Some(radius) = lookup("BOMBER_BLAST_RADIUS").and_then(|v| v.parse::<u32>().ok()) {
            config.blast.radius = radius;
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.server_url.to_ascii_lowercase();
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(SdkError::Config(format!(
                "server url must start with ws:// or wss://, got {}",
                self.server_url
            )));
        }
        if self.decision_timeout.is_zero() {
            return Err(SdkError::Config("decision timeout must be positive".to_string()));
        }
        Ok(())
    }
}

pub fn sanitize_bot_name(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return DEFAULT_BOT_NAME.to_string();
    }
    trimmed.chars().take(MAX_BOT_NAME_LEN).collect()
}

pub fn normalize_decision_timeout(ms: u64) -> Duration {
    Duration::from_millis(ms.clamp(MIN_DECISION_TIMEOUT_MS, MAX_DECISION_TIMEOUT_MS))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.blast.radius, 3);
        assert!(config.blast.box_absorbs);
    }

    #[test]
    fn environment_overrides_are_applied() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("BOMBER_SERVER_URL", " wss://game.example/ws "),
            ("BOMBER_TOKEN", "secret"),
            ("BOMBER_BOT_NAME", "  crab  "),
            ("BOMBER_DECISION_TIMEOUT_MS", "500"),
            ("BOMBER_MAX_RECONNECTS", "0"),
            ("BOMBER_LOG_LEVEL", "debug"),
            ("BOMBER_BLAST_RADIUS", "5"),
        ]));
        assert_eq!(config.server_url, "wss://game.example/ws");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.bot_name, "crab");
        assert_eq!(config.decision_timeout, Duration::from_millis(500));
        assert_eq!(config.max_reconnect_attempts, 0);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.blast.radius, 5);
    }

    #[test]
    fn invalid_numbers_keep_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("BOMBER_DECISION_TIMEOUT_MS", "soon"),
            ("BOMBER_BLAST_RADIUS", "-2"),
            ("BOMBER_TOKEN", "   "),
        ]));
        assert_eq!(
            config.decision_timeout,
            Duration::from_millis(DEFAULT_DECISION_TIMEOUT_MS)
        );
        assert_eq!(config.blast.radius, DEFAULT_BLAST_RADIUS);
        assert_eq!(config.token, None);
    }

    #[test]
    fn decision_timeout_is_clamped() {
        assert_eq!(normalize_decision_timeout(0), Duration::from_millis(10));
        assert_eq!(normalize_decision_timeout(99_999), Duration::from_millis(10_000));
    }

    #[test]
    fn sanitize_bot_name_applies_trim_empty_and_max_len() {
        assert_eq!(sanitize_bot_name("   "), DEFAULT_BOT_NAME);
        assert_eq!(sanitize_bot_name(" Bob "), "Bob");
        assert_eq!(sanitize_bot_name(&"x".repeat(40)).len(), MAX_BOT_NAME_LEN);
    }

    #[test]
    fn validate_rejects_non_websocket_urls() {
        let mut config = ClientConfig::default();
        assert!(config.validate().is_ok());
        config.server_url = "http://example".to_string();
        assert!(matches!(config.validate(), Err(SdkError::Config(_))));
    }
}
