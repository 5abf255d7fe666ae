use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc::error::TryRecvError;

use crate::config::ClientConfig;
use crate::diagnostics::{LogEvent, LogLevel, SharedSink};
use crate::error::{Result, SdkError};
use crate::harness::{Bot, BotHarness};
use crate::protocol::{parse_server_message, ClientMessage, ParsedServerMessage};
use crate::sanitize::sanitize_snapshot;
use crate::transport::{self, Connection, OutboundMessage};
use crate::types::Action;

const LOGGED_RAW_PREFIX: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    GameOver { winner_id: Option<String> },
    Disconnected,
}

pub struct GameClient {
    config: ClientConfig,
    sink: SharedSink,
}

impl GameClient {
    pub fn new(config: ClientConfig, sink: SharedSink) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn run<B: Bot>(&self, bot: B) -> Result<SessionEnd> {
        self.config.validate()?;
        let harness = BotHarness::new(bot, self.config.decision_timeout, self.sink.clone());
        let mut failures = 0u32;

        loop {
            match transport::connect(&self.config, self.sink.clone()).await {
                Ok(connection) => {
                    failures = 0;
                    let end = self.run_session(connection, &harness).await;
                    if matches!(end, SessionEnd::GameOver { .. }) {
                        return Ok(end);
                    }
                }
                Err(err) => {
                    self.log(
                        LogLevel::Warn,
                        "client.connect_failed",
                        None,
                        json!({ "error": err.to_string() }),
                    );
                    if matches!(err, SdkError::Config(_) | SdkError::InvalidHeader(_)) {
                        return Err(err);
                    }
                }
            }

            failures += 1;
            if failures > self.config.max_reconnect_attempts {
                return Err(SdkError::ReconnectExhausted {
                    attempts: self.config.max_reconnect_attempts,
                });
            }
            self.log(
                LogLevel::Info,
                "client.reconnecting",
                None,
                json!({
                    "attempt": failures,
                    "delayMs": self.config.reconnect_delay.as_millis() as u64,
                }),
            );
            tokio::time::sleep(self.config.reconnect_delay).await;
        }
    }

    pub async fn run_session<B: Bot>(
        &self,
        mut connection: Connection,
        harness: &BotHarness<B>,
    ) -> SessionEnd {
        let hello = ClientMessage::Hello {
            name: self.config.bot_name.clone(),
        };
        if !send(&connection, hello).await {
            return SessionEnd::Disconnected;
        }

        let mut me_id: Option<String> = None;
        while let Some(first) = connection.inbound.recv().await {
            let mut batch = vec![first];
            loop {
                match connection.inbound.try_recv() {
                    Ok(raw) => batch.push(raw),
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }

            let parsed: Vec<ParsedServerMessage> = batch
                .iter()
                .filter_map(|raw| {
                    let message = parse_server_message(raw);
                    if message.is_none() {
                        let prefix: String = raw.chars().take(LOGGED_RAW_PREFIX).collect();
                        self.log(
                            LogLevel::Warn,
                            "client.unparsed_message",
                            None,
                            json!({ "raw": prefix }),
                        );
                    }
                    message
                })
                .collect();
            let latest_state = parsed
                .iter()
                .rposition(|message| matches!(message, ParsedServerMessage::GameState { .. }));

            for (idx, message) in parsed.into_iter().enumerate() {
                match message {
                    ParsedServerMessage::Welcome { player_id } => {
                        self.log(
                            LogLevel::Info,
                            "client.welcome",
                            None,
                            json!({ "playerId": player_id }),
                        );
                        me_id = Some(player_id);
                    }
                    ParsedServerMessage::GameState { tick, payload } => {
                        if Some(idx) != latest_state {
                            self.log(LogLevel::Debug, "client.state_superseded", tick, json!({}));
                            continue;
                        }
                        let mut state = sanitize_snapshot(&payload, me_id.as_deref(), &*self.sink)
                            .with_rules(self.config.blast);
                        if let Some(tick) = tick {
                            state.tick = tick;
                        }
                        let action = harness.decide(Arc::new(state)).await;
                        self.log(
                            LogLevel::Debug,
                            "client.action",
                            tick,
                            json!({ "action": action.as_str() }),
                        );
                        if !send(&connection, ClientMessage::Action { action, tick }).await {
                            return SessionEnd::Disconnected;
                        }
                    }
                    ParsedServerMessage::Ping { t } => {
                        if !send(&connection, ClientMessage::Pong { t }).await {
                            return SessionEnd::Disconnected;
                        }
                    }
                    ParsedServerMessage::Error { message } => {
                        self.log(
                            LogLevel::Warn,
                            "client.server_error",
                            None,
                            json!({ "message": message }),
                        );
                    }
                    ParsedServerMessage::GameOver { winner_id } => {
                        let won = winner_id.is_some() && winner_id == me_id;
                        self.log(
                            LogLevel::Info,
                            "client.game_over",
                            None,
                            json!({ "winnerId": winner_id, "won": won }),
                        );
                        let _ = connection
                            .outbound
                            .send(OutboundMessage::Close {
                                reason: "game over".to_string(),
                            })
                            .await;
                        return SessionEnd::GameOver { winner_id };
                    }
                }
            }
        }

        self.log(LogLevel::Info, "client.disconnected", None, json!({}));
        SessionEnd::Disconnected
    }

    fn log(&self, level: LogLevel, event: &str, tick: Option<u64>, details: serde_json::Value) {
        let mut event = LogEvent::new(level, event, details);
        event.tick = tick;
        self.sink.emit(event);
    }
}

async fn send(connection: &Connection, message: ClientMessage) -> bool {
    connection
        .outbound
        .send(OutboundMessage::Text(message.encode()))
        .await
        .is_ok()
}

pub fn constant_bot(action: Action) -> impl Bot {
    move |_: &crate::state::GameState| Some(action)
}
