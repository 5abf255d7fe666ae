use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::Mutex;

use crate::diagnostics::{LogEvent, LogLevel, SharedSink};
use crate::state::GameState;
use crate::types::Action;

/// User decision logic. Returning `None` means "no opinion" and is sent as `no-op`.
pub trait Bot: Send + 'static {
    fn name(&self) -> &str {
        "bot"
    }

    fn decide(&mut self, state: &GameState) -> Option<Action>;
}

impl<F> Bot for F
where
    F: FnMut(&GameState) -> Option<Action> + Send + 'static,
{
    fn decide(&mut self, state: &GameState) -> Option<Action> {
        self(state)
    }
}

/// Runs a [`Bot`] off the async runtime with a deadline. Whatever goes wrong inside the
/// bot, the caller always gets a valid [`Action`].
pub struct BotHarness<B: Bot> {
    bot: Arc<Mutex<B>>,
    timeout: Duration,
    sink: SharedSink,
}

impl<B: Bot> BotHarness<B> {
    pub fn new(bot: B, timeout: Duration, sink: SharedSink) -> Self {
        Self {
            bot: Arc::new(Mutex::new(bot)),
            timeout,
            sink,
        }
    }

    pub async fn decide(&self, state: Arc<GameState>) -> Action {
        let tick = state.tick;
        // A bot still running past an earlier deadline keeps the lock; skip this tick.
        let Ok(mut bot) = self.bot.clone().try_lock_owned() else {
            self.report(LogLevel::Warn, "harness.busy", tick, json!({}));
            return Action::NoOp;
        };

        let task = tokio::task::spawn_blocking(move || bot.decide(&state));
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Some(action))) => action,
            Ok(Ok(None)) => {
                self.report(LogLevel::Debug, "harness.no_decision", tick, json!({}));
                Action::NoOp
            }
            Ok(Err(err)) => {
                let reason = if err.is_panic() {
                    panic_message(err.into_panic())
                } else {
                    err.to_string()
                };
                self.report(
                    LogLevel::Error,
                    "harness.bot_failed",
                    tick,
                    json!({ "reason": reason }),
                );
                Action::NoOp
            }
            Err(_) => {
                self.report(
                    LogLevel::Warn,
                    "harness.timeout",
                    tick,
                    json!({ "timeoutMs": self.timeout.as_millis() as u64 }),
                );
                Action::NoOp
            }
        }
    }

    fn report(&self, level: LogLevel, event: &str, tick: u64, details: serde_json::Value) {
        self.sink
            .emit(LogEvent::new(level, event, details).at_tick(tick));
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "bot panicked".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;

    fn state_at_tick(tick: u64) -> Arc<GameState> {
        Arc::new(GameState::from_rows(&["..."]).with_tick(tick))
    }

    fn harness<B: Bot>(bot: B, timeout_ms: u64) -> (BotHarness<B>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let harness = BotHarness::new(bot, Duration::from_millis(timeout_ms), sink.clone());
        (harness, sink)
    }

    #[tokio::test]
    async fn returns_bot_action() {
        let (harness, sink) = harness(|_: &GameState| Some(Action::PlaceBomb), 500);
        assert_eq!(harness.decide(state_at_tick(1)).await, Action::PlaceBomb);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn bot_sees_the_snapshot_it_was_given() {
        let (harness, _) = harness(
            |state: &GameState| (state.tick == 5).then_some(Action::MoveDown),
            500,
        );
        assert_eq!(harness.decide(state_at_tick(5)).await, Action::MoveDown);
        assert_eq!(harness.decide(state_at_tick(6)).await, Action::NoOp);
    }

    #[tokio::test]
    async fn panicking_bot_falls_back_to_noop() {
        let (harness, sink) = harness(
            |_: &GameState| -> Option<Action> { panic!("bad bot") },
            500,
        );
        assert_eq!(harness.decide(state_at_tick(2)).await, Action::NoOp);
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "harness.bot_failed");
        assert_eq!(events[0].details["reason"], "bad bot");

        // The bot lock is released after a panic.
        assert_eq!(harness.decide(state_at_tick(3)).await, Action::NoOp);
        assert_eq!(sink.names().last().map(String::as_str), Some("harness.bot_failed"));
    }

    #[tokio::test]
    async fn slow_bot_times_out_and_stays_busy() {
        let (harness, sink) = harness(
            |_: &GameState| {
                std::thread::sleep(Duration::from_millis(300));
                Some(Action::MoveUp)
            },
            20,
        );
        assert_eq!(harness.decide(state_at_tick(1)).await, Action::NoOp);
        assert_eq!(harness.decide(state_at_tick(2)).await, Action::NoOp);
        assert_eq!(
            sink.names(),
            vec!["harness.timeout".to_string(), "harness.busy".to_string()]
        );
    }

    struct Counter {
        calls: u32,
    }

    impl Bot for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn decide(&mut self, _state: &GameState) -> Option<Action> {
            self.calls += 1;
            (self.calls % 2 == 0).then_some(Action::MoveRight)
        }
    }

    #[tokio::test]
    async fn bot_state_persists_between_ticks() {
        let (harness, sink) = harness(Counter { calls: 0 }, 500);
        assert_eq!(harness.decide(state_at_tick(1)).await, Action::NoOp);
        assert_eq!(harness.decide(state_at_tick(2)).await, Action::MoveRight);
        assert_eq!(sink.names(), vec!["harness.no_decision".to_string()]);
    }
}
