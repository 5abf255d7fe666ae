use std::process::ExitCode;
use std::sync::Arc;

use bomber_bot_sdk::config::normalize_decision_timeout;
use bomber_bot_sdk::diagnostics::{DiagnosticSink, LogEvent, LogLevel, StderrJsonSink};
use bomber_bot_sdk::{
    Action, Bot, CellType, ClientConfig, Direction, GameClient, GameState, Navigator, Position,
    SessionEnd,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    #[arg(long)]
    blast_radius: Option<u32>,
    #[arg(long)]
    log_level: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
}

// Flee when in danger, bomb boxes when it can get away, otherwise head for the
// nearest box or wander safely.
struct BoxHunter {
    rng: StdRng,
}

impl BoxHunter {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn next_to_box(state: &GameState, pos: Position) -> bool {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| pos.step(dir))
            .any(|next| state.cell_at(next) == Some(CellType::Box))
    }

    fn step_toward_box(nav: &Navigator<'_>, me: Position) -> Option<Action> {
        let target = nav.nearest_box(me)?;
        let beside = nav
            .adjacent_walkable(target)
            .into_iter()
            .filter_map(|tile| Some((nav.distance(me, tile)?, tile)))
            .min_by_key(|(steps, _)| *steps)
            .map(|(_, tile)| tile)?;
        let action = nav.route_first_step(me, beside);
        let next = me.step(action.direction()?)?;
        nav.is_safe(next).then_some(action)
    }
}

impl Bot for BoxHunter {
    fn name(&self) -> &str {
        "box-hunter"
    }

    fn decide(&mut self, state: &GameState) -> Option<Action> {
        let nav = Navigator::new(state);
        let me = state.me.position;

        if !nav.is_safe(me) {
            return Some(nav.escape_step(me));
        }
        if Self::next_to_box(state, me) && nav.can_escape_after_bomb(me) {
            return Some(Action::PlaceBomb);
        }
        if let Some(action) = Self::step_toward_box(&nav, me) {
            return Some(action);
        }
        let moves = nav.safe_moves(me);
        if moves.is_empty() {
            return None;
        }
        Some(moves[self.rng.random_range(0..moves.len())])
    }
}

fn resolve_config(cli: &Cli) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.url {
        config.server_url = url.clone();
    }
    if let Some(token) = &cli.token {
        config.token = Some(token.clone());
    }
    if let Some(name) = &cli.name {
        config.bot_name = bomber_bot_sdk::config::sanitize_bot_name(name);
    }
    if let Some(ms) = cli.timeout_ms {
        config.decision_timeout = normalize_decision_timeout(ms);
    }
    if let Some(radius) = cli.blast_radius {
        config.blast.radius = radius;
    }
    if let Some(level) = cli.log_level.as_deref().and_then(LogLevel::parse) {
        config.log_level = level;
    }
    config
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli);
    let sink = Arc::new(StderrJsonSink::new(config.log_level));
    let bot = BoxHunter::new(cli.seed.unwrap_or(0));
    let client = GameClient::new(config, sink.clone());

    match client.run(bot).await {
        Ok(SessionEnd::GameOver { winner_id }) => {
            sink.emit(LogEvent::new(
                LogLevel::Info,
                "bot.finished",
                json!({ "winnerId": winner_id }),
            ));
            ExitCode::SUCCESS
        }
        Ok(SessionEnd::Disconnected) => ExitCode::SUCCESS,
        Err(err) => {
            sink.emit(LogEvent::new(
                LogLevel::Error,
                "bot.failed",
                json!({ "error": err.to_string() }),
            ));
            ExitCode::FAILURE
        }
    }
}
