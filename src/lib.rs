pub mod client;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod harness;
pub mod protocol;
pub mod sanitize;
pub mod state;
pub mod transport;
pub mod types;

pub use client::{GameClient, SessionEnd};
pub use config::{BlastRules, ClientConfig};
pub use engine::Navigator;
pub use error::{Result, SdkError};
pub use harness::Bot;
pub use state::GameState;
pub use types::{Action, Bomb, CellType, Direction, PlayerSnapshot, Position};
