pub const DEFAULT_BLAST_RADIUS: u32 = 3;
pub const DEFAULT_BOX_ABSORBS_BLAST: bool = true;

pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:3000/ws";
pub const DEFAULT_BOT_NAME: &str = "bomber-bot";
pub const MAX_BOT_NAME_LEN: usize = 32;

pub const DEFAULT_DECISION_TIMEOUT_MS: u64 = 250;
pub const MIN_DECISION_TIMEOUT_MS: u64 = 10;
pub const MAX_DECISION_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 2_000;
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

pub const OUTBOUND_QUEUE_SIZE: usize = 64;
pub const INBOUND_QUEUE_SIZE: usize = 256;

pub const DETACHED_POSITION: (i32, i32) = (-1, -1);

pub const MAX_FIELD_SIDE: i32 = 1_024;
