//! Game-level configuration constants.

// Board
pub const BOARD_SIZE: usize = 100;
pub const BOARD_COLUMNS: usize = 10;

// Round
pub const SCORE_THRESHOLD: usize = 10;

// Tick interval (milliseconds)
pub const DEFAULT_TICK_INTERVAL_MS: u32 = 1000;
pub const MIN_TICK_INTERVAL_MS: u32 = 100;
pub const MAX_TICK_INTERVAL_MS: u32 = 10_000;
