pub const TICK_MS: u64 = 50;

pub const GHOST_MOVE_INTERVAL_MS: u64 = 250;
pub const PINKY_MOVE_INTERVAL_MS: u64 = 200;
pub const GHOST_INTERVAL_VARIATION_MS: u64 = 50;

/// Clyde flees once the player is this many hops away or closer.
pub const CLYDE_SHYNESS: usize = 8;
pub const INKY_SQUARES_AHEAD: usize = 2;
pub const PINKY_SQUARES_AHEAD: usize = 4;

pub const PELLET_VALUE: u32 = 10;

pub const DEFAULT_MAX_TICKS: u64 = 20 * 60 * 5;
