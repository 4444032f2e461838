//! # Simulation Constants
//!
//! Defaults shared by both sides of the transport. The server may override
//! them from its config file; clients use them for interpolation.

/// Tick rate (updates per second)
pub const TICK_RATE: u32 = 60;

/// Fixed simulation delta fed to every system, in seconds.
///
/// Deliberately not `1 / TICK_RATE`: the simulation advances by this exact
/// amount per tick regardless of measured time.
pub const FIXED_DELTA: f32 = 0.016;

/// Bounded wait for a synchronous join reply, in milliseconds.
pub const JOIN_TIMEOUT_MS: u64 = 500;

/// Side length of a terrain tile in world units.
pub const TILE_SIZE: f32 = 64.0;

/// Greeting returned with a successful join.
pub const WELCOME_MESSAGE: &str = "Welcome to ConquerQuest!";
