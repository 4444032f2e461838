//! # Conquest Shared
//!
//! Message shapes exchanged between the simulation core and the transport.
//!
//! ## RULE
//!
//! This crate must NEVER depend on the simulation crates. Ids are raw `u64`
//! values and positions are plain floats, so a transport can be written
//! against this crate alone.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod protocol;

pub use constants::{FIXED_DELTA, JOIN_TIMEOUT_MS, TICK_RATE};
pub use protocol::{
    EntityPosition, InventorySlot, InventoryState, JoinOutcome, PositionBroadcast, RawInput,
    StatsSnapshot, TerrainExport,
};
