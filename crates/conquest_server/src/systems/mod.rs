//! # Simulation Systems
//!
//! Stateless per-tick transformations, run by the scheduler in this order:
//!
//! ```text
//! PlayerControl ──► Physics ──► Survival
//!  input → velocity   velocity → position   decay, damage
//! ```
//!
//! A system only visits entities holding every component it needs; any
//! entity missing one is simply not part of that pass.

mod physics;
mod player_control;
mod survival;

pub use physics::{resolve_movement, PhysicsSystem};
pub use player_control::{step_player, PlayerControlSystem};
pub use survival::{step_survival, SurvivalSystem};

use crate::error::TickError;
use conquest_core::EntityStore;
use conquest_procedural::WorldMap;

/// Everything a system may read during a tick.
pub struct TickContext<'a> {
    /// Entity store, written only from the tick thread.
    pub store: &'a EntityStore,
    /// Static terrain.
    pub map: &'a WorldMap,
    /// Fixed simulation delta in seconds.
    pub delta: f32,
    /// Tick number.
    pub tick: u64,
}

/// A per-tick transformation over the store.
pub trait System: Send {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Runs one pass.
    ///
    /// # Errors
    ///
    /// Reported after the pass; entities that failed were skipped and the
    /// rest were updated.
    fn run(&mut self, ctx: &TickContext<'_>) -> Result<(), TickError>;
}
