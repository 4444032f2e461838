//! # Conquest Core
//!
//! The entity/component store at the heart of the authoritative simulation.
//!
//! ## Architecture Rules
//!
//! 1. **One writer** - only the scheduler tick mutates the store
//! 2. **Concurrent readers** - transport code may read at any time
//! 3. **Index consistency** - the per-type index always matches the records
//!
//! ## Example
//!
//! ```rust
//! use conquest_core::{EntityStore, Position, Velocity, ComponentMask};
//!
//! let store = EntityStore::new();
//! let id = store.create();
//! store.set(id, Position::new(10.0, 20.0));
//! store.set(id, Velocity::ZERO);
//!
//! let moving = store.query(ComponentMask::of::<Position>().with::<Velocity>());
//! assert_eq!(moving, vec![id]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod error;
pub mod inventory;
pub mod math;

pub use ecs::{
    ActionSet, CollisionBox, Component, ComponentId, ComponentMask, ComponentStorage, DashPhase,
    DashState, EntityBuilder, EntityId, EntityStore, ExternalId, Identity, Input, InputAction,
    MovementStats, Position, StoreReader, Survival, Velocity, Vitality,
};
pub use error::ParseError;
pub use inventory::{Inventory, ItemStack, ItemType};
pub use math::Vec2;
