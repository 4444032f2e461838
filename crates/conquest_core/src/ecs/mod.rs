//! # Entity Component Store
//!
//! ## Design Philosophy
//!
//! - Entities are ids; all data lives in components
//! - Each component type has its own storage and secondary index
//! - Typed getters only, callers never see an untyped value

mod component;
mod entity;
mod storage;
mod world;

pub use component::{
    ActionSet, CollisionBox, Component, ComponentId, DashPhase, DashState, ExternalId, Identity,
    Input, InputAction, MovementStats, Position, Survival, Velocity, Vitality,
};
pub use entity::{ComponentMask, EntityId};
pub use storage::{ComponentStorage, ErasedStorage};
pub use world::{EntityBuilder, EntityStore, StoreReader, MAX_COMPONENT_TYPES};
