//! # Entity Identifiers
//!
//! Entities are opaque identifiers with no fields of their own. They exist
//! only through the components attached to them.
//!
//! Ids come from a monotonically increasing counter and are never reused, so
//! a stale id held by transport code can never alias a newer entity.

use super::component::{Component, ComponentId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Wraps a raw id value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Null/invalid entity ID. Never issued by a store.
    pub const NULL: Self = Self(0);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bitmask of component types (up to 64 component types).
///
/// Used both as an entity's record of attached components and as the
/// argument of an AND query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ComponentMask(u64);

impl ComponentMask {
    /// The empty mask.
    pub const EMPTY: Self = Self(0);

    /// Mask containing a single component type.
    #[inline]
    #[must_use]
    pub const fn of<C: Component>() -> Self {
        Self(1 << C::ID)
    }

    /// Returns this mask with `C` added.
    #[inline]
    #[must_use]
    pub const fn with<C: Component>(self) -> Self {
        Self(self.0 | (1 << C::ID))
    }

    /// Checks if a specific component type is set.
    ///
    /// # Arguments
    ///
    /// * `component_id` - The component type ID (0-63)
    #[inline]
    #[must_use]
    pub const fn has(self, component_id: ComponentId) -> bool {
        (self.0 & (1 << component_id)) != 0
    }

    /// True when every type in `other` is also in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Adds a component flag.
    #[inline]
    pub fn insert(&mut self, component_id: ComponentId) {
        self.0 |= 1 << component_id;
    }

    /// Removes a component flag.
    #[inline]
    pub fn remove(&mut self, component_id: ComponentId) {
        self.0 &= !(1 << component_id);
    }

    /// True when no component type is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the component IDs set in this mask, lowest first.
    pub fn ids(self) -> impl Iterator<Item = ComponentId> {
        (0..64u8).filter(move |&id| self.has(id))
    }
}
