//! # Component Storage
//!
//! Sparse storage for a single component type, keyed by entity id.
//!
//! The store keeps one storage per component type behind the
//! [`ErasedStorage`] trait so heterogeneous storages can live in one table
//! while callers only ever see typed values.

use super::component::Component;
use super::entity::EntityId;
use std::any::Any;
use std::collections::HashMap;

/// Storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust
/// use conquest_core::{ComponentStorage, EntityId, Position};
///
/// let mut storage: ComponentStorage<Position> = ComponentStorage::new();
/// let id = EntityId::from_raw(1);
/// storage.insert(id, Position::new(1.0, 2.0));
/// assert_eq!(storage.get(id).map(|p| p.x), Some(1.0));
/// ```
pub struct ComponentStorage<C: Component> {
    data: HashMap<EntityId, C>,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if nothing is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets a component by entity id.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&C> {
        self.data.get(&id)
    }

    /// Gets a mutable component by entity id.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut C> {
        self.data.get_mut(&id)
    }

    /// Stores a component, returning the value it replaced.
    #[inline]
    pub fn insert(&mut self, id: EntityId, component: C) -> Option<C> {
        self.data.insert(id, component)
    }

    /// Removes and returns a component.
    #[inline]
    pub fn take(&mut self, id: EntityId) -> Option<C> {
        self.data.remove(&id)
    }
}

impl<C: Component> Default for ComponentStorage<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a [`ComponentStorage`].
pub trait ErasedStorage: Send + Sync {
    /// Drops the component of `id`, returning whether one was stored.
    fn remove(&mut self, id: EntityId) -> bool;

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedStorage for ComponentStorage<C> {
    fn remove(&mut self, id: EntityId) -> bool {
        self.data.remove(&id).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
