//! # Entity Store
//!
//! The central container for all entities and components.
//!
//! ```text
//!              RwLock<StoreInner>
//!   ┌──────────────────────────────────────────┐
//!   │ records   EntityId -> ComponentMask      │
//!   │ storages  [ComponentId] -> storage<C>    │
//!   │ index     [ComponentId] -> {EntityId}    │
//!   └──────────────────────────────────────────┘
//! ```
//!
//! Records, storages and the per-type index sit behind one lock, so every
//! add/remove path updates all three before any reader can observe them.
//! Writes are logically owned by the scheduler; the lock only makes reads
//! from transport threads safe while a tick is writing.

use super::component::Component;
use super::entity::{ComponentMask, EntityId};
use super::storage::{ComponentStorage, ErasedStorage};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of distinct component IDs a store can index.
pub const MAX_COMPONENT_TYPES: usize = 64;

struct StoreInner {
    records: HashMap<EntityId, ComponentMask>,
    storages: Vec<Option<Box<dyn ErasedStorage>>>,
    index: Vec<HashSet<EntityId>>,
}

impl StoreInner {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            storages: (0..MAX_COMPONENT_TYPES).map(|_| None).collect(),
            index: (0..MAX_COMPONENT_TYPES).map(|_| HashSet::new()).collect(),
        }
    }

    fn storage<C: Component>(&self) -> Option<&ComponentStorage<C>> {
        self.storages[usize::from(C::ID)]
            .as_ref()?
            .as_any()
            .downcast_ref::<ComponentStorage<C>>()
    }

    fn storage_mut<C: Component>(&mut self) -> Option<&mut ComponentStorage<C>> {
        let storage = self.storages[usize::from(C::ID)]
            .get_or_insert_with(|| Box::new(ComponentStorage::<C>::new()))
            .as_any_mut()
            .downcast_mut::<ComponentStorage<C>>();
        debug_assert!(storage.is_some(), "two component types share ID {}", C::ID);
        storage
    }

    fn insert<C: Component>(&mut self, id: EntityId, component: C) -> bool {
        if !self.records.contains_key(&id) {
            return false;
        }
        let Some(storage) = self.storage_mut::<C>() else {
            return false;
        };
        storage.insert(id, component);
        if let Some(mask) = self.records.get_mut(&id) {
            mask.insert(C::ID);
        }
        self.index[usize::from(C::ID)].insert(id);
        true
    }

    fn take<C: Component>(&mut self, id: EntityId) -> Option<C> {
        let mask = self.records.get_mut(&id)?;
        if !mask.has(C::ID) {
            return None;
        }
        mask.remove(C::ID);
        self.index[usize::from(C::ID)].remove(&id);
        self.storage_mut::<C>()?.take(id)
    }

    fn destroy(&mut self, id: EntityId) -> bool {
        let Some(mask) = self.records.remove(&id) else {
            return false;
        };
        for component_id in mask.ids() {
            let slot = usize::from(component_id);
            self.index[slot].remove(&id);
            if let Some(storage) = self.storages[slot].as_mut() {
                storage.remove(id);
            }
        }
        true
    }
}

/// The entity store - container for all simulation state.
///
/// Every method takes `&self`; the store is shared as `Arc<EntityStore>`
/// between the scheduler and read-only transport code.
///
/// Unknown entities are never an error: writes to them are silently dropped
/// and reads return `None`.
///
/// # Example
///
/// ```rust
/// use conquest_core::{EntityStore, Position};
///
/// let store = EntityStore::new();
/// let id = store.create();
/// assert!(store.set(id, Position::new(1.0, 2.0)));
///
/// store.destroy(id);
/// assert!(!store.set(id, Position::new(3.0, 4.0)));
/// assert!(store.get::<Position>(id).is_none());
/// ```
pub struct EntityStore {
    inner: RwLock<StoreInner>,
    next_id: AtomicU64,
}

impl EntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> EntityId {
        EntityId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates an entity with no components.
    pub fn create(&self) -> EntityId {
        let id = self.allocate_id();
        self.inner.write().records.insert(id, ComponentMask::EMPTY);
        id
    }

    /// Creates an entity and attaches every component of `builder` as one
    /// operation. Readers never observe the entity partially built.
    pub fn spawn(&self, builder: EntityBuilder) -> EntityId {
        let id = self.allocate_id();
        let mut inner = self.inner.write();
        inner.records.insert(id, ComponentMask::EMPTY);
        for pending in builder.components {
            pending.attach(&mut *inner, id);
        }
        id
    }

    /// Destroys an entity and all of its components.
    ///
    /// # Returns
    ///
    /// `true` if the entity existed. Destroying an unknown entity is a no-op.
    pub fn destroy(&self, id: EntityId) -> bool {
        self.inner.write().destroy(id)
    }

    /// Checks if an entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.inner.read().records.contains_key(&id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// True when no entity is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// Component mask of a live entity.
    #[must_use]
    pub fn mask(&self, id: EntityId) -> Option<ComponentMask> {
        self.inner.read().records.get(&id).copied()
    }

    /// Attaches a component, replacing any previous value of that type.
    ///
    /// # Returns
    ///
    /// `false` if the entity is unknown (the write is dropped).
    pub fn set<C: Component>(&self, id: EntityId, component: C) -> bool {
        self.inner.write().insert(id, component)
    }

    /// Returns a copy of a component.
    #[must_use]
    pub fn get<C: Component>(&self, id: EntityId) -> Option<C> {
        self.inner.read().storage::<C>()?.get(id).cloned()
    }

    /// Checks if an entity holds a component type.
    #[must_use]
    pub fn has<C: Component>(&self, id: EntityId) -> bool {
        self.inner
            .read()
            .records
            .get(&id)
            .is_some_and(|mask| mask.has(C::ID))
    }

    /// Detaches a component, returning it.
    pub fn remove<C: Component>(&self, id: EntityId) -> Option<C> {
        self.inner.write().take::<C>(id)
    }

    /// Mutates a component in place under the write lock.
    ///
    /// # Returns
    ///
    /// The closure's result, or `None` if the entity or component is absent.
    pub fn update<C: Component, R>(&self, id: EntityId, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        let mut inner = self.inner.write();
        if !inner.records.get(&id)?.has(C::ID) {
            return None;
        }
        inner.storage_mut::<C>()?.get_mut(id).map(f)
    }

    /// Returns every entity holding all types in `mask`, in ascending id order.
    ///
    /// Implemented as an intersection of the per-type index sets, starting
    /// from the smallest. An empty mask matches every live entity.
    #[must_use]
    pub fn query(&self, mask: ComponentMask) -> Vec<EntityId> {
        let inner = self.inner.read();
        let mut ids: Vec<EntityId> = match mask
            .ids()
            .map(|component_id| &inner.index[usize::from(component_id)])
            .min_by_key(|set| set.len())
        {
            None => inner.records.keys().copied().collect(),
            Some(smallest) => smallest
                .iter()
                .copied()
                .filter(|id| {
                    mask.ids()
                        .all(|component_id| inner.index[usize::from(component_id)].contains(id))
                })
                .collect(),
        };
        ids.sort_unstable();
        ids
    }

    /// Read-only view for code that must not write.
    #[must_use]
    pub const fn reader(&self) -> StoreReader<'_> {
        StoreReader::new(self)
    }

    /// Returns the index set of a single type, in ascending id order.
    #[must_use]
    pub fn indexed<C: Component>(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.inner.read().index[usize::from(C::ID)]
            .iter()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Read-only view of an [`EntityStore`].
///
/// Handed to code outside the tick thread. It has no mutating methods, so
/// every write still has to go through the scheduler.
///
/// ```compile_fail
/// use conquest_core::EntityStore;
///
/// let store = EntityStore::new();
/// let id = store.create();
/// store.reader().destroy(id);
/// ```
#[derive(Clone, Copy)]
pub struct StoreReader<'a> {
    store: &'a EntityStore,
}

impl<'a> StoreReader<'a> {
    /// Wraps a store.
    #[must_use]
    pub const fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// See [`EntityStore::contains`].
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.store.contains(id)
    }

    /// See [`EntityStore::len`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// See [`EntityStore::is_empty`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// See [`EntityStore::get`].
    #[must_use]
    pub fn get<C: Component>(&self, id: EntityId) -> Option<C> {
        self.store.get(id)
    }

    /// See [`EntityStore::has`].
    #[must_use]
    pub fn has<C: Component>(&self, id: EntityId) -> bool {
        self.store.has::<C>(id)
    }

    /// See [`EntityStore::query`].
    #[must_use]
    pub fn query(&self, mask: ComponentMask) -> Vec<EntityId> {
        self.store.query(mask)
    }

    /// See [`EntityStore::indexed`].
    #[must_use]
    pub fn indexed<C: Component>(&self) -> Vec<EntityId> {
        self.store.indexed::<C>()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

trait PendingComponent: Send {
    fn attach(self: Box<Self>, inner: &mut StoreInner, id: EntityId);
}

struct Pending<C>(C);

impl<C: Component> PendingComponent for Pending<C> {
    fn attach(self: Box<Self>, inner: &mut StoreInner, id: EntityId) {
        inner.insert(id, self.0);
    }
}

/// A set of components to attach atomically with [`EntityStore::spawn`].
#[derive(Default)]
pub struct EntityBuilder {
    components: Vec<Box<dyn PendingComponent>>,
}

impl EntityBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a component. A later value of the same type wins.
    #[must_use]
    pub fn with<C: Component>(mut self, component: C) -> Self {
        self.components.push(Box::new(Pending(component)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{Position, Velocity};

    #[test]
    fn test_create_destroy() {
        let store = EntityStore::new();
        let a = store.create();
        let b = store.create();

        assert_ne!(a, b);
        assert!(!a.is_null());
        assert_eq!(store.len(), 2);

        assert!(store.destroy(a));
        assert!(!store.destroy(a));
        assert!(!store.contains(a));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ids_never_reused() {
        let store = EntityStore::new();
        let a = store.create();
        store.destroy(a);
        let b = store.create();
        assert!(b > a);
    }

    #[test]
    fn test_set_unknown_is_noop() {
        let store = EntityStore::new();
        assert!(!store.set(EntityId::from_raw(99), Position::new(1.0, 1.0)));
        assert!(store.indexed::<Position>().is_empty());
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let store = EntityStore::new();
        let id = store.create();
        store.set(id, Velocity::new(1.0, 2.0));
        store.set(id, Velocity::new(3.0, 4.0));
        assert_eq!(store.get::<Velocity>(id), Some(Velocity::new(3.0, 4.0)));
        assert_eq!(store.indexed::<Velocity>(), vec![id]);
    }

    #[test]
    fn test_query_and_semantics() {
        let store = EntityStore::new();
        let both = store.create();
        let only_pos = store.create();
        store.set(both, Position::new(0.0, 0.0));
        store.set(both, Velocity::ZERO);
        store.set(only_pos, Position::new(0.0, 0.0));

        let mask = ComponentMask::of::<Position>().with::<Velocity>();
        assert_eq!(store.query(mask), vec![both]);
        assert_eq!(store.query(ComponentMask::of::<Position>()), vec![both, only_pos]);

        store.remove::<Velocity>(both);
        assert!(store.query(mask).is_empty());
    }

    #[test]
    fn test_destroy_purges_index() {
        let store = EntityStore::new();
        let id = store.spawn(
            EntityBuilder::new()
                .with(Position::new(1.0, 2.0))
                .with(Velocity::ZERO),
        );
        assert!(store.has::<Velocity>(id));

        store.destroy(id);
        assert!(store.indexed::<Position>().is_empty());
        assert!(store.indexed::<Velocity>().is_empty());
        assert!(store.get::<Position>(id).is_none());
    }

    #[test]
    fn test_update_in_place() {
        let store = EntityStore::new();
        let id = store.create();
        store.set(id, Position::new(1.0, 1.0));

        let x = store.update::<Position, _>(id, |p| {
            p.x += 10.0;
            p.x
        });
        assert_eq!(x, Some(11.0));
        assert!(store.update::<Velocity, _>(id, |_| ()).is_none());
    }

    #[test]
    fn test_reader_sees_writes() {
        let store = EntityStore::new();
        let reader = store.reader();
        assert!(reader.is_empty());

        let id = store.spawn(EntityBuilder::new().with(Position::new(3.0, 4.0)));
        assert!(reader.contains(id));
        assert_eq!(reader.len(), 1);
        assert!(reader.has::<Position>(id));
        assert!(!reader.has::<Velocity>(id));
        assert_eq!(reader.get::<Position>(id).map(|p| p.x), Some(3.0));
        assert_eq!(reader.query(ComponentMask::of::<Position>()), vec![id]);
        assert_eq!(reader.indexed::<Position>(), vec![id]);

        store.destroy(id);
        assert!(!reader.contains(id));
    }
}
