//! # Player Lifecycle
//!
//! Creates and destroys player entities with their full component set and
//! tracks which entity each external identity owns.
//!
//! At most one live entity per identity: spawning an identity that already
//! has one despawns the old entity first. Guests always get a fresh
//! synthetic identity.

use crate::config::PlayerConfig;
use conquest_core::{
    CollisionBox, DashState, EntityBuilder, EntityId, EntityStore, ExternalId, Identity, Input,
    Inventory, Position, Survival, Velocity, Vitality,
};
use conquest_procedural::WorldMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// Attempts at finding an unblocked spawn tile before falling back to the
/// map centre.
const SPAWN_ATTEMPTS: u32 = 256;

/// A freshly spawned player.
#[derive(Clone, Debug, PartialEq)]
pub struct Spawned {
    /// New entity.
    pub entity: EntityId,
    /// Identity that owns it.
    pub identity: ExternalId,
    /// Spawn position.
    pub position: Position,
    /// Entity that was despawned to make room, if any.
    pub replaced: Option<EntityId>,
}

/// Spawns and despawns players.
pub struct LifecycleManager {
    template: PlayerConfig,
    sessions: HashMap<ExternalId, EntityId>,
    rng: ChaCha8Rng,
}

impl LifecycleManager {
    /// Creates a manager.
    ///
    /// # Arguments
    ///
    /// * `template` - Stats of a new player
    /// * `seed` - Spawn-point RNG seed
    #[must_use]
    pub fn new(template: PlayerConfig, seed: u64) -> Self {
        Self {
            template,
            sessions: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Entity currently owned by an identity.
    #[must_use]
    pub fn session(&self, identity: &ExternalId) -> Option<EntityId> {
        self.sessions.get(identity).copied()
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Spawns for an authenticated identity, despawning any entity it
    /// already owns.
    pub fn spawn_authenticated(
        &mut self,
        store: &EntityStore,
        map: &WorldMap,
        external_id: ExternalId,
        display_name: &str,
    ) -> Spawned {
        let replaced = match self.sessions.get(&external_id).copied() {
            Some(old) => self.despawn(store, old).map(|_| old),
            None => None,
        };

        let name = if display_name.trim().is_empty() {
            external_id.to_string()
        } else {
            display_name.trim().to_owned()
        };
        let mut spawned = self.spawn(store, map, external_id, name, false);
        spawned.replaced = replaced;
        spawned
    }

    /// Spawns a guest under a new synthetic identity.
    ///
    /// A blank name becomes `"Guest"`, anything else `"<name> (Guest)"`.
    pub fn spawn_guest(&mut self, store: &EntityStore, map: &WorldMap, display_name: &str) -> Spawned {
        let trimmed = display_name.trim();
        let name = if trimmed.is_empty() {
            "Guest".to_owned()
        } else {
            format!("{trimmed} (Guest)")
        };
        self.spawn(store, map, ExternalId::guest(), name, true)
    }

    fn spawn(
        &mut self,
        store: &EntityStore,
        map: &WorldMap,
        external_id: ExternalId,
        display_name: String,
        guest: bool,
    ) -> Spawned {
        let t = &self.template;
        let (x, y) = map.find_spawn_point(&mut self.rng, t.hitbox_size, t.hitbox_size, SPAWN_ATTEMPTS);
        let position = Position::new(x, y);

        let entity = store.spawn(
            EntityBuilder::new()
                .with(Identity {
                    external_id: external_id.clone(),
                    display_name: display_name.clone(),
                    guest,
                })
                .with(position)
                .with(Velocity::ZERO)
                .with(CollisionBox::square(t.hitbox_size))
                .with(t.movement())
                .with(DashState::default())
                .with(Input::default())
                .with(Inventory::new(t.inventory_capacity))
                .with(Survival::full(t.max_hunger, t.max_thirst, t.max_temperature, t.cold_resistance))
                .with(Vitality::full(t.max_health, t.max_stamina)),
        );
        self.sessions.insert(external_id.clone(), entity);

        tracing::info!(
            entity = %entity,
            identity = %external_id,
            name = %display_name,
            guest,
            x,
            y,
            "Player spawned"
        );

        Spawned {
            entity,
            identity: external_id,
            position,
            replaced: None,
        }
    }

    /// Removes an entity and its session mapping.
    ///
    /// # Returns
    ///
    /// The identity of the removed entity, or `None` if it was already gone
    /// or carried no identity.
    pub fn despawn(&mut self, store: &EntityStore, entity: EntityId) -> Option<Identity> {
        let identity = store.get::<Identity>(entity);
        if !store.destroy(entity) {
            return None;
        }
        let identity = identity?;

        if self.sessions.get(&identity.external_id) == Some(&entity) {
            self.sessions.remove(&identity.external_id);
        }
        if !identity.guest {
            // Persistence is owned by the account service.
            tracing::debug!(identity = %identity.external_id, "Player state ready to persist");
        }
        tracing::info!(entity = %entity, identity = %identity.external_id, "Player despawned");
        Some(identity)
    }

    /// Despawns whatever entity an identity owns.
    pub fn disconnect(&mut self, store: &EntityStore, identity: &ExternalId) -> Option<Identity> {
        let entity = self.sessions.remove(identity)?;
        self.despawn(store, entity)
    }
}
