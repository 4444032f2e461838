//! # Snapshot Emission
//!
//! Reads the store after every tick and publishes two channels:
//!
//! ```text
//!                 every tick                  on change only
//!   Position ─────────────────► broadcast     Survival+Vitality ──► stats
//!   (all entities)              (everyone)    (per identity)        (owner)
//!                                                   │
//!                                     last_sent[identity] == new? skip
//! ```
//!
//! The stats cache entry of an identity is purged on disconnect, so a rejoin
//! always gets a fresh send.

use conquest_core::{
    ComponentMask, EntityId, EntityStore, ExternalId, Identity, Inventory, Position, Survival,
    Vitality,
};
use conquest_shared::{EntityPosition, InventorySlot, InventoryState, PositionBroadcast, StatsSnapshot};
use crossbeam_channel::Sender;
use std::collections::HashMap;

/// A message for the transport layer.
#[derive(Clone, Debug, PartialEq)]
pub enum OutboundMessage {
    /// Send to every observer.
    Positions(PositionBroadcast),
    /// Send to one identity.
    Stats {
        /// Recipient.
        identity: ExternalId,
        /// New stats.
        stats: StatsSnapshot,
    },
    /// Send to one identity.
    Inventory {
        /// Recipient.
        identity: ExternalId,
        /// Inventory contents.
        state: InventoryState,
    },
}

/// Where emitted messages go.
///
/// Implementations must not block: the tick thread calls them.
pub trait SnapshotSink {
    /// Delivers a message. Returns `false` if it was dropped.
    fn deliver(&self, message: OutboundMessage) -> bool;
}

/// Sink backed by a bounded crossbeam channel read by the transport.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: Sender<OutboundMessage>,
}

impl ChannelSink {
    /// Wraps a sender.
    #[must_use]
    pub const fn new(tx: Sender<OutboundMessage>) -> Self {
        Self { tx }
    }
}

impl SnapshotSink for ChannelSink {
    fn deliver(&self, message: OutboundMessage) -> bool {
        self.tx.try_send(message).is_ok()
    }
}

/// Truncates float stats to whole units.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn stats_snapshot(survival: &Survival, vitality: &Vitality) -> StatsSnapshot {
    StatsSnapshot {
        health: vitality.health as i32,
        stamina: vitality.stamina as i32,
        hunger: survival.hunger as i32,
        thirst: survival.thirst as i32,
        temperature: survival.temperature as i32,
    }
}

/// Wire form of an inventory.
#[must_use]
pub fn inventory_state(inventory: &Inventory) -> InventoryState {
    InventoryState {
        capacity: inventory.capacity(),
        slots: inventory
            .occupied()
            .map(|(slot, stack)| InventorySlot {
                slot,
                item: stack.item.as_str().to_owned(),
                quantity: stack.quantity,
            })
            .collect(),
    }
}

/// Emission counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitStats {
    /// Position broadcasts delivered.
    pub broadcasts: u64,
    /// Stats messages delivered.
    pub stats_sent: u64,
    /// Stats checks that matched the cache.
    pub stats_suppressed: u64,
    /// Messages the sink refused.
    pub dropped: u64,
}

/// Builds outbound messages from the store and dedups per-identity stats.
#[derive(Debug, Default)]
pub struct SnapshotEmitter {
    last_sent: HashMap<ExternalId, StatsSnapshot>,
    stats: EmitStats,
}

impl SnapshotEmitter {
    /// Creates an emitter with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs both channels for the current store state.
    pub fn emit(&mut self, store: &EntityStore, sink: &impl SnapshotSink, server_time_ms: u64) {
        self.broadcast_positions(store, sink, server_time_ms);
        self.send_changed_stats(store, sink);
    }

    /// Broadcasts `(id, x, y)` of every positioned entity.
    pub fn broadcast_positions(&mut self, store: &EntityStore, sink: &impl SnapshotSink, server_time_ms: u64) {
        let entities = store
            .indexed::<Position>()
            .into_iter()
            .filter_map(|id| {
                store.get::<Position>(id).map(|pos| EntityPosition {
                    id: id.raw(),
                    x: pos.x,
                    y: pos.y,
                })
            })
            .collect();

        let message = OutboundMessage::Positions(PositionBroadcast {
            server_time_ms,
            entities,
        });
        if sink.deliver(message) {
            self.stats.broadcasts += 1;
        } else {
            self.stats.dropped += 1;
        }
    }

    /// Sends stats to every identity whose snapshot changed since the last
    /// delivered one. The cache only advances on successful delivery.
    pub fn send_changed_stats(&mut self, store: &EntityStore, sink: &impl SnapshotSink) {
        let mask = ComponentMask::of::<Identity>()
            .with::<Survival>()
            .with::<Vitality>();

        for id in store.query(mask) {
            let (Some(identity), Some(survival), Some(vitality)) = (
                store.get::<Identity>(id),
                store.get::<Survival>(id),
                store.get::<Vitality>(id),
            ) else {
                continue;
            };
            let snapshot = stats_snapshot(&survival, &vitality);
            if self.last_sent.get(&identity.external_id) == Some(&snapshot) {
                self.stats.stats_suppressed += 1;
                continue;
            }

            let message = OutboundMessage::Stats {
                identity: identity.external_id.clone(),
                stats: snapshot,
            };
            if sink.deliver(message) {
                self.last_sent.insert(identity.external_id, snapshot);
                self.stats.stats_sent += 1;
            } else {
                self.stats.dropped += 1;
            }
        }
    }

    /// Sends an entity's inventory to its owner.
    pub fn send_inventory(&mut self, store: &EntityStore, sink: &impl SnapshotSink, entity: EntityId) {
        let (Some(identity), Some(inventory)) = (store.get::<Identity>(entity), store.get::<Inventory>(entity))
        else {
            return;
        };
        let message = OutboundMessage::Inventory {
            identity: identity.external_id,
            state: inventory_state(&inventory),
        };
        if !sink.deliver(message) {
            self.stats.dropped += 1;
        }
    }

    /// Drops the cached stats of an identity.
    pub fn forget(&mut self, identity: &ExternalId) {
        self.last_sent.remove(identity);
    }

    /// Number of identities with cached stats.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.last_sent.len()
    }

    /// Emission counters.
    #[must_use]
    pub const fn stats(&self) -> &EmitStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conquest_core::{EntityBuilder, ItemType};
    use crossbeam_channel::bounded;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        messages: RefCell<Vec<OutboundMessage>>,
        refuse: bool,
    }

    impl SnapshotSink for Recorder {
        fn deliver(&self, message: OutboundMessage) -> bool {
            if self.refuse {
                return false;
            }
            self.messages.borrow_mut().push(message);
            true
        }
    }

    impl Recorder {
        fn stats_count(&self) -> usize {
            self.messages
                .borrow()
                .iter()
                .filter(|m| matches!(m, OutboundMessage::Stats { .. }))
                .count()
        }
    }

    fn player(store: &EntityStore, name: &str) -> EntityId {
        store.spawn(
            EntityBuilder::new()
                .with(Identity {
                    external_id: ExternalId::new(name),
                    display_name: name.to_owned(),
                    guest: false,
                })
                .with(Position::new(10.0, 20.0))
                .with(Survival::full(100.0, 100.0, 100.0, 4.5))
                .with(Vitality::full(100.0, 100.0)),
        )
    }

    #[test]
    fn test_identical_stats_sent_once() {
        let store = EntityStore::new();
        player(&store, "alice");
        let sink = Recorder::default();
        let mut emitter = SnapshotEmitter::new();

        emitter.emit(&store, &sink, 1);
        emitter.emit(&store, &sink, 2);

        assert_eq!(sink.stats_count(), 1);
        assert_eq!(emitter.stats().stats_suppressed, 1);
        assert_eq!(emitter.stats().broadcasts, 2);
    }

    #[test]
    fn test_change_triggers_send() {
        let store = EntityStore::new();
        let id = player(&store, "bob");
        let sink = Recorder::default();
        let mut emitter = SnapshotEmitter::new();

        emitter.emit(&store, &sink, 1);
        store.update::<Vitality, _>(id, |v| v.health = 42.0);
        emitter.emit(&store, &sink, 2);
        // Sub-unit drift is not a change.
        store.update::<Vitality, _>(id, |v| v.health = 42.7);
        emitter.emit(&store, &sink, 3);

        assert_eq!(sink.stats_count(), 2);
    }

    #[test]
    fn test_forget_forces_resend() {
        let store = EntityStore::new();
        player(&store, "carol");
        let sink = Recorder::default();
        let mut emitter = SnapshotEmitter::new();

        emitter.emit(&store, &sink, 1);
        emitter.forget(&ExternalId::new("carol"));
        assert_eq!(emitter.cached(), 0);
        emitter.emit(&store, &sink, 2);

        assert_eq!(sink.stats_count(), 2);
    }

    #[test]
    fn test_refused_delivery_does_not_cache() {
        let store = EntityStore::new();
        player(&store, "dave");
        let refusing = Recorder {
            refuse: true,
            ..Recorder::default()
        };
        let mut emitter = SnapshotEmitter::new();

        emitter.emit(&store, &refusing, 1);
        assert_eq!(emitter.cached(), 0);
        assert_eq!(emitter.stats().dropped, 2);

        let sink = Recorder::default();
        emitter.emit(&store, &sink, 2);
        assert_eq!(sink.stats_count(), 1);
    }

    #[test]
    fn test_broadcast_lists_every_position() {
        let store = EntityStore::new();
        let a = player(&store, "a");
        let b = store.create();
        store.set(b, Position::new(1.0, 2.0));
        store.create();

        let (tx, rx) = bounded(4);
        let mut emitter = SnapshotEmitter::new();
        emitter.broadcast_positions(&store, &ChannelSink::new(tx), 99);

        let Ok(OutboundMessage::Positions(broadcast)) = rx.try_recv() else {
            panic!("expected a position broadcast");
        };
        assert_eq!(broadcast.server_time_ms, 99);
        let ids: Vec<u64> = broadcast.entities.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a.raw(), b.raw()]);
    }

    #[test]
    fn test_full_channel_drops() {
        let store = EntityStore::new();
        player(&store, "erin");
        let (tx, _rx) = bounded(1);
        let sink = ChannelSink::new(tx);
        let mut emitter = SnapshotEmitter::new();

        emitter.emit(&store, &sink, 1);
        assert_eq!(emitter.stats().broadcasts, 1);
        assert_eq!(emitter.stats().dropped, 1);
        assert_eq!(emitter.cached(), 0);
    }

    #[test]
    fn test_inventory_state_lists_occupied_slots() {
        let mut inventory = Inventory::new(5);
        inventory.add_item(ItemType::Wood, 3);
        inventory.add_item(ItemType::Stone, 1);
        inventory.swap(1, 4);

        let state = inventory_state(&inventory);
        assert_eq!(state.capacity, 5);
        assert_eq!(
            state.slots,
            vec![
                InventorySlot { slot: 0, item: "WOOD".to_owned(), quantity: 3 },
                InventorySlot { slot: 4, item: "STONE".to_owned(), quantity: 1 },
            ]
        );
    }
}
