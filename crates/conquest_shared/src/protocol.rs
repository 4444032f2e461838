//! Message types exchanged with the transport.
//!
//! Inbound: [`RawInput`]. Outbound: [`PositionBroadcast`], [`StatsSnapshot`],
//! [`InventoryState`], [`JoinOutcome`], [`TerrainExport`].

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Player input exactly as the transport received it.
///
/// Nothing here is trusted: the server parses and validates it before it
/// becomes a command.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInput {
    /// Target entity id as sent by the client.
    pub entity: String,
    /// Horizontal intent.
    pub x: f32,
    /// Vertical intent.
    pub y: f32,
    /// Sprint held.
    pub sprint: bool,
    /// Discrete action names.
    pub actions: Vec<String>,
    /// Facing direction.
    pub facing: [f32; 2],
    /// Aim direction.
    pub aim: [f32; 2],
}

/// Minimal per-entity position record of the broadcast.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct EntityPosition {
    /// Entity ID
    pub id: u64,
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

/// Per-tick position broadcast sent to every observer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionBroadcast {
    /// Server wall-clock time in milliseconds since the Unix epoch.
    pub server_time_ms: u64,
    /// Every positioned entity.
    pub entities: Vec<EntityPosition>,
}

impl PositionBroadcast {
    /// Packed binary view of the entity records (16 bytes each).
    #[must_use]
    pub fn entity_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.entities)
    }
}

/// Compact stats sent to a single player when they change.
///
/// Values are truncated to whole units so sub-unit drift does not trigger a
/// send every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Current health.
    pub health: i32,
    /// Current stamina.
    pub stamina: i32,
    /// Current hunger.
    pub hunger: i32,
    /// Current thirst.
    pub thirst: i32,
    /// Current body temperature.
    pub temperature: i32,
}

/// One occupied inventory slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySlot {
    /// Slot index.
    pub slot: usize,
    /// Item wire name.
    pub item: String,
    /// Stack size.
    pub quantity: u32,
}

/// Inventory contents sent to its owner after a change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryState {
    /// Total slot count.
    pub capacity: usize,
    /// Occupied slots only.
    pub slots: Vec<InventorySlot>,
}

/// Reply to a join request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JoinOutcome {
    /// Spawned entity id.
    pub entity_id: u64,
    /// Spawn X.
    pub spawn_x: f32,
    /// Spawn Y.
    pub spawn_y: f32,
    /// Whether the join succeeded.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

impl JoinOutcome {
}

/// Static terrain grid for initial client rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainExport {
    /// Width in tiles.
    pub width: usize,
    /// Height in tiles.
    pub height: usize,
    /// Tile side in world units.
    pub tile_size: f32,
    /// Tile codes indexed `tiles[x][y]`.
    pub tiles: Vec<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_input_partial_json() {
        let input: RawInput =
            serde_json::from_str(r#"{"entity":"12","x":1.0,"actions":["DASH","bogus"]}"#).unwrap();
        assert_eq!(input.entity, "12");
        assert_eq!(input.y, 0.0);
        assert!(!input.sprint);
        assert_eq!(input.actions.len(), 2);
    }

    #[test]
    fn test_entity_bytes_layout() {
        let broadcast = PositionBroadcast {
            server_time_ms: 1,
            entities: vec![EntityPosition { id: 1, x: 2.0, y: 3.0 }; 3],
        };
        assert_eq!(std::mem::size_of::<EntityPosition>(), 16);
        assert_eq!(broadcast.entity_bytes().len(), 48);
    }

    #[test]
    fn test_stats_equality_drives_dedup() {
        let a = StatsSnapshot { health: 100, stamina: 100, hunger: 99, thirst: 98, temperature: 97 };
        let b = a;
        assert_eq!(a, b);
        assert_ne!(a, StatsSnapshot { hunger: 98, ..a });
    }
}
