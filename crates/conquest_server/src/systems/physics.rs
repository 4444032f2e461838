//! # Physics
//!
//! Integrates velocity into position against the world map.
//!
//! Collision is resolved per axis, X first, then Y from the already-resolved
//! X. A blocked axis contributes no displacement while the other still
//! moves, so diagonal movement into a wall slides along it.

use super::{System, TickContext};
use crate::error::TickError;
use conquest_core::{CollisionBox, ComponentMask, Position, Velocity};
use conquest_procedural::WorldMap;

/// Resolves one entity's movement for a tick.
///
/// # Arguments
///
/// * `map` - Terrain for the speed and collision queries
/// * `pos` - Current position (centre of the hitbox)
/// * `velocity` - Units per second
/// * `hitbox` - Collision box centred on `pos`
/// * `delta` - Fixed tick delta
#[must_use]
pub fn resolve_movement(
    map: &WorldMap,
    pos: Position,
    velocity: Velocity,
    hitbox: CollisionBox,
    delta: f32,
) -> Position {
    let multiplier = map.terrain_speed_multiplier(pos.x, pos.y);
    let move_x = velocity.dx * multiplier * delta;
    let move_y = velocity.dy * multiplier * delta;

    let next_x = if map.is_blocked(pos.x + move_x, pos.y, hitbox.width, hitbox.height) {
        pos.x
    } else {
        pos.x + move_x
    };
    let next_y = if map.is_blocked(next_x, pos.y + move_y, hitbox.width, hitbox.height) {
        pos.y
    } else {
        pos.y + move_y
    };

    Position {
        x: next_x,
        y: next_y,
        angle: pos.angle,
    }
}

/// Velocity → position with terrain collision.
#[derive(Debug, Default)]
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Components an entity must hold to move.
    #[must_use]
    pub const fn mask() -> ComponentMask {
        ComponentMask::of::<Position>()
            .with::<Velocity>()
            .with::<CollisionBox>()
    }
}

impl System for PhysicsSystem {
    fn name(&self) -> &'static str {
        "physics"
    }

    fn run(&mut self, ctx: &TickContext<'_>) -> Result<(), TickError> {
        let store = ctx.store;
        let mut skipped = 0;

        for id in store.query(Self::mask()) {
            let (Some(pos), Some(velocity), Some(hitbox)) = (
                store.get::<Position>(id),
                store.get::<Velocity>(id),
                store.get::<CollisionBox>(id),
            ) else {
                continue;
            };
            if velocity.is_zero() {
                continue;
            }

            let next = resolve_movement(ctx.map, pos, velocity, hitbox, ctx.delta);
            if !(next.x.is_finite() && next.y.is_finite()) {
                skipped += 1;
                continue;
            }
            store.set(id, next);
        }

        if skipped > 0 {
            return Err(TickError::NonFiniteState {
                system: self.name(),
                count: skipped,
            });
        }
        Ok(())
    }
}
