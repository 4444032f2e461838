//! # Component System
//!
//! Components are plain data values with no behavior of their own. At most
//! one instance of each type is attached to an entity; attaching again
//! replaces the previous value wholesale.
//!
//! Each type carries a stable [`Component::ID`] which keys its storage and
//! its bit in a [`ComponentMask`](super::ComponentMask).
//!
//! ```text
//!  ID | component        | written by
//! ----+------------------+---------------------------------
//!   0 | Identity         | lifecycle
//!   1 | Position         | lifecycle, physics
//!   2 | Velocity         | player control
//!   3 | CollisionBox     | lifecycle
//!   4 | MovementStats    | lifecycle
//!   5 | DashState        | player control
//!   6 | Input            | input commands, player control
//!   7 | Survival         | survival
//!   8 | Vitality         | survival
//!   9 | Inventory        | inventory commands
//! ```

use crate::error::ParseError;
use crate::math::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable per-type identifier (0-63).
pub type ComponentId = u8;

/// Marker trait for store components.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug)]
/// struct Health(f32);
///
/// impl Component for Health {
///     const ID: ComponentId = 42;
/// }
/// ```
pub trait Component: Clone + Send + Sync + 'static {
    /// Unique identifier for this component type (0-63).
    ///
    /// This ID is used for the component bitmask and the type index.
    const ID: ComponentId;
}

// =============================================================================
// Identity
// =============================================================================

/// Identity of the player behind an entity, as known to the outside world.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(String);

impl ExternalId {
    /// Wraps an identity issued by the authentication layer.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh synthetic identity for a guest.
    #[must_use]
    pub fn guest() -> Self {
        Self(format!("guest-{}", uuid::Uuid::new_v4()))
    }

    /// Returns the identity as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity tag component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    /// External user id (authenticated or synthetic).
    pub external_id: ExternalId,
    /// Name shown to other players.
    pub display_name: String,
    /// Guests are never persisted and never deduplicated.
    pub guest: bool,
}

impl Component for Identity {
    const ID: ComponentId = 0;
}

// =============================================================================
// Spatial
// =============================================================================

/// Position in world space (pixels), centre of the entity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// X coordinate in world space.
    pub x: f32,
    /// Y coordinate in world space.
    pub y: f32,
    /// Facing angle in radians.
    pub angle: f32,
}

impl Component for Position {
    const ID: ComponentId = 1;
}

impl Position {
    /// Creates a new position facing angle 0.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, angle: 0.0 }
    }
}

/// Velocity in world units per second.
///
/// Derived every tick by player control; never set from outside.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    /// X velocity.
    pub dx: f32,
    /// Y velocity.
    pub dy: f32,
}

impl Component for Velocity {
    const ID: ComponentId = 2;
}

impl Velocity {
    /// Zero velocity.
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    /// Creates a new velocity.
    #[inline]
    #[must_use]
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Builds a velocity from a direction scaled by a speed.
    #[inline]
    #[must_use]
    pub fn from_direction(direction: Vec2, speed: f32) -> Self {
        Self::new(direction.x * speed, direction.y * speed)
    }

    /// Returns true if velocity is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    /// Returns the speed (magnitude).
    #[inline]
    #[must_use]
    pub fn speed(self) -> f32 {
        Vec2::new(self.dx, self.dy).length()
    }
}

/// Axis-aligned hitbox centred on [`Position`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionBox {
    /// Width in world units.
    pub width: f32,
    /// Height in world units.
    pub height: f32,
}

impl Component for CollisionBox {
    const ID: ComponentId = 3;
}

impl CollisionBox {
    /// Creates a new hitbox.
    #[inline]
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Square hitbox.
    #[inline]
    #[must_use]
    pub const fn square(size: f32) -> Self {
        Self::new(size, size)
    }
}

// =============================================================================
// Movement
// =============================================================================

/// Per-entity movement tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovementStats {
    /// Walking speed in units per second.
    pub base_speed: f32,
    /// Multiplier applied to `base_speed` while sprinting.
    pub sprint_multiplier: f32,
    /// Speed during a dash.
    pub dash_speed: f32,
    /// Dash length in seconds.
    pub dash_duration: f32,
    /// Seconds between the end of one dash and the next activation.
    pub dash_cooldown: f32,
}

impl Component for MovementStats {
    const ID: ComponentId = 4;
}

impl Default for MovementStats {
    fn default() -> Self {
        Self {
            base_speed: 180.0,
            sprint_multiplier: 1.5,
            dash_speed: 800.0,
            dash_duration: 0.2,
            dash_cooldown: 2.0,
        }
    }
}

/// Phase of the dash state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DashPhase {
    /// Normal movement.
    #[default]
    Idle,
    /// Dash in progress; normal input is ignored.
    Dashing {
        /// Seconds left in the dash.
        remaining: f32,
        /// Direction locked at activation.
        direction: Vec2,
    },
}

/// Dash state machine plus its cooldown timer.
///
/// The cooldown runs independently of the phase and may tick down while idle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DashState {
    /// Current phase.
    pub phase: DashPhase,
    /// Seconds until a dash may start again.
    pub cooldown: f32,
}

impl Component for DashState {
    const ID: ComponentId = 5;
}

impl DashState {
    /// Returns true while a dash is in progress.
    #[inline]
    #[must_use]
    pub const fn is_dashing(&self) -> bool {
        matches!(self.phase, DashPhase::Dashing { .. })
    }
}

// =============================================================================
// Input
// =============================================================================

/// Discrete, edge-triggered input action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InputAction {
    /// Start a dash.
    Dash = 0,
    /// Primary attack.
    Attack = 1,
    /// Use the selected item.
    UseItem = 2,
    /// Interact with the world.
    Interact = 3,
}

impl InputAction {
    /// All actions.
    pub const ALL: [Self; 4] = [Self::Dash, Self::Attack, Self::UseItem, Self::Interact];

    /// Wire name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dash => "DASH",
            Self::Attack => "ATTACK",
            Self::UseItem => "USE_ITEM",
            Self::Interact => "INTERACT",
        }
    }
}

impl FromStr for InputAction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseError::UnknownAction(s.to_owned()))
    }
}

/// Set of pending action triggers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionSet(u8);

impl ActionSet {
    /// No actions.
    pub const EMPTY: Self = Self(0);

    /// Returns the set with `action` added.
    #[inline]
    #[must_use]
    pub const fn with(self, action: InputAction) -> Self {
        Self(self.0 | (1 << action as u8))
    }

    /// Adds an action.
    #[inline]
    pub fn insert(&mut self, action: InputAction) {
        self.0 |= 1 << action as u8;
    }

    /// Checks if an action is pending.
    #[inline]
    #[must_use]
    pub const fn contains(self, action: InputAction) -> bool {
        (self.0 & (1 << action as u8)) != 0
    }

    /// Removes an action, returning whether it was pending.
    ///
    /// This is the consume step of an edge trigger.
    #[inline]
    pub fn take(&mut self, action: InputAction) -> bool {
        let present = self.contains(action);
        self.0 &= !(1 << action as u8);
        present
    }

    /// True when nothing is pending.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<InputAction> for ActionSet {
    fn from_iter<I: IntoIterator<Item = InputAction>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Latest input snapshot of a player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Input {
    /// Movement intent, each axis in `[-1, 1]`.
    pub intent: Vec2,
    /// Sprint held.
    pub sprint: bool,
    /// Pending discrete triggers.
    pub actions: ActionSet,
    /// Facing direction, used to lock a dash started without intent.
    pub facing: Vec2,
    /// Aim direction.
    pub aim: Vec2,
}

impl Component for Input {
    const ID: ComponentId = 6;
}

impl Default for Input {
    fn default() -> Self {
        Self {
            intent: Vec2::ZERO,
            sprint: false,
            actions: ActionSet::EMPTY,
            facing: Vec2::Y,
            aim: Vec2::ZERO,
        }
    }
}

// =============================================================================
// Survival
// =============================================================================

/// Hunger, thirst and body temperature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Survival {
    /// Current hunger (0 = starving).
    pub hunger: f32,
    /// Hunger cap.
    pub max_hunger: f32,
    /// Current thirst (0 = dehydrated).
    pub thirst: f32,
    /// Thirst cap.
    pub max_thirst: f32,
    /// Body temperature (0 = hypothermic).
    pub temperature: f32,
    /// Temperature cap.
    pub max_temperature: f32,
    /// Subtracted from the environment cooling rate; may exceed it.
    pub cold_resistance: f32,
}

impl Component for Survival {
    const ID: ComponentId = 7;
}

impl Survival {
    /// Full stats with the given caps.
    #[must_use]
    pub const fn full(max_hunger: f32, max_thirst: f32, max_temperature: f32, cold_resistance: f32) -> Self {
        Self {
            hunger: max_hunger,
            max_hunger,
            thirst: max_thirst,
            max_thirst,
            temperature: max_temperature,
            max_temperature,
            cold_resistance,
        }
    }
}

/// Health and stamina.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vitality {
    /// Current health, never negative.
    pub health: f32,
    /// Health cap.
    pub max_health: f32,
    /// Current stamina.
    pub stamina: f32,
    /// Stamina cap.
    pub max_stamina: f32,
}

impl Component for Vitality {
    const ID: ComponentId = 8;
}

impl Vitality {
    /// Full health and stamina.
    #[must_use]
    pub const fn full(max_health: f32, max_stamina: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            stamina: max_stamina,
            max_stamina,
        }
    }

    /// Reduces health, floored at zero.
    ///
    /// Does nothing once health is already zero.
    pub fn apply_damage(&mut self, amount: f32) {
        if self.health > 0.0 {
            self.health = (self.health - amount).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse_case_insensitive() {
        assert_eq!("dash".parse::<InputAction>(), Ok(InputAction::Dash));
        assert_eq!("Use_Item".parse::<InputAction>(), Ok(InputAction::UseItem));
        assert_eq!(
            "teleport".parse::<InputAction>(),
            Err(ParseError::UnknownAction("teleport".to_owned()))
        );
    }

    #[test]
    fn test_action_set_take_is_once() {
        let mut set: ActionSet = [InputAction::Dash, InputAction::Interact].into_iter().collect();
        assert!(set.take(InputAction::Dash));
        assert!(!set.take(InputAction::Dash));
        assert!(set.contains(InputAction::Interact));
        assert!(!set.is_empty());
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let mut vitality = Vitality::full(100.0, 100.0);
        vitality.apply_damage(30.0);
        assert!((vitality.health - 70.0).abs() < f32::EPSILON);
        vitality.apply_damage(500.0);
        assert_eq!(vitality.health, 0.0);
        vitality.apply_damage(1.0);
        assert_eq!(vitality.health, 0.0);
    }

    #[test]
    fn test_guest_ids_unique() {
        assert_ne!(ExternalId::guest(), ExternalId::guest());
    }

    #[test]
    fn test_input_default_faces_down_y() {
        assert_eq!(Input::default().facing, Vec2::Y);
    }
}
