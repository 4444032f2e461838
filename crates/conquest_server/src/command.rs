//! # Commands
//!
//! The only way code outside the tick can change the simulation. Producers
//! build a [`Command`] and enqueue it; the scheduler applies it at the start
//! of the next tick.
//!
//! Raw client input is parsed here, before it reaches the queue. Malformed
//! fields reject the whole message; unknown action names are dropped one by
//! one.

use crate::error::CommandError;
use crate::reply::ResponseSlot;
use conquest_core::{ActionSet, EntityId, ExternalId, Input, InputAction, ItemType, Vec2};
use conquest_shared::{JoinOutcome, RawInput};

/// Validated player input for one entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputCommand {
    /// Target entity.
    pub entity: EntityId,
    /// Replacement input component.
    pub input: Input,
}

impl InputCommand {
    /// Parses raw transport input.
    ///
    /// Intent axes are clamped into `[-1, 1]`. Action names that do not
    /// parse are skipped.
    ///
    /// # Errors
    ///
    /// [`CommandError::MalformedEntity`] for an unparseable id,
    /// [`CommandError::NonFinite`] for NaN or infinite vectors.
    pub fn parse(raw: &RawInput) -> Result<Self, CommandError> {
        let entity = parse_entity(&raw.entity)?;
        let intent = finite("intent", Vec2::new(raw.x, raw.y))?.clamp_unit();
        let facing = finite("facing", Vec2::new(raw.facing[0], raw.facing[1]))?;
        let aim = finite("aim", Vec2::new(raw.aim[0], raw.aim[1]))?;

        let actions: ActionSet = raw
            .actions
            .iter()
            .filter_map(|name| match name.parse::<InputAction>() {
                Ok(action) => Some(action),
                Err(e) => {
                    tracing::debug!(entity = %entity, "Dropping action: {}", e);
                    None
                }
            })
            .collect();

        Ok(Self {
            entity,
            input: Input {
                intent,
                sprint: raw.sprint,
                actions,
                facing,
                aim,
            },
        })
    }
}

/// Parses a client-supplied entity reference.
///
/// # Errors
///
/// [`CommandError::MalformedEntity`] unless the string is a non-zero integer.
pub fn parse_entity(raw: &str) -> Result<EntityId, CommandError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value != 0 => Ok(EntityId::from_raw(value)),
        _ => Err(CommandError::MalformedEntity(raw.to_owned())),
    }
}

/// Parses a client-supplied item name.
///
/// # Errors
///
/// [`CommandError::UnknownItem`] if the name is not in the vocabulary.
pub fn parse_item(raw: &str) -> Result<ItemType, CommandError> {
    raw.parse().map_err(|_| CommandError::UnknownItem(raw.to_owned()))
}

fn finite(field: &'static str, v: Vec2) -> Result<Vec2, CommandError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CommandError::NonFinite(field))
    }
}

/// A unit of work for the tick thread.
#[derive(Debug)]
pub enum Command {
    /// Replace an entity's input wholesale.
    Input(InputCommand),

    /// Spawn for an authenticated identity, replacing any live entity it owns.
    SpawnAuthenticated {
        /// Identity from the authentication layer.
        external_id: ExternalId,
        /// Name shown to others.
        display_name: String,
        /// Where to send the outcome.
        reply: ResponseSlot<JoinOutcome>,
    },

    /// Spawn a guest under a fresh synthetic identity.
    SpawnGuest {
        /// Requested name; blank becomes "Guest".
        display_name: String,
        /// Where to send the outcome.
        reply: ResponseSlot<JoinOutcome>,
    },

    /// Remove an entity. No-op if already gone.
    Despawn {
        /// Entity to remove.
        entity: EntityId,
    },

    /// Remove whatever entity an identity owns (transport disconnect).
    Disconnect {
        /// Identity that left.
        external_id: ExternalId,
    },

    /// Put items into an entity's inventory.
    AddItem {
        /// Owner.
        entity: EntityId,
        /// Item type.
        item: ItemType,
        /// Stack size.
        quantity: u32,
    },

    /// Swap two inventory slots.
    MoveItem {
        /// Owner.
        entity: EntityId,
        /// Source slot.
        from: usize,
        /// Destination slot.
        to: usize,
    },
}

impl Command {
    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::SpawnAuthenticated { .. } => "spawn_authenticated",
            Self::SpawnGuest { .. } => "spawn_guest",
            Self::Despawn { .. } => "despawn",
            Self::Disconnect { .. } => "disconnect",
            Self::AddItem { .. } => "add_item",
            Self::MoveItem { .. } => "move_item",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entity: &str) -> RawInput {
        RawInput {
            entity: entity.to_owned(),
            x: 1.0,
            y: -1.0,
            sprint: true,
            actions: vec!["dash".to_owned(), "fly".to_owned(), "INTERACT".to_owned()],
            facing: [0.0, 1.0],
            aim: [1.0, 0.0],
        }
    }

    #[test]
    fn test_parse_filters_unknown_actions() {
        let cmd = InputCommand::parse(&raw("7")).unwrap();
        assert_eq!(cmd.entity, EntityId::from_raw(7));
        assert!(cmd.input.actions.contains(InputAction::Dash));
        assert!(cmd.input.actions.contains(InputAction::Interact));
        assert!(!cmd.input.actions.contains(InputAction::Attack));
        assert!(cmd.input.sprint);
    }

    #[test]
    fn test_parse_rejects_bad_entity() {
        assert_eq!(
            InputCommand::parse(&raw("abc")),
            Err(CommandError::MalformedEntity("abc".to_owned()))
        );
        assert!(InputCommand::parse(&raw("0")).is_err());
        assert!(InputCommand::parse(&raw("-4")).is_err());
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        let mut input = raw("3");
        input.x = f32::NAN;
        assert_eq!(InputCommand::parse(&input), Err(CommandError::NonFinite("intent")));

        let mut input = raw("3");
        input.aim = [f32::INFINITY, 0.0];
        assert_eq!(InputCommand::parse(&input), Err(CommandError::NonFinite("aim")));
    }

    #[test]
    fn test_intent_clamped() {
        let mut input = raw("3");
        input.x = 5.0;
        input.y = -0.5;
        let cmd = InputCommand::parse(&input).unwrap();
        assert_eq!(cmd.input.intent, Vec2::new(1.0, -0.5));
    }

    #[test]
    fn test_kind_names() {
        let despawn = Command::Despawn { entity: EntityId::from_raw(1) };
        assert_eq!(despawn.kind(), "despawn");
        let cmd = InputCommand::parse(&raw("2")).unwrap();
        assert_eq!(Command::Input(cmd).kind(), "input");
    }

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("wood"), Ok(ItemType::Wood));
        assert_eq!(parse_item("gold"), Err(CommandError::UnknownItem("gold".to_owned())));
    }
}
