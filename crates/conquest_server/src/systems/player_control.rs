//! # Player Control
//!
//! Turns each player's input and dash state into a velocity.
//!
//! ```text
//!            dash trigger consumed
//!            && cooldown <= 0
//!   ┌──────┐ ─────────────────────► ┌──────────┐
//!   │ Idle │                        │ Dashing  │ velocity = dir * dash_speed
//!   └──────┘ ◄───────────────────── └──────────┘
//!            remaining <= 0
//!            cooldown = dash_cooldown
//! ```
//!
//! The cooldown counts down in every phase. A dash trigger is consumed on the
//! tick it is seen whether or not it starts a dash.

use super::{System, TickContext};
use crate::error::TickError;
use conquest_core::{
    ComponentMask, DashPhase, DashState, Input, InputAction, MovementStats, Vec2, Velocity,
};

/// Advances one entity's dash state and returns its new velocity.
///
/// Pure function of its inputs; the system handles store access.
#[must_use]
pub fn step_player(
    input: &Input,
    dash_requested: bool,
    stats: &MovementStats,
    dash: &mut DashState,
    delta: f32,
) -> Velocity {
    if dash.cooldown > 0.0 {
        dash.cooldown = (dash.cooldown - delta).max(0.0);
    }

    if let DashPhase::Dashing { remaining, .. } = &mut dash.phase {
        *remaining -= delta;
        if *remaining <= 0.0 {
            dash.phase = DashPhase::Idle;
            dash.cooldown = stats.dash_cooldown;
        }
    }

    if dash_requested && !dash.is_dashing() && dash.cooldown <= 0.0 {
        let direction = if input.intent.is_zero() {
            input.facing
        } else {
            input.intent.normalize_diagonal()
        };
        dash.phase = DashPhase::Dashing {
            remaining: stats.dash_duration,
            direction,
        };
    }

    match dash.phase {
        DashPhase::Dashing { direction, .. } => Velocity::from_direction(direction, stats.dash_speed),
        DashPhase::Idle if input.intent.is_zero() => Velocity::ZERO,
        DashPhase::Idle => {
            let speed = if input.sprint {
                stats.base_speed * stats.sprint_multiplier
            } else {
                stats.base_speed
            };
            Velocity::from_direction(input.intent.normalize_diagonal(), speed)
        }
    }
}

/// Input + dash state → velocity.
#[derive(Debug, Default)]
pub struct PlayerControlSystem;

impl PlayerControlSystem {
    /// Components an entity must hold to be controlled.
    #[must_use]
    pub const fn mask() -> ComponentMask {
        ComponentMask::of::<Input>()
            .with::<MovementStats>()
            .with::<DashState>()
    }
}

impl System for PlayerControlSystem {
    fn name(&self) -> &'static str {
        "player_control"
    }

    fn run(&mut self, ctx: &TickContext<'_>) -> Result<(), TickError> {
        let store = ctx.store;
        let mut skipped = 0;

        for id in store.query(Self::mask()) {
            let (Some(stats), Some(mut dash)) =
                (store.get::<MovementStats>(id), store.get::<DashState>(id))
            else {
                continue;
            };
            // Consume the trigger and copy the rest of the input in one step.
            let Some((input, dash_requested)) = store.update::<Input, _>(id, |input| {
                let requested = input.actions.take(InputAction::Dash);
                (*input, requested)
            }) else {
                continue;
            };

            let velocity = step_player(&input, dash_requested, &stats, &mut dash, ctx.delta);
            if !Vec2::new(velocity.dx, velocity.dy).is_finite() {
                skipped += 1;
                continue;
            }
            store.set(id, dash);
            store.set(id, velocity);
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

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.016;

    fn moving(x: f32, y: f32, sprint: bool) -> Input {
        Input {
            intent: Vec2::new(x, y),
            sprint,
            ..Input::default()
        }
    }

    #[test]
    fn test_idle_without_intent_is_zero() {
        let mut dash = DashState::default();
        let v = step_player(&Input::default(), false, &MovementStats::default(), &mut dash, DT);
        assert!(v.is_zero());
    }

    #[test]
    fn test_diagonal_speed_matches_axial() {
        let stats = MovementStats::default();
        let axial = step_player(&moving(1.0, 0.0, false), false, &stats, &mut DashState::default(), DT);
        let diagonal = step_player(&moving(1.0, 1.0, false), false, &stats, &mut DashState::default(), DT);
        assert!((axial.speed() - 180.0).abs() < 1e-3);
        assert!((diagonal.speed() - axial.speed()).abs() < 1e-3);
    }

    #[test]
    fn test_sprint_multiplies() {
        let stats = MovementStats::default();
        let v = step_player(&moving(0.0, -1.0, true), false, &stats, &mut DashState::default(), DT);
        assert!((v.dy + 270.0).abs() < 1e-3);
    }

    #[test]
    fn test_dash_locks_direction_and_overrides_input() {
        let stats = MovementStats::default();
        let mut dash = DashState::default();

        let v = step_player(&moving(1.0, 1.0, false), true, &stats, &mut dash, DT);
        assert!(dash.is_dashing());
        assert!((v.speed() - 800.0).abs() < 1e-2);

        // Input turns around; dash keeps its direction.
        let v = step_player(&moving(-1.0, 0.0, true), false, &stats, &mut dash, DT);
        assert!(v.dx > 0.0 && v.dy > 0.0);
    }

    #[test]
    fn test_dash_without_intent_uses_facing() {
        let stats = MovementStats::default();
        let mut dash = DashState::default();
        let input = Input {
            facing: Vec2::new(-1.0, 0.0),
            ..Input::default()
        };
        let v = step_player(&input, true, &stats, &mut dash, DT);
        assert_eq!(v, Velocity::new(-800.0, 0.0));
    }

    #[test]
    fn test_dash_ends_then_cooldown_blocks() {
        let stats = MovementStats::default();
        let mut dash = DashState::default();
        let input = moving(1.0, 0.0, false);

        let _ = step_player(&input, true, &stats, &mut dash, DT);
        let mut ticks = 1;
        while dash.is_dashing() {
            let _ = step_player(&input, false, &stats, &mut dash, DT);
            ticks += 1;
            assert!(ticks < 100);
        }
        // 0.2s at 0.016s per tick.
        assert_eq!(ticks, 14);
        assert!((dash.cooldown - 2.0).abs() < f32::EPSILON);

        // Trigger during cooldown does nothing.
        let v = step_player(&input, true, &stats, &mut dash, DT);
        assert!(!dash.is_dashing());
        assert!((v.speed() - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_cooldown_runs_while_idle() {
        let stats = MovementStats::default();
        let mut dash = DashState {
            phase: DashPhase::Idle,
            cooldown: 0.03,
        };
        let _ = step_player(&Input::default(), false, &stats, &mut dash, DT);
        let _ = step_player(&Input::default(), false, &stats, &mut dash, DT);
        assert_eq!(dash.cooldown, 0.0);
        let _ = step_player(&moving(0.0, 1.0, false), true, &stats, &mut dash, DT);
        assert!(dash.is_dashing());
    }
}
