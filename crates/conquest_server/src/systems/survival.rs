//! # Survival
//!
//! Hunger and thirst decay toward zero; once empty they cause damage
//! instead. Temperature drifts by `-(base_cooling - cold_resistance)` per
//! second within `[0, max]` and causes damage at the floor. The three hazards
//! are independent and stack within a tick.

use super::{System, TickContext};
use crate::config::SurvivalConfig;
use crate::error::TickError;
use conquest_core::{ComponentMask, Survival, Vitality};

/// Applies one tick of decay and hazard damage.
pub fn step_survival(rates: &SurvivalConfig, survival: &mut Survival, vitality: &mut Vitality, delta: f32) {
    if survival.hunger > 0.0 {
        survival.hunger = (survival.hunger - rates.hunger_decay_per_sec * delta).max(0.0);
    } else {
        vitality.apply_damage(rates.starvation_damage_per_sec * delta);
    }

    if survival.thirst > 0.0 {
        survival.thirst = (survival.thirst - rates.thirst_decay_per_sec * delta).max(0.0);
    } else {
        vitality.apply_damage(rates.dehydration_damage_per_sec * delta);
    }

    let drift = (rates.base_cooling_rate - survival.cold_resistance) * delta;
    survival.temperature = (survival.temperature - drift).clamp(0.0, survival.max_temperature.max(0.0));
    if survival.temperature <= 0.0 {
        vitality.apply_damage(rates.hypothermia_damage_per_sec * delta);
    }
}

/// Hunger, thirst and temperature.
#[derive(Debug, Default)]
pub struct SurvivalSystem {
    rates: SurvivalConfig,
}

impl SurvivalSystem {
    /// Creates the system with the given rates.
    #[must_use]
    pub const fn new(rates: SurvivalConfig) -> Self {
        Self { rates }
    }

    /// Components an entity must hold to be simulated.
    #[must_use]
    pub const fn mask() -> ComponentMask {
        ComponentMask::of::<Survival>().with::<Vitality>()
    }
}

impl System for SurvivalSystem {
    fn name(&self) -> &'static str {
        "survival"
    }

    fn run(&mut self, ctx: &TickContext<'_>) -> Result<(), TickError> {
        let store = ctx.store;
        let mut skipped = 0;

        for id in store.query(Self::mask()) {
            let (Some(mut survival), Some(mut vitality)) =
                (store.get::<Survival>(id), store.get::<Vitality>(id))
            else {
                continue;
            };

            step_survival(&self.rates, &mut survival, &mut vitality, ctx.delta);

            if !(survival.hunger.is_finite()
                && survival.thirst.is_finite()
                && survival.temperature.is_finite()
                && vitality.health.is_finite())
            {
                skipped += 1;
                continue;
            }
            store.set(id, survival);
            store.set(id, vitality);
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

    fn comfortable() -> Survival {
        // Resistance equals cooling, so temperature holds steady.
        Survival {
            cold_resistance: 5.0,
            ..Survival::full(100.0, 100.0, 50.0, 5.0)
        }
    }

    #[test]
    fn test_starvation_timeline() {
        let rates = SurvivalConfig::default();
        let mut survival = Survival {
            hunger: 10.0,
            ..comfortable()
        };
        let mut vitality = Vitality::full(100.0, 100.0);

        let mut ticks = 0;
        while survival.hunger > 0.0 {
            step_survival(&rates, &mut survival, &mut vitality, DT);
            ticks += 1;
        }
        // 10 / 0.5 = 20 seconds, ~1250 ticks.
        let elapsed = ticks as f32 * DT;
        assert!((elapsed - 20.0).abs() < 0.05, "elapsed {elapsed}");
        assert!((vitality.health - 100.0).abs() < f32::EPSILON, "no damage on the tick hunger hits zero");

        for _ in 0..62 {
            step_survival(&rates, &mut survival, &mut vitality, DT);
        }
        // One simulated second of starvation.
        assert!((vitality.health - 99.0).abs() < 0.02, "health {}", vitality.health);
    }

    #[test]
    fn test_hazards_stack_and_floor() {
        let rates = SurvivalConfig::default();
        let mut survival = Survival {
            hunger: 0.0,
            thirst: 0.0,
            temperature: 0.0,
            cold_resistance: 0.0,
            ..comfortable()
        };
        let mut vitality = Vitality::full(100.0, 100.0);

        step_survival(&rates, &mut survival, &mut vitality, 1.0);
        // 1.0 + 1.5 + 2.0 in one step.
        assert!((vitality.health - 95.5).abs() < 1e-4);

        vitality.health = 0.5;
        step_survival(&rates, &mut survival, &mut vitality, 1.0);
        assert_eq!(vitality.health, 0.0);
        step_survival(&rates, &mut survival, &mut vitality, 1.0);
        assert_eq!(vitality.health, 0.0);
    }

    #[test]
    fn test_resistance_above_cooling_warms_to_cap() {
        let rates = SurvivalConfig::default();
        let mut survival = Survival {
            temperature: 49.0,
            cold_resistance: 8.0,
            ..comfortable()
        };
        let mut vitality = Vitality::full(100.0, 100.0);

        step_survival(&rates, &mut survival, &mut vitality, 1.0);
        assert!((survival.temperature - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_freezing_damage_on_reaching_floor() {
        let rates = SurvivalConfig::default();
        let mut survival = Survival {
            temperature: 0.01,
            cold_resistance: 0.0,
            ..comfortable()
        };
        let mut vitality = Vitality::full(100.0, 100.0);

        step_survival(&rates, &mut survival, &mut vitality, DT);
        assert_eq!(survival.temperature, 0.0);
        assert!((vitality.health - (100.0 - 2.0 * DT)).abs() < 1e-4);
    }

    #[test]
    fn test_decay_never_negative() {
        let rates = SurvivalConfig::default();
        let mut survival = Survival {
            hunger: 0.001,
            thirst: 0.001,
            ..comfortable()
        };
        let mut vitality = Vitality::full(100.0, 100.0);
        step_survival(&rates, &mut survival, &mut vitality, DT);
        assert_eq!(survival.hunger, 0.0);
        assert_eq!(survival.thirst, 0.0);
        assert_eq!(vitality.health, 100.0);
    }
}
