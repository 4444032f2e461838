//! # Server Configuration
//!
//! TOML file, loaded once at startup. Every section and field has a default,
//! so an empty file yields [`ServerConfig::default`].
//!
//! ```text
//! [simulation]   tick rate, fixed delta, reply timeout, queue sizes
//! [player]       movement, hitbox and starting stats of a new player
//! [survival]     decay and damage rates
//! [world]        map extent, seed and structure list
//! [logging]      filter and output format
//! ```

use crate::error::ConfigError;
use conquest_core::MovementStats;
use conquest_procedural::MapConfig;
use conquest_shared::{FIXED_DELTA, JOIN_TIMEOUT_MS, TICK_RATE};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Root configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Scheduler settings.
    pub simulation: SimulationConfig,
    /// New-player template.
    pub player: PlayerConfig,
    /// Survival rates.
    pub survival: SurvivalConfig,
    /// Map generation.
    pub world: MapConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// Scheduler settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ticks per second.
    pub tick_rate: u32,
    /// Seconds of simulated time per tick.
    pub fixed_delta: f32,
    /// Bounded wait of a synchronous join.
    pub join_timeout_ms: u64,
    /// Capacity of the outbound message channel.
    pub outbound_capacity: usize,
    /// Seconds between tick statistics log lines (0 disables).
    pub stats_log_interval_secs: u64,
    /// Seed of the spawn-point RNG.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            fixed_delta: FIXED_DELTA,
            join_timeout_ms: JOIN_TIMEOUT_MS,
            outbound_capacity: 4096,
            stats_log_interval_secs: 10,
            seed: 12345,
        }
    }
}

impl SimulationConfig {
    /// Join timeout as a [`Duration`].
    #[must_use]
    pub const fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }
}

/// Template for newly spawned players.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Walking speed.
    pub base_speed: f32,
    /// Sprint multiplier.
    pub sprint_multiplier: f32,
    /// Dash speed.
    pub dash_speed: f32,
    /// Dash length in seconds.
    pub dash_duration: f32,
    /// Dash cooldown in seconds.
    pub dash_cooldown: f32,
    /// Square hitbox side.
    pub hitbox_size: f32,
    /// Inventory slot count.
    pub inventory_capacity: usize,
    /// Starting and maximum health.
    pub max_health: f32,
    /// Starting and maximum stamina.
    pub max_stamina: f32,
    /// Starting and maximum hunger.
    pub max_hunger: f32,
    /// Starting and maximum thirst.
    pub max_thirst: f32,
    /// Starting and maximum temperature.
    pub max_temperature: f32,
    /// Cold resistance.
    pub cold_resistance: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let movement = MovementStats::default();
        Self {
            base_speed: movement.base_speed,
            sprint_multiplier: movement.sprint_multiplier,
            dash_speed: movement.dash_speed,
            dash_duration: movement.dash_duration,
            dash_cooldown: movement.dash_cooldown,
            hitbox_size: 32.0,
            inventory_capacity: 20,
            max_health: 100.0,
            max_stamina: 100.0,
            max_hunger: 100.0,
            max_thirst: 100.0,
            max_temperature: 100.0,
            cold_resistance: 4.5,
        }
    }
}

impl PlayerConfig {
    /// Movement stats component for a new player.
    #[must_use]
    pub const fn movement(&self) -> MovementStats {
        MovementStats {
            base_speed: self.base_speed,
            sprint_multiplier: self.sprint_multiplier,
            dash_speed: self.dash_speed,
            dash_duration: self.dash_duration,
            dash_cooldown: self.dash_cooldown,
        }
    }
}

/// Survival decay and damage rates, all per second.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SurvivalConfig {
    /// Hunger lost per second.
    pub hunger_decay_per_sec: f32,
    /// Thirst lost per second.
    pub thirst_decay_per_sec: f32,
    /// Environmental cooling before cold resistance.
    pub base_cooling_rate: f32,
    /// Damage per second at zero hunger.
    pub starvation_damage_per_sec: f32,
    /// Damage per second at zero thirst.
    pub dehydration_damage_per_sec: f32,
    /// Damage per second at zero temperature.
    pub hypothermia_damage_per_sec: f32,
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self {
            hunger_decay_per_sec: 0.5,
            thirst_decay_per_sec: 0.8,
            base_cooling_rate: 5.0,
            starvation_damage_per_sec: 1.0,
            dehydration_damage_per_sec: 1.5,
            hypothermia_damage_per_sec: 2.0,
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            json: false,
        }
    }
}

impl ServerConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on syntax errors or out-of-range values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.tick_rate == 0 || sim.tick_rate > 1000 {
            return Err(invalid("simulation.tick_rate", "must be in 1..=1000"));
        }
        if !(sim.fixed_delta.is_finite() && sim.fixed_delta > 0.0) {
            return Err(invalid("simulation.fixed_delta", "must be a positive number"));
        }
        if sim.outbound_capacity == 0 {
            return Err(invalid("simulation.outbound_capacity", "must be positive"));
        }
        if !(self.player.hitbox_size.is_finite() && self.player.hitbox_size > 0.0) {
            return Err(invalid("player.hitbox_size", "must be a positive number"));
        }
        if self.player.inventory_capacity == 0 {
            return Err(invalid("player.inventory_capacity", "must be positive"));
        }
        self.world.validate()?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}
