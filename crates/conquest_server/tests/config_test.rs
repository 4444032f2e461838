//! Config loading: the shipped file matches the defaults and bad values are rejected.

use conquest_procedural::MapError;
use conquest_server::{ConfigError, ServerConfig};
use std::path::PathBuf;

fn shipped_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/server.toml")
}

#[test]
fn test_shipped_config_loads() {
    let config = ServerConfig::load(shipped_config()).unwrap();
    let defaults = ServerConfig::default();

    assert_eq!(config.simulation, defaults.simulation);
    assert_eq!(config.player, defaults.player);
    assert_eq!(config.survival, defaults.survival);
    assert_eq!(config.world, defaults.world);
}

#[test]
fn test_missing_file_reports_path() {
    let err = ServerConfig::load("does/not/exist.toml").unwrap_err();
    assert!(err.to_string().contains("does/not/exist.toml"));
}

#[test]
fn test_non_finite_world_tuning_rejected() {
    let err = ServerConfig::from_toml_str("[world]\ncollision_padding = nan\n").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::World(MapError::InvalidParameter { name: "collision_padding", .. })
    ));

    let err = ServerConfig::from_toml_str("[world]\nwater_speed_multiplier = inf\n").unwrap_err();
    assert!(err.to_string().contains("water_speed_multiplier"));
}
