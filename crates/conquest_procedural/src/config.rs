//! # Map Configuration
//!
//! Loaded as the `[world]` section of the server config. Every field has a
//! default, so a partial section is valid.
//!
//! ```text
//! [world]
//! width_tiles = 50
//! height_tiles = 50
//!
//! [[world.structures]]
//! category = "water"
//! width = 2
//! height = 2
//! count = 15
//! ```

use crate::error::{MapError, MapResult};
use crate::tile::Tile;
use conquest_shared::constants::TILE_SIZE;
use serde::{Deserialize, Serialize};

/// Structure category. Declaration order is placement priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureCategory {
    /// Lakes, placed first.
    Water,
    /// Boulders, placed second.
    Rock,
    /// Trees and groves, placed last.
    Tree,
}

impl StructureCategory {
    /// Categories in placement order.
    pub const PRIORITY: [Self; 3] = [Self::Water, Self::Rock, Self::Tree];

    /// Tile stamped by this category.
    #[must_use]
    pub const fn tile(self) -> Tile {
        match self {
            Self::Water => Tile::Water,
            Self::Rock => Tile::Rock,
            Self::Tree => Tile::Tree,
        }
    }
}

/// A rectangular footprint to place `count` times.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSpec {
    /// Category (decides tile and priority).
    pub category: StructureCategory,
    /// Footprint width in tiles.
    pub width: usize,
    /// Footprint height in tiles.
    pub height: usize,
    /// Requested number of placements.
    pub count: usize,
}

impl StructureSpec {
    /// Creates a structure spec.
    #[must_use]
    pub const fn new(category: StructureCategory, width: usize, height: usize, count: usize) -> Self {
        Self {
            category,
            width,
            height,
            count,
        }
    }
}

/// World map generation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Grid width in tiles.
    pub width_tiles: usize,
    /// Grid height in tiles.
    pub height_tiles: usize,
    /// Tile side in world units.
    pub tile_size: f32,
    /// Generation seed.
    pub seed: u64,
    /// Attempt budget for each structure spec.
    pub max_attempts_per_structure: u32,
    /// Corner inset of the collision test, in world units.
    pub collision_padding: f32,
    /// Movement multiplier on soft (water) tiles.
    pub water_speed_multiplier: f32,
    /// Structures to place. Order within a category is kept; categories are
    /// always placed in [`StructureCategory::PRIORITY`] order.
    pub structures: Vec<StructureSpec>,
}

impl Default for MapConfig {
    fn default() -> Self {
        use StructureCategory::{Rock, Tree, Water};
        Self {
            width_tiles: 50,
            height_tiles: 50,
            tile_size: TILE_SIZE,
            seed: 12345,
            max_attempts_per_structure: 1000,
            collision_padding: 5.0,
            water_speed_multiplier: 0.5,
            structures: vec![
                StructureSpec::new(Water, 2, 2, 15),
                StructureSpec::new(Water, 4, 2, 10),
                StructureSpec::new(Water, 4, 3, 5),
                StructureSpec::new(Rock, 1, 1, 40),
                StructureSpec::new(Rock, 2, 2, 15),
                StructureSpec::new(Tree, 1, 1, 70),
                StructureSpec::new(Tree, 2, 2, 20),
            ],
        }
    }
}

impl MapConfig {
    /// Checks grid, tile size, movement tuning and every footprint.
    ///
    /// # Errors
    ///
    /// Returns the first [`MapError`] found.
    pub fn validate(&self) -> MapResult<()> {
        if self.width_tiles == 0 || self.height_tiles == 0 {
            return Err(MapError::EmptyGrid {
                width: self.width_tiles,
                height: self.height_tiles,
            });
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(MapError::InvalidTileSize(self.tile_size));
        }
        for (name, value) in [
            ("collision_padding", self.collision_padding),
            ("water_speed_multiplier", self.water_speed_multiplier),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(MapError::InvalidParameter { name, value });
            }
        }
        for spec in &self.structures {
            if spec.width == 0
                || spec.height == 0
                || spec.width > self.width_tiles
                || spec.height > self.height_tiles
            {
                return Err(MapError::StructureDoesNotFit {
                    width: spec.width,
                    height: spec.height,
                    grid_width: self.width_tiles,
                    grid_height: self.height_tiles,
                });
            }
        }
        Ok(())
    }

    /// Structures in placement order: by category priority, then as listed.
    #[must_use]
    pub fn placement_order(&self) -> Vec<StructureSpec> {
        let mut ordered = self.structures.clone();
        // Stable sort keeps the listed order within a category.
        ordered.sort_by_key(|spec| spec.category);
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(MapConfig::default().validate().is_ok());
        assert_eq!(MapConfig::default().tile_size, TILE_SIZE);
    }

    #[test]
    fn test_placement_order_is_priority_order() {
        let config = MapConfig {
            structures: vec![
                StructureSpec::new(StructureCategory::Tree, 1, 1, 1),
                StructureSpec::new(StructureCategory::Water, 2, 2, 1),
                StructureSpec::new(StructureCategory::Rock, 1, 1, 1),
                StructureSpec::new(StructureCategory::Water, 1, 1, 1),
            ],
            ..MapConfig::default()
        };
        let order: Vec<_> = config
            .placement_order()
            .iter()
            .map(|s| (s.category, s.width))
            .collect();
        assert_eq!(
            order,
            vec![
                (StructureCategory::Water, 2),
                (StructureCategory::Water, 1),
                (StructureCategory::Rock, 1),
                (StructureCategory::Tree, 1),
            ]
        );
    }

    #[test]
    fn test_non_finite_tuning_rejected() {
        let config = MapConfig {
            collision_padding: f32::NAN,
            ..MapConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MapError::InvalidParameter { name: "collision_padding", .. })
        ));

        let config = MapConfig {
            water_speed_multiplier: f32::INFINITY,
            ..MapConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(MapError::InvalidParameter {
                name: "water_speed_multiplier",
                value: f32::INFINITY,
            })
        );

        let config = MapConfig {
            collision_padding: -1.0,
            ..MapConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_structure_rejected() {
        let config = MapConfig {
            width_tiles: 3,
            height_tiles: 3,
            structures: vec![StructureSpec::new(StructureCategory::Rock, 4, 1, 1)],
            ..MapConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MapError::StructureDoesNotFit { width: 4, .. })
        ));
    }
}
