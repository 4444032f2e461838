//! # World Map
//!
//! Static terrain grid generated once at startup.
//!
//! ```text
//!   world (px)           tiles[x * height + y]
//!   (0,0) ──────► x      ┌───┬───┬───┐
//!     │                  │ G │ W │ R │   G ground   W water
//!     │                  ├───┼───┼───┤   R rock     T tree
//!     ▼ y                │ G │ T │ G │
//!                        └───┴───┴───┘
//! ```
//!
//! Anything outside the grid is solid for blocking queries and neutral
//! (multiplier 1.0) for speed queries.

use crate::config::{MapConfig, StructureSpec};
use crate::error::{MapError, MapResult};
use crate::tile::Tile;
use conquest_shared::TerrainExport;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Result of placing one structure spec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementOutcome {
    /// The spec that was placed.
    pub spec: StructureSpec,
    /// Footprints actually stamped.
    pub placed: usize,
    /// Attempts consumed from the budget.
    pub attempts: u32,
}

impl PlacementOutcome {
    /// True when every requested footprint was placed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.placed >= self.spec.count
    }
}

/// Per-structure summary of a generation run.
///
/// A shortfall (budget exhausted before `count` placements) is an accepted
/// outcome, reported here rather than as an error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// One entry per structure spec, in placement order.
    pub outcomes: Vec<PlacementOutcome>,
}

impl GenerationReport {
    /// Sum of requested placements.
    #[must_use]
    pub fn total_requested(&self) -> usize {
        self.outcomes.iter().map(|o| o.spec.count).sum()
    }

    /// Sum of successful placements.
    #[must_use]
    pub fn total_placed(&self) -> usize {
        self.outcomes.iter().map(|o| o.placed).sum()
    }

    /// Specs that fell short of their count.
    pub fn shortfalls(&self) -> impl Iterator<Item = &PlacementOutcome> {
        self.outcomes.iter().filter(|o| !o.is_complete())
    }
}

/// Immutable terrain grid.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldMap {
    width: usize,
    height: usize,
    tile_size: f32,
    collision_padding: f32,
    water_speed_multiplier: f32,
    tiles: Box<[Tile]>,
}

impl WorldMap {
    /// Generates a map from `config`, seeded with `config.seed`.
    ///
    /// The grid starts as open ground. Structures are stamped in category
    /// priority order by rejection sampling; a footprint is accepted only if
    /// every tile under it is still open ground.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if the config is invalid. Under-placement is not
    /// an error.
    pub fn generate(config: &MapConfig) -> MapResult<(Self, GenerationReport)> {
        config.validate()?;

        let mut map = Self {
            width: config.width_tiles,
            height: config.height_tiles,
            tile_size: config.tile_size,
            collision_padding: config.collision_padding,
            water_speed_multiplier: config.water_speed_multiplier,
            tiles: vec![Tile::Ground; config.width_tiles * config.height_tiles].into_boxed_slice(),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        tracing::info!(
            width = map.width,
            height = map.height,
            seed = config.seed,
            "Generating world map"
        );

        let outcomes: Vec<PlacementOutcome> = config
            .placement_order()
            .into_iter()
            .map(|spec| map.place(spec, &mut rng, config.max_attempts_per_structure))
            .collect();
        let report = GenerationReport { outcomes };

        for short in report.shortfalls() {
            tracing::warn!(
                category = ?short.spec.category,
                width = short.spec.width,
                height = short.spec.height,
                placed = short.placed,
                requested = short.spec.count,
                "Structure budget exhausted before reaching requested count"
            );
        }
        tracing::info!(
            placed = report.total_placed(),
            requested = report.total_requested(),
            "World map generated"
        );

        Ok((map, report))
    }

    /// Builds a map from explicit columns, `columns[x][y]`.
    ///
    /// Collision padding and the water multiplier take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if the grid is empty, ragged, or the tile size is
    /// not positive.
    pub fn from_columns(tile_size: f32, columns: &[Vec<Tile>]) -> MapResult<Self> {
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(MapError::EmptyGrid { width, height });
        }
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(MapError::InvalidTileSize(tile_size));
        }
        let tiles: Vec<Tile> = columns.iter().flatten().copied().collect();
        if tiles.len() != width * height || columns.iter().any(|c| c.len() != height) {
            return Err(MapError::ShapeMismatch {
                expected: width * height,
                actual: tiles.len(),
            });
        }
        let defaults = MapConfig::default();
        Ok(Self {
            width,
            height,
            tile_size,
            collision_padding: defaults.collision_padding,
            water_speed_multiplier: defaults.water_speed_multiplier,
            tiles: tiles.into_boxed_slice(),
        })
    }

    fn place(&mut self, spec: StructureSpec, rng: &mut ChaCha8Rng, budget: u32) -> PlacementOutcome {
        let mut placed = 0;
        let mut attempts = 0;
        while placed < spec.count && attempts < budget {
            attempts += 1;
            let x = rng.gen_range(0..=self.width - spec.width);
            let y = rng.gen_range(0..=self.height - spec.height);
            if self.footprint_is_open(x, y, spec.width, spec.height) {
                self.stamp(x, y, spec.width, spec.height, spec.category.tile());
                placed += 1;
            }
        }
        PlacementOutcome {
            spec,
            placed,
            attempts,
        }
    }

    fn footprint_is_open(&self, x: usize, y: usize, w: usize, h: usize) -> bool {
        (x..x + w).all(|tx| (y..y + h).all(|ty| self.tile(tx, ty) == Some(Tile::Ground)))
    }

    fn stamp(&mut self, x: usize, y: usize, w: usize, h: usize, tile: Tile) {
        for tx in x..x + w {
            for ty in y..y + h {
                self.tiles[tx * self.height + ty] = tile;
            }
        }
    }

    /// Width in tiles.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Tile side in world units.
    #[inline]
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Extent in world units, `(width, height)`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn world_extent(&self) -> (f32, f32) {
        (
            self.width as f32 * self.tile_size,
            self.height as f32 * self.tile_size,
        )
    }

    /// Tile at grid coordinates.
    #[inline]
    #[must_use]
    pub fn tile(&self, tx: usize, ty: usize) -> Option<Tile> {
        if tx < self.width && ty < self.height {
            Some(self.tiles[tx * self.height + ty])
        } else {
            None
        }
    }

    /// Tile under a world-space point, `None` outside the grid.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn tile_at(&self, x: f32, y: f32) -> Option<Tile> {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return None;
        }
        self.tile(
            (x / self.tile_size).floor() as usize,
            (y / self.tile_size).floor() as usize,
        )
    }

    /// Number of tiles of a given kind.
    #[must_use]
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// Movement multiplier of the terrain under a point.
    ///
    /// Soft terrain returns the water multiplier; everything else, including
    /// out-of-bounds, returns 1.0.
    #[must_use]
    pub fn terrain_speed_multiplier(&self, x: f32, y: f32) -> f32 {
        match self.tile_at(x, y) {
            Some(tile) if tile.is_soft() => self.water_speed_multiplier,
            _ => 1.0,
        }
    }

    /// True if the point is on a solid tile or outside the grid.
    #[must_use]
    pub fn is_solid_at(&self, x: f32, y: f32) -> bool {
        self.tile_at(x, y).map_or(true, Tile::is_solid)
    }

    /// Four-corner AABB test for a box centred on `(center_x, center_y)`.
    ///
    /// Each corner is inset by the collision padding so a box resting
    /// exactly on a tile seam does not register the neighbouring tile.
    #[must_use]
    pub fn is_blocked(&self, center_x: f32, center_y: f32, width: f32, height: f32) -> bool {
        let pad = self.collision_padding;
        let left = center_x - width / 2.0 + pad;
        let right = center_x + width / 2.0 - pad;
        let top = center_y - height / 2.0 + pad;
        let bottom = center_y + height / 2.0 - pad;

        self.is_solid_at(left, top)
            || self.is_solid_at(right, top)
            || self.is_solid_at(left, bottom)
            || self.is_solid_at(right, bottom)
    }

    /// Picks the centre of a random open-ground tile where a box of the
    /// given size is not blocked.
    ///
    /// Falls back to the centre of the map after `attempts` misses.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn find_spawn_point<R: Rng>(&self, rng: &mut R, width: f32, height: f32, attempts: u32) -> (f32, f32) {
        for _ in 0..attempts {
            let tx = rng.gen_range(0..self.width);
            let ty = rng.gen_range(0..self.height);
            if self.tile(tx, ty) != Some(Tile::Ground) {
                continue;
            }
            let x = (tx as f32 + 0.5) * self.tile_size;
            let y = (ty as f32 + 0.5) * self.tile_size;
            if !self.is_blocked(x, y, width, height) {
                return (x, y);
            }
        }
        let (w, h) = self.world_extent();
        (w / 2.0, h / 2.0)
    }

    /// Read-only copy of the grid for clients.
    #[must_use]
    pub fn export(&self) -> TerrainExport {
        TerrainExport {
            width: self.width,
            height: self.height,
            tile_size: self.tile_size,
            tiles: self
                .tiles
                .chunks(self.height)
                .map(|column| column.iter().map(|t| t.code()).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walled() -> WorldMap {
        // 3x3, rock in the middle column's top tile.
        let columns = vec![
            vec![Tile::Ground, Tile::Ground, Tile::Water],
            vec![Tile::Rock, Tile::Ground, Tile::Ground],
            vec![Tile::Ground, Tile::Tree, Tile::Ground],
        ];
        WorldMap::from_columns(64.0, &columns).unwrap()
    }

    #[test]
    fn test_tile_lookup() {
        let map = walled();
        assert_eq!(map.tile_at(70.0, 10.0), Some(Tile::Rock));
        assert_eq!(map.tile_at(10.0, 130.0), Some(Tile::Water));
        assert_eq!(map.tile_at(-1.0, 10.0), None);
        assert_eq!(map.tile_at(192.0, 10.0), None);
        assert_eq!(map.tile_at(f32::NAN, 10.0), None);
    }

    #[test]
    fn test_speed_multiplier() {
        let map = walled();
        assert!((map.terrain_speed_multiplier(10.0, 150.0) - 0.5).abs() < f32::EPSILON);
        assert!((map.terrain_speed_multiplier(10.0, 10.0) - 1.0).abs() < f32::EPSILON);
        assert!((map.terrain_speed_multiplier(-500.0, 10.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_blocked_corners_and_border() {
        let map = walled();
        // Fully inside ground tile (0,0).
        assert!(!map.is_blocked(32.0, 32.0, 32.0, 32.0));
        // Straddles into the rock at (1,0).
        assert!(map.is_blocked(60.0, 32.0, 32.0, 32.0));
        // Overlap smaller than the padding is absorbed.
        assert!(!map.is_blocked(52.0, 32.0, 32.0, 32.0));
        // Outside the grid.
        assert!(map.is_blocked(10.0, 32.0, 32.0, 32.0));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let columns = vec![vec![Tile::Ground; 2], vec![Tile::Ground; 3]];
        assert!(matches!(
            WorldMap::from_columns(64.0, &columns),
            Err(MapError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_export_layout() {
        let export = walled().export();
        assert_eq!(export.tiles[1][0], 3);
        assert_eq!(export.tiles[2][1], 2);
        assert_eq!(export.tiles[0][2], 1);
        assert_eq!(export.tile_size, 64.0);
    }

    #[test]
    fn test_export_keeps_fractional_tile_size() {
        let map = WorldMap::from_columns(12.5, &vec![vec![Tile::Ground; 2]; 2]).unwrap();
        let export = map.export();
        assert_eq!(export.tile_size, 12.5);
        assert_eq!(map.world_extent(), (25.0, 25.0));
    }
}
