//! # Tile Vocabulary

use serde::{Deserialize, Serialize};

/// Terrain code of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tile {
    /// Open ground.
    #[default]
    Ground = 0,
    /// Shallow water: passable, slows movement.
    Water = 1,
    /// Tree: solid.
    Tree = 2,
    /// Rock: solid.
    Rock = 3,
}

impl Tile {
    /// Numeric code used in the terrain export.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// True for tiles that block movement.
    #[inline]
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Tree | Self::Rock)
    }

    /// True for tiles that slow movement.
    #[inline]
    #[must_use]
    pub const fn is_soft(self) -> bool {
        matches!(self, Self::Water)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solidity() {
        assert!(!Tile::Ground.is_solid());
        assert!(!Tile::Water.is_solid());
        assert!(Tile::Tree.is_solid());
        assert!(Tile::Rock.is_solid());
        assert!(Tile::Water.is_soft());
    }

    #[test]
    fn test_codes() {
        let codes: Vec<u8> = [Tile::Ground, Tile::Water, Tile::Tree, Tile::Rock]
            .iter()
            .map(|t| t.code())
            .collect();
        assert_eq!(codes, vec![0, 1, 2, 3]);
    }
}
