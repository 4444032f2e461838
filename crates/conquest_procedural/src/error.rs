//! # Map Error Types

use thiserror::Error;

/// Errors raised while building a world map.
///
/// Placing fewer structures than requested is not an error; see
/// [`GenerationReport`](crate::GenerationReport).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    /// Grid has a zero dimension.
    #[error("map must be at least 1x1 tiles, got {width}x{height}")]
    EmptyGrid {
        /// Configured width.
        width: usize,
        /// Configured height.
        height: usize,
    },

    /// Tile size is not a positive finite number.
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(f32),

    /// A tuning value is negative, NaN or infinite.
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidParameter {
        /// Config key.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },

    /// Structure footprint is empty or larger than the grid.
    #[error("structure {width}x{height} does not fit a {grid_width}x{grid_height} grid")]
    StructureDoesNotFit {
        /// Footprint width in tiles.
        width: usize,
        /// Footprint height in tiles.
        height: usize,
        /// Grid width in tiles.
        grid_width: usize,
        /// Grid height in tiles.
        grid_height: usize,
    },

    /// Explicit tile grid has the wrong shape.
    #[error("tile grid shape mismatch: expected {expected} tiles, got {actual}")]
    ShapeMismatch {
        /// Expected tile count.
        expected: usize,
        /// Supplied tile count.
        actual: usize,
    },
}

/// Result type for map construction.
pub type MapResult<T> = Result<T, MapError>;
