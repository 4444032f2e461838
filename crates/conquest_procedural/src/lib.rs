//! # Conquest Procedural Generation
//!
//! Deterministic, one-shot generation of the static world map.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same map
//! 2. **Priority order**: water, then rock, then tree; earlier never overwritten
//! 3. **Bounded**: every structure has a capped attempt budget
//! 4. **Immutable**: no mutating method exists after construction
//!
//! ## Example
//!
//! ```rust
//! use conquest_procedural::{MapConfig, WorldMap};
//!
//! let (map, report) = WorldMap::generate(&MapConfig::default()).unwrap();
//! assert!(report.total_placed() <= report.total_requested());
//! assert!(map.is_blocked(-100.0, -100.0, 32.0, 32.0));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod tile;
pub mod world_map;

pub use config::{MapConfig, StructureCategory, StructureSpec};
pub use error::{MapError, MapResult};
pub use tile::Tile;
pub use world_map::{GenerationReport, PlacementOutcome, WorldMap};
