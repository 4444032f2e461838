//! # Server Error Types
//!
//! Errors at the boundary between the simulation and its callers. None of
//! them can stop the scheduler: commands are dropped, replies fail, ticks
//! are logged and skipped.

use conquest_procedural::MapError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Config file could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema.
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        /// Dotted field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The `[world]` section is invalid.
    #[error("invalid world config: {0}")]
    World(#[from] MapError),
}

/// A command could not be built or submitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Entity reference is not a valid id.
    #[error("malformed entity reference: {0:?}")]
    MalformedEntity(String),

    /// A vector component is NaN or infinite.
    #[error("non-finite value in field `{0}`")]
    NonFinite(&'static str),

    /// Item name is not in the vocabulary.
    #[error("unknown item type: {0:?}")]
    UnknownItem(String),

    /// Stack size of zero.
    #[error("item quantity must be positive")]
    ZeroQuantity,

    /// The scheduler has shut down.
    #[error("scheduler is not running")]
    SchedulerStopped,
}

/// A synchronous request did not get its reply.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyError {
    /// No reply within the bounded wait.
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// The request was dropped without an answer.
    #[error("request abandoned before a reply was sent")]
    Abandoned,
}

/// A system could not finish its pass cleanly.
///
/// Raised after the pass completes; the offending entities were skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TickError {
    /// Some entities produced non-finite state and were left unchanged.
    #[error("{system}: {count} entities skipped with non-finite state")]
    NonFiniteState {
        /// System name.
        system: &'static str,
        /// Number of skipped entities.
        count: usize,
    },
}

/// The server could not start.
#[derive(Error, Debug)]
pub enum StartupError {
    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Map generation failed.
    #[error("world map generation failed: {0}")]
    Map(#[from] MapError),

    /// Tick thread could not be spawned.
    #[error("cannot spawn tick thread: {0}")]
    Thread(#[source] std::io::Error),
}
