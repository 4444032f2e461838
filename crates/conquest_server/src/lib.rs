//! # Conquest Server - The Authoritative Simulation
//!
//! A fixed-timestep simulation that owns every write to the entity store.
//!
//! ## Architecture
//!
//! - **Commands**: transport threads enqueue; the tick thread drains
//! - **Systems**: player control, physics, survival, in that order
//! - **Snapshots**: positions every tick, stats only when they change
//! - **Lifecycle**: one live entity per authenticated identity
//!
//! ## Example
//!
//! ```rust,no_run
//! use conquest_server::{Scheduler, ServerConfig};
//!
//! let (scheduler, outbound) = Scheduler::new(ServerConfig::default()).unwrap();
//! let running = scheduler.spawn().unwrap();
//!
//! let joined = running.handle().join_guest("Ada").unwrap();
//! assert!(joined.success);
//!
//! while let Ok(message) = outbound.recv() {
//!     // hand to the transport
//!     let _ = message;
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod command;
pub mod config;
pub mod error;
pub mod reply;
pub mod server;
pub mod snapshot;
pub mod systems;

pub use command::{Command, InputCommand};
pub use config::{LoggingConfig, PlayerConfig, ServerConfig, SimulationConfig, SurvivalConfig};
pub use error::{CommandError, ConfigError, ReplyError, StartupError, TickError};
pub use reply::{response_slot, ReplyWaiter, ResponseSlot};
pub use server::{GameHandle, LifecycleManager, RunningScheduler, Scheduler, Spawned, TickLoop, TickStats};
pub use snapshot::{ChannelSink, EmitStats, OutboundMessage, SnapshotEmitter, SnapshotSink};
pub use systems::{System, TickContext};
