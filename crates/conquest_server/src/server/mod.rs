//! # Conquest Server
//!
//! The authoritative simulation loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CONQUEST SERVER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  transport threads            tick thread (single writer)   │
//! │  ┌──────────────┐  commands  ┌────────────────────────────┐ │
//! │  │ GameHandle   │ ─────────► │ 1. drain queue (FIFO)      │ │
//! │  │ (clone/conn) │            │ 2. player control          │ │
//! │  └──────┬───────┘            │ 3. physics                 │ │
//! │         │ read-only          │ 4. survival                │ │
//! │         ▼                    │ 5. snapshot emission ──────┼─┼─► outbound
//! │  ┌──────────────────────┐    └─────────────┬──────────────┘ │
//! │  │ EntityStore (RwLock) │ ◄────────────────┘                │
//! │  └──────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything present in the queue when a tick starts is applied before any
//! system runs; anything enqueued later waits for the next tick. A failing or
//! panicking tick is logged and the next tick runs on whatever state it left.

mod lifecycle;
mod tick;

pub use lifecycle::{LifecycleManager, Spawned};
pub use tick::{TickLoop, TickStats};

use crate::command::{parse_item, Command, InputCommand};
use crate::config::ServerConfig;
use crate::error::{CommandError, ReplyError, StartupError};
use crate::reply::{response_slot, ResponseSlot};
use crate::snapshot::{ChannelSink, OutboundMessage, SnapshotEmitter};
use crate::systems::{PhysicsSystem, PlayerControlSystem, SurvivalSystem, System, TickContext};
use conquest_core::{EntityId, EntityStore, ExternalId, Input, Inventory, StoreReader};
use conquest_procedural::WorldMap;
use conquest_shared::constants::WELCOME_MESSAGE;
use conquest_shared::{JoinOutcome, RawInput, TerrainExport};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// The simulation scheduler. Owns every write to the store.
pub struct Scheduler {
    config: ServerConfig,
    store: Arc<EntityStore>,
    map: Arc<WorldMap>,
    command_rx: Receiver<Command>,
    command_tx: Sender<Command>,
    sink: ChannelSink,
    systems: Vec<Box<dyn System>>,
    lifecycle: LifecycleManager,
    emitter: SnapshotEmitter,
    tick_loop: TickLoop,
    tick: u64,
    failed_ticks: u64,
}

impl Scheduler {
    /// Generates the world map and builds a scheduler.
    ///
    /// # Returns
    ///
    /// The scheduler and the receiving end of its outbound message channel.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] if the config or the map is invalid.
    pub fn new(config: ServerConfig) -> Result<(Self, Receiver<OutboundMessage>), StartupError> {
        config.validate()?;
        let (map, _report) = WorldMap::generate(&config.world)?;
        Ok(Self::with_map(config, map))
    }

    /// Builds a scheduler around an existing map.
    #[must_use]
    pub fn with_map(config: ServerConfig, map: WorldMap) -> (Self, Receiver<OutboundMessage>) {
        let (command_tx, command_rx) = unbounded();
        let (outbound_tx, outbound_rx) = bounded(config.simulation.outbound_capacity.max(1));

        let systems: Vec<Box<dyn System>> = vec![
            Box::new(PlayerControlSystem),
            Box::new(PhysicsSystem),
            Box::new(SurvivalSystem::new(config.survival)),
        ];

        let scheduler = Self {
            lifecycle: LifecycleManager::new(config.player.clone(), config.simulation.seed),
            tick_loop: TickLoop::new(config.simulation.tick_rate),
            store: Arc::new(EntityStore::new()),
            map: Arc::new(map),
            command_rx,
            command_tx,
            sink: ChannelSink::new(outbound_tx),
            systems,
            emitter: SnapshotEmitter::new(),
            tick: 0,
            failed_ticks: 0,
            config,
        };
        (scheduler, outbound_rx)
    }

    /// Appends a system after the built-in ones.
    pub fn push_system(&mut self, system: Box<dyn System>) {
        self.systems.push(system);
    }

    /// A new handle for producers.
    #[must_use]
    pub fn handle(&self) -> GameHandle {
        GameHandle {
            commands: self.command_tx.clone(),
            store: Arc::clone(&self.store),
            map: Arc::clone(&self.map),
            join_timeout: self.config.simulation.join_timeout(),
        }
    }

    /// Shared store.
    #[must_use]
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    /// Shared map.
    #[must_use]
    pub fn map(&self) -> &Arc<WorldMap> {
        &self.map
    }

    /// Lifecycle manager (sessions).
    #[must_use]
    pub const fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    /// Snapshot emitter (stats cache, counters).
    #[must_use]
    pub const fn emitter(&self) -> &SnapshotEmitter {
        &self.emitter
    }

    /// Number of ticks run.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Number of ticks that reported a failure or panicked.
    #[must_use]
    pub const fn failed_ticks(&self) -> u64 {
        self.failed_ticks
    }

    /// Runs one tick: drain, systems, emit.
    ///
    /// # Returns
    ///
    /// `false` if any part of the tick failed. The failure is logged and
    /// whatever the tick already changed stays changed.
    pub fn tick(&mut self) -> bool {
        self.tick += 1;
        let tick = self.tick;

        match panic::catch_unwind(AssertUnwindSafe(|| self.tick_body())) {
            Ok(0) => true,
            Ok(failures) => {
                tracing::error!(tick, failures, "Tick completed with failing systems");
                self.failed_ticks += 1;
                false
            }
            Err(payload) => {
                tracing::error!(tick, panic = panic_message(payload.as_ref()), "Tick panicked");
                self.failed_ticks += 1;
                false
            }
        }
    }

    fn tick_body(&mut self) -> usize {
        self.drain_commands();

        let ctx = TickContext {
            store: &self.store,
            map: &self.map,
            delta: self.config.simulation.fixed_delta,
            tick: self.tick,
        };
        let mut failures = 0;
        for system in &mut self.systems {
            if let Err(e) = system.run(&ctx) {
                tracing::error!(tick = ctx.tick, system = system.name(), "System failed: {}", e);
                failures += 1;
            }
        }

        self.emitter.emit(&self.store, &self.sink, server_time_ms());
        failures
    }

    /// Applies exactly the commands queued when the tick started.
    fn drain_commands(&mut self) -> usize {
        let pending = self.command_rx.len();
        let mut applied = 0;
        for _ in 0..pending {
            let Ok(command) = self.command_rx.try_recv() else {
                break;
            };
            self.apply(command);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, command: Command) {
        tracing::trace!(command = command.kind(), "Applying command");
        let store = &*self.store;
        match command {
            Command::Input(InputCommand { entity, input }) => {
                if !store.has::<Input>(entity) {
                    tracing::debug!(entity = %entity, "Input for unknown entity dropped");
                    return;
                }
                store.set(entity, input);
            }
            Command::SpawnAuthenticated {
                external_id,
                display_name,
                reply,
            } => {
                let spawned = self
                    .lifecycle
                    .spawn_authenticated(store, &self.map, external_id, &display_name);
                self.finish_join(&spawned, reply);
            }
            Command::SpawnGuest { display_name, reply } => {
                let spawned = self.lifecycle.spawn_guest(store, &self.map, &display_name);
                self.finish_join(&spawned, reply);
            }
            Command::Despawn { entity } => {
                let existed = store.contains(entity);
                match self.lifecycle.despawn(store, entity) {
                    Some(identity) => self.emitter.forget(&identity.external_id),
                    None if existed => {
                        tracing::debug!(entity = %entity, "Despawned entity without identity");
                    }
                    None => tracing::debug!(entity = %entity, "Despawn of unknown entity ignored"),
                }
            }
            Command::Disconnect { external_id } => {
                self.emitter.forget(&external_id);
                if self.lifecycle.disconnect(store, &external_id).is_none() {
                    tracing::debug!(identity = %external_id, "Disconnect without live entity");
                }
            }
            Command::AddItem {
                entity,
                item,
                quantity,
            } => match store.update::<Inventory, _>(entity, |inv| inv.add_item(item, quantity)) {
                Some(true) => self.emitter.send_inventory(store, &self.sink, entity),
                Some(false) => tracing::debug!(entity = %entity, item = %item, "Inventory full"),
                None => tracing::debug!(entity = %entity, "Item for unknown entity dropped"),
            },
            Command::MoveItem { entity, from, to } => {
                match store.update::<Inventory, _>(entity, |inv| inv.swap(from, to)) {
                    Some(true) => self.emitter.send_inventory(store, &self.sink, entity),
                    Some(false) => tracing::debug!(entity = %entity, from, to, "Invalid slot move"),
                    None => tracing::debug!(entity = %entity, "Move for unknown entity dropped"),
                }
            }
        }
    }

    fn finish_join(&mut self, spawned: &Spawned, reply: ResponseSlot<JoinOutcome>) {
        // A rejoin must get a fresh stats send.
        self.emitter.forget(&spawned.identity);
        let outcome = JoinOutcome {
            entity_id: spawned.entity.raw(),
            spawn_x: spawned.position.x,
            spawn_y: spawned.position.y,
            success: true,
            message: WELCOME_MESSAGE.to_owned(),
        };
        if !reply.resolve(outcome) {
            // Nobody can reach this entity; undo the spawn.
            tracing::debug!(entity = %spawned.entity, "Join reply discarded, requester gave up");
            if let Some(identity) = self.lifecycle.despawn(&self.store, spawned.entity) {
                self.emitter.forget(&identity.external_id);
            }
        }
    }

    /// Runs ticks at the configured rate until `running` is cleared.
    pub fn run(&mut self, running: &AtomicBool) {
        let interval = Duration::from_secs(self.config.simulation.stats_log_interval_secs);
        let mut last_report = Instant::now();

        tracing::info!(
            tick_rate = self.config.simulation.tick_rate,
            delta = self.config.simulation.fixed_delta,
            "Scheduler started"
        );

        while running.load(Ordering::Acquire) {
            self.tick_loop.wait_for_next_tick();
            let start = self.tick_loop.begin_tick();
            self.tick();
            if self.tick_loop.end_tick(start) {
                tracing::debug!(tick = self.tick, "Tick exceeded its budget");
            }

            if !interval.is_zero() && last_report.elapsed() >= interval {
                self.log_stats();
                last_report = Instant::now();
            }
        }

        tracing::info!(ticks = self.tick, failed = self.failed_ticks, "Scheduler stopped");
    }

    fn log_stats(&mut self) {
        let stats = *self.tick_loop.stats();
        tracing::info!(
            tick = self.tick,
            avg_us = stats.avg_tick_us,
            max_us = stats.max_tick_us,
            late_ticks = stats.late_ticks,
            late_starts = stats.late_starts,
            entities = self.store.len(),
            sessions = self.lifecycle.session_count(),
            dropped = self.emitter.stats().dropped,
            "Tick stats"
        );
        self.tick_loop.reset_stats();
    }

    /// Moves the scheduler onto its own thread.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::Thread`] if the OS refuses the thread.
    pub fn spawn(self) -> Result<RunningScheduler, StartupError> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = self.handle();

        let thread = thread::Builder::new()
            .name("conquest-tick".to_owned())
            .spawn(move || {
                let mut scheduler = self;
                scheduler.run(&flag);
            })
            .map_err(StartupError::Thread)?;

        Ok(RunningScheduler {
            running,
            thread: Some(thread),
            handle,
        })
    }
}

/// A scheduler running on its own thread.
pub struct RunningScheduler {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    handle: GameHandle,
}

impl RunningScheduler {
    /// Producer handle.
    #[must_use]
    pub fn handle(&self) -> GameHandle {
        self.handle.clone()
    }

    /// Asks the loop to stop after the current tick.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Stops the loop and waits for the thread to exit.
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the tick thread itself died.
    pub fn join(mut self) -> thread::Result<()> {
        self.stop();
        self.thread.take().map_or(Ok(()), JoinHandle::join)
    }
}

impl Drop for RunningScheduler {
    fn drop(&mut self) {
        self.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Producer-side access to a scheduler. Cheap to clone; one per connection.
///
/// Every mutation goes through the command queue. Enqueueing never blocks.
#[derive(Clone)]
pub struct GameHandle {
    commands: Sender<Command>,
    store: Arc<EntityStore>,
    map: Arc<WorldMap>,
    join_timeout: Duration,
}

impl GameHandle {
    /// Overrides the bounded wait of joins.
    #[must_use]
    pub const fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Enqueues a command for the next tick.
    ///
    /// # Errors
    ///
    /// [`CommandError::SchedulerStopped`] if the scheduler is gone.
    pub fn submit(&self, command: Command) -> Result<(), CommandError> {
        self.commands
            .send(command)
            .map_err(|_| CommandError::SchedulerStopped)
    }

    /// Parses raw input and enqueues it. Malformed input is logged and dropped.
    ///
    /// # Errors
    ///
    /// The parse error, or [`CommandError::SchedulerStopped`].
    pub fn send_input(&self, raw: &RawInput) -> Result<(), CommandError> {
        let command = InputCommand::parse(raw).map_err(|e| {
            tracing::warn!(entity = %raw.entity, "Dropping malformed input: {}", e);
            e
        })?;
        self.submit(Command::Input(command))
    }

    /// Joins as a guest and waits for the spawn.
    ///
    /// # Errors
    ///
    /// [`ReplyError::Timeout`] if no tick answered within the join timeout.
    pub fn join_guest(&self, display_name: &str) -> Result<JoinOutcome, ReplyError> {
        let display_name = display_name.to_owned();
        self.request(|reply| Command::SpawnGuest { display_name, reply })
    }

    /// Joins an authenticated identity and waits for the spawn.
    ///
    /// # Errors
    ///
    /// [`ReplyError::Timeout`] if no tick answered within the join timeout.
    pub fn join_authenticated(&self, external_id: ExternalId, display_name: &str) -> Result<JoinOutcome, ReplyError> {
        let display_name = display_name.to_owned();
        self.request(|reply| Command::SpawnAuthenticated {
            external_id,
            display_name,
            reply,
        })
    }

    fn request(&self, build: impl FnOnce(ResponseSlot<JoinOutcome>) -> Command) -> Result<JoinOutcome, ReplyError> {
        let (slot, waiter) = response_slot();
        self.submit(build(slot)).map_err(|_| ReplyError::Abandoned)?;
        waiter.wait(self.join_timeout).map_err(|e| {
            tracing::warn!("Join request failed: {}", e);
            e
        })
    }

    /// Enqueues removal of an entity.
    ///
    /// # Errors
    ///
    /// [`CommandError::SchedulerStopped`] if the scheduler is gone.
    pub fn despawn(&self, entity: EntityId) -> Result<(), CommandError> {
        self.submit(Command::Despawn { entity })
    }

    /// Enqueues removal of an identity's entity.
    ///
    /// # Errors
    ///
    /// [`CommandError::SchedulerStopped`] if the scheduler is gone.
    pub fn disconnect(&self, external_id: ExternalId) -> Result<(), CommandError> {
        self.submit(Command::Disconnect { external_id })
    }

    /// Parses an item name and enqueues an inventory add.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownItem`], [`CommandError::ZeroQuantity`], or
    /// [`CommandError::SchedulerStopped`].
    pub fn add_item(&self, entity: EntityId, item: &str, quantity: u32) -> Result<(), CommandError> {
        if quantity == 0 {
            return Err(CommandError::ZeroQuantity);
        }
        let item = parse_item(item)?;
        self.submit(Command::AddItem {
            entity,
            item,
            quantity,
        })
    }

    /// Enqueues an inventory slot swap.
    ///
    /// # Errors
    ///
    /// [`CommandError::SchedulerStopped`] if the scheduler is gone.
    pub fn move_item(&self, entity: EntityId, from: usize, to: usize) -> Result<(), CommandError> {
        self.submit(Command::MoveItem { entity, from, to })
    }

    /// Read-only terrain grid.
    #[must_use]
    pub fn terrain(&self) -> TerrainExport {
        self.map.export()
    }

    /// Read-only store access. Writes go through [`GameHandle::submit`].
    #[must_use]
    pub fn store(&self) -> StoreReader<'_> {
        self.store.reader()
    }

    /// Read-only map access.
    #[must_use]
    pub fn map(&self) -> &WorldMap {
        &self.map
    }
}

fn server_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
