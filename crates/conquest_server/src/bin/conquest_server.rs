//! # Conquest Server
//!
//! Runs the authoritative simulation headless. Without a transport attached,
//! outbound messages are counted and discarded; `--bots` adds wandering
//! guests to exercise the tick.
//!
//! ## Usage
//!
//! ```bash
//! conquest_server --config config/server.toml --duration 30 --bots 50
//! ```

use conquest_server::{OutboundMessage, Scheduler, ServerConfig};
use conquest_shared::RawInput;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

struct Args {
    config: Option<PathBuf>,
    duration_secs: Option<u64>,
    bots: usize,
}

fn parse_args() -> Option<Args> {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        config: None,
        duration_secs: None,
        bots: 0,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if let Some(path) = args.get(i + 1) {
                    parsed.config = Some(PathBuf::from(path));
                    i += 1;
                }
            }
            "--duration" | "-d" => {
                if let Some(secs) = args.get(i + 1) {
                    parsed.duration_secs = secs.parse().ok();
                    i += 1;
                }
            }
            "--bots" | "-b" => {
                if let Some(count) = args.get(i + 1) {
                    parsed.bots = count.parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: conquest_server [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>     TOML config file (default: built-in values)");
                println!("  -d, --duration <SECS>   Run for N seconds then exit");
                println!("  -b, --bots <NUM>        Spawn NUM wandering guests (default: 0)");
                println!("  -h, --help              Show this help");
                println!();
                println!("RUST_LOG overrides [logging].filter.");
                return None;
            }
            other => eprintln!("Ignoring unknown argument: {other}"),
        }
        i += 1;
    }
    Some(parsed)
}

fn init_logging(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = if config.logging.json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().with_thread_names(true).boxed()
    };
    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

fn main() -> ExitCode {
    let Some(args) = parse_args() else {
        return ExitCode::SUCCESS;
    };

    let config = match &args.config {
        Some(path) => match ServerConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => ServerConfig::default(),
    };
    init_logging(&config);

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         CONQUEST SERVER                                          ║");
    println!("║         THE AUTHORITATIVE SIMULATION                             ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();
    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Tick Rate:          {} Hz", config.simulation.tick_rate);
    println!("│ Fixed Delta:        {} s", config.simulation.fixed_delta);
    println!(
        "│ World:              {}x{} tiles @ {}px (seed {})",
        config.world.width_tiles, config.world.height_tiles, config.world.tile_size, config.world.seed
    );
    println!("│ Bots:               {}", args.bots);
    match args.duration_secs {
        Some(d) => println!("│ Duration:           {d} seconds"),
        None => println!("│ Duration:           infinite"),
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let (scheduler, outbound) = match Scheduler::new(config) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let running = match scheduler.spawn() {
        Ok(running) => running,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let bots_alive = Arc::new(AtomicBool::new(true));
    let bot_thread = (args.bots > 0).then(|| {
        let handle = running.handle();
        let alive = Arc::clone(&bots_alive);
        let count = args.bots;
        thread::Builder::new()
            .name("conquest-bots".to_owned())
            .spawn(move || run_bots(&handle, count, &alive))
    });

    let start = Instant::now();
    let deadline = args.duration_secs.map(Duration::from_secs);
    let (mut positions, mut stats, mut inventories) = (0u64, 0u64, 0u64);
    let mut position_bytes = 0usize;
    loop {
        if deadline.is_some_and(|d| start.elapsed() >= d) {
            break;
        }
        match outbound.recv_timeout(Duration::from_millis(100)) {
            Ok(OutboundMessage::Positions(frame)) => {
                positions += 1;
                position_bytes += frame.entity_bytes().len();
            }
            Ok(OutboundMessage::Stats { .. }) => stats += 1,
            Ok(OutboundMessage::Inventory { .. }) => inventories += 1,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    }

    bots_alive.store(false, Ordering::Release);
    if let Some(Ok(thread)) = bot_thread {
        let _ = thread.join();
    }
    if running.join().is_err() {
        tracing::error!("Tick thread panicked");
        return ExitCode::FAILURE;
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                    SERVER SHUTDOWN                               ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║ Uptime:             {:>10.1} s", start.elapsed().as_secs_f64());
    println!("║ Position Frames:    {positions:>10}");
    println!("║ Position Payload:   {:>10.1} KiB", position_bytes as f64 / 1024.0);
    println!("║ Stats Messages:     {stats:>10}");
    println!("║ Inventory Messages: {inventories:>10}");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    ExitCode::SUCCESS
}

/// Joins `count` guests and steers them randomly, changing course every
/// half second and dashing now and then.
fn run_bots(handle: &conquest_server::GameHandle, count: usize, alive: &AtomicBool) {
    let mut rng = ChaCha8Rng::seed_from_u64(0xB07);
    let bots: Vec<u64> = (0..count)
        .filter_map(|i| match handle.join_guest(&format!("bot-{i}")) {
            Ok(joined) => Some(joined.entity_id),
            Err(e) => {
                tracing::warn!(bot = i, "Bot failed to join: {}", e);
                None
            }
        })
        .collect();
    tracing::info!(joined = bots.len(), requested = count, "Bots online");

    while alive.load(Ordering::Acquire) {
        for &entity in &bots {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let mut actions = Vec::new();
            if rng.gen_bool(0.05) {
                actions.push("DASH".to_owned());
            }
            let input = RawInput {
                entity: entity.to_string(),
                x: angle.cos(),
                y: angle.sin(),
                sprint: rng.gen_bool(0.3),
                actions,
                facing: [angle.cos(), angle.sin()],
                aim: [0.0, 0.0],
            };
            if handle.send_input(&input).is_err() {
                return;
            }
        }
        thread::sleep(Duration::from_millis(500));
    }

    for &entity in &bots {
        let _ = handle.despawn(conquest_core::EntityId::from_raw(entity));
    }
}
