//! # Tick Benchmark
//!
//! Cost of one full tick (drain, systems, emission) against the 16 ms budget.
//!
//! Run with: `cargo bench --package conquest_server`

#![allow(missing_docs)]

use conquest_core::EntityId;
use conquest_server::{response_slot, Command, Scheduler, ServerConfig};
use conquest_shared::RawInput;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn populated(players: usize) -> Scheduler {
    let (mut scheduler, _outbound) = Scheduler::new(ServerConfig::default()).unwrap();
    let handle = scheduler.handle();
    let mut entities = Vec::with_capacity(players);

    for i in 0..players {
        let (reply, waiter) = response_slot();
        handle
            .submit(Command::SpawnGuest {
                display_name: format!("bench-{i}"),
                reply,
            })
            .unwrap();
        scheduler.tick();
        entities.push(EntityId::from_raw(waiter.wait(std::time::Duration::ZERO).unwrap().entity_id));
    }

    for (i, entity) in entities.iter().enumerate() {
        let angle = i as f32;
        handle
            .send_input(&RawInput {
                entity: entity.raw().to_string(),
                x: angle.cos(),
                y: angle.sin(),
                sprint: i % 3 == 0,
                ..RawInput::default()
            })
            .unwrap();
    }
    scheduler.tick();
    scheduler
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for players in [10, 100, 500] {
        let mut scheduler = populated(players);
        group.bench_with_input(BenchmarkId::from_parameter(players), &players, |b, _| {
            b.iter(|| black_box(scheduler.tick()));
        });
    }

    group.finish();
}

fn bench_input_drain(c: &mut Criterion) {
    let mut scheduler = populated(100);
    let handle = scheduler.handle();
    let inputs: Vec<RawInput> = scheduler
        .store()
        .indexed::<conquest_core::Input>()
        .into_iter()
        .map(|id| RawInput {
            entity: id.raw().to_string(),
            x: 1.0,
            ..RawInput::default()
        })
        .collect();

    c.bench_function("drain_100_inputs", |b| {
        b.iter(|| {
            for input in &inputs {
                handle.send_input(input).unwrap();
            }
            black_box(scheduler.tick())
        });
    });
}

criterion_group!(benches, bench_tick, bench_input_drain);
criterion_main!(benches);
