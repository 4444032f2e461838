//! # Entity Store Benchmark
//!
//! Query and write throughput of the indexed store at server-scale counts.
//!
//! Run with: `cargo bench --package conquest_core`

#![allow(missing_docs)]

use conquest_core::{ComponentMask, EntityBuilder, EntityStore, Position, Velocity};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn populated(count: usize) -> EntityStore {
    let store = EntityStore::new();
    for i in 0..count {
        let builder = EntityBuilder::new().with(Position::new(i as f32, 0.0));
        // Every other entity moves.
        let builder = if i % 2 == 0 {
            builder.with(Velocity::new(1.0, 0.0))
        } else {
            builder
        };
        store.spawn(builder);
    }
    store
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_position_velocity");
    let mask = ComponentMask::of::<Position>().with::<Velocity>();

    for count in [100, 1_000, 10_000] {
        let store = populated(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(store.query(mask)));
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let store = populated(1_000);
    let ids = store.indexed::<Velocity>();

    c.bench_function("update_position_1k", |b| {
        b.iter(|| {
            for &id in &ids {
                store.update::<Position, _>(id, |p| p.x += 1.0);
            }
        });
    });
}

criterion_group!(benches, bench_query, bench_update);
criterion_main!(benches);
