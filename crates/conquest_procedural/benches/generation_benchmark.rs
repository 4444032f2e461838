//! # Map Generation Benchmark
//!
//! Run with: `cargo bench --package conquest_procedural`

#![allow(missing_docs)]

use conquest_procedural::{MapConfig, WorldMap};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_generate_default(c: &mut Criterion) {
    let config = MapConfig::default();
    c.bench_function("generate_50x50", |b| {
        b.iter(|| black_box(WorldMap::generate(&config)));
    });
}

fn bench_is_blocked(c: &mut Criterion) {
    let (map, _) = match WorldMap::generate(&MapConfig::default()) {
        Ok(generated) => generated,
        Err(e) => panic!("default config must generate: {e}"),
    };
    let (w, h) = map.world_extent();

    c.bench_function("is_blocked_grid_sweep", |b| {
        b.iter(|| {
            let mut blocked = 0u32;
            let mut y = 0.0;
            while y < h {
                let mut x = 0.0;
                while x < w {
                    blocked += u32::from(map.is_blocked(x, y, 32.0, 32.0));
                    x += 16.0;
                }
                y += 16.0;
            }
            black_box(blocked)
        });
    });
}

criterion_group!(benches, bench_generate_default, bench_is_blocked);
criterion_main!(benches);
