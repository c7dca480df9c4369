//! Micro-operation benchmarks for the cache policies.
//!
//! Run with: `cargo bench --bench ops`
//!
//! Measures per-operation latency for get and insert across the policies
//! under identical conditions: a warm cache and a uniform key stream.

use std::hint::black_box;
use std::time::Instant;

use cachemgr::policy::arc::ArcCore;
use cachemgr::policy::lfu::LfuCore;
use cachemgr::policy::lfu_avg::LfuAvgCore;
use cachemgr::policy::lru::LruCore;
use cachemgr::policy::lru_k::LrukCore;
use cachemgr::traits::CoreCache;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CAPACITY: usize = 16_384;
const OPS: u64 = 100_000;

fn key_stream(len: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(0xCAC4E);
    (0..len).map(|_| rng.gen_range(0..CAPACITY as u64)).collect()
}

// ============================================================================
// Get-hit latency
// ============================================================================

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_hit");
    group.throughput(Throughput::Elements(OPS));
    let keys = key_stream(OPS as usize);

    group.bench_function("lru", |b| {
        b.iter_custom(|iters| {
            let mut cache = LruCore::new(CAPACITY);
            for i in 0..CAPACITY as u64 {
                cache.insert(i, i);
            }
            let start = Instant::now();
            for _ in 0..iters {
                for key in &keys {
                    black_box(cache.get(key));
                }
            }
            start.elapsed()
        })
    });

    group.bench_function("lru_k", |b| {
        b.iter_custom(|iters| {
            let mut cache = LrukCore::with_k(CAPACITY, CAPACITY * 2, 1);
            for i in 0..CAPACITY as u64 {
                cache.insert(i, i);
            }
            let start = Instant::now();
            for _ in 0..iters {
                for key in &keys {
                    black_box(cache.get(key));
                }
            }
            start.elapsed()
        })
    });

    group.bench_function("lfu", |b| {
        b.iter_custom(|iters| {
            let mut cache = LfuCore::new(CAPACITY);
            for i in 0..CAPACITY as u64 {
                cache.insert(i, i);
            }
            let start = Instant::now();
            for _ in 0..iters {
                for key in &keys {
                    black_box(cache.get(key));
                }
            }
            start.elapsed()
        })
    });

    group.bench_function("lfu_avg", |b| {
        b.iter_custom(|iters| {
            let mut cache = LfuAvgCore::with_max_avg_freq(CAPACITY, 64);
            for i in 0..CAPACITY as u64 {
                cache.insert(i, i);
            }
            let start = Instant::now();
            for _ in 0..iters {
                for key in &keys {
                    black_box(cache.get(key));
                }
            }
            start.elapsed()
        })
    });

    group.bench_function("arc", |b| {
        b.iter_custom(|iters| {
            let mut cache = ArcCore::new(CAPACITY);
            for i in 0..CAPACITY as u64 {
                cache.insert(i, i);
            }
            let start = Instant::now();
            for _ in 0..iters {
                for key in &keys {
                    black_box(cache.get(key));
                }
            }
            start.elapsed()
        })
    });

    group.finish();
}

// ============================================================================
// Insert latency (steady-state evictions)
// ============================================================================

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("lru", |b| {
        b.iter_custom(|iters| {
            let mut cache = LruCore::new(CAPACITY);
            let start = Instant::now();
            for iter in 0..iters {
                for i in 0..OPS {
                    let key = iter * OPS + i;
                    black_box(cache.insert(key, key));
                }
            }
            start.elapsed()
        })
    });

    group.bench_function("lfu", |b| {
        b.iter_custom(|iters| {
            let mut cache = LfuCore::new(CAPACITY);
            let start = Instant::now();
            for iter in 0..iters {
                for i in 0..OPS {
                    let key = iter * OPS + i;
                    black_box(cache.insert(key, key));
                }
            }
            start.elapsed()
        })
    });

    group.bench_function("arc", |b| {
        b.iter_custom(|iters| {
            let mut cache = ArcCore::new(CAPACITY);
            let start = Instant::now();
            for iter in 0..iters {
                for i in 0..OPS {
                    let key = iter * OPS + i;
                    cache.insert(black_box(key), key);
                }
            }
            start.elapsed()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_get_hit, bench_insert);
criterion_main!(benches);
