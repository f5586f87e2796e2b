//! Criterion benchmarks for the clearance cache: hit path, miss path, lock lookup.

use std::sync::Arc;

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tokio::runtime::Runtime;

use clearance_cache::{CacheConfig, KeyedClearanceCache, LockRegistry};
use clearance_core::{Acquirer, Clearance, RouteKey, Result};

struct StaticAcquirer;

#[async_trait]
impl Acquirer for StaticAcquirer {
    async fn acquire(&self, _route: &RouteKey) -> Result<Clearance> {
        Ok(Clearance::new([("cf_clearance", "bench")], "UA-bench"))
    }
}

fn bench_cache_hit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let cache = KeyedClearanceCache::with_config(Arc::new(StaticAcquirer), CacheConfig::default());
    let route = RouteKey::from("http://proxy-a:8080");
    rt.block_on(cache.get(&route, false)).unwrap();

    let mut g = c.benchmark_group("cache_hit");
    g.throughput(Throughput::Elements(1));
    g.bench_function("get_valid", |b| {
        b.iter(|| black_box(rt.block_on(cache.get(&route, false))).unwrap());
    });
    g.bench_function("peek", |b| {
        b.iter(|| black_box(cache.peek(&route)));
    });
    g.finish();
}

fn bench_forced_refresh(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let cache = KeyedClearanceCache::new(Arc::new(StaticAcquirer));
    let route = RouteKey::direct();

    let mut g = c.benchmark_group("forced_refresh");
    g.throughput(Throughput::Elements(1));
    g.bench_function("get_force", |b| {
        b.iter(|| black_box(rt.block_on(cache.get(&route, true))).unwrap());
    });
    g.finish();
}

fn bench_lock_registry(c: &mut Criterion) {
    let registry = LockRegistry::new();
    let routes: Vec<RouteKey> = (0..16)
        .map(|i| RouteKey::from(format!("http://proxy-{}:8080", i).as_str()))
        .collect();

    let mut g = c.benchmark_group("lock_registry");
    g.throughput(Throughput::Elements(routes.len() as u64));
    g.bench_function("lock_for", |b| {
        b.iter(|| {
            for route in &routes {
                black_box(registry.lock_for(route));
            }
        });
    });
    g.finish();
}

criterion_group!(benches, bench_cache_hit, bench_forced_refresh, bench_lock_registry);
criterion_main!(benches);
