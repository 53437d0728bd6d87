//! # Interop Benchmarks
//!
//! | Component | Question | Expectation |
//! |-----------|----------|-------------|
//! | Swap registry | Sharded vs single exclusive lock under contention | Sharded scales with threads |
//! | Hash-lock | Secret verification cost | Sub-microsecond |
//! | Bridge | Transfer initiation (attest + sealed ledger write) | Dominated by sealing |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qc_15_interop::{
    create_hash_lock, verify_secret, AtomicSwapApi, AtomicSwapEngine, BridgeApi,
    BridgeTransferManager, ChainId, Collaborators, InMemoryLedger, InteropConfig, ManualClock,
    ShardedRegistry, SwapLeg, ThresholdValidatorSet, TransferTerms, XChaChaSealer,
};
use std::sync::Arc;
use std::time::Duration;

const T0: u64 = 1_700_000_000;
const THREADS: usize = 8;
const SWAPS_PER_THREAD: usize = 64;

fn collaborators() -> Collaborators {
    let keys = (0..4u8).map(|i| [0x30 + i; 32]).collect();
    Collaborators::new(
        Arc::new(InMemoryLedger::new()),
        Arc::new(ThresholdValidatorSet::with_keys(keys, 3, 4096).unwrap()),
        Arc::new(XChaChaSealer::from_master_key(&[0x42; 32]).unwrap()),
        Arc::new(ManualClock::new(T0)),
    )
}

fn config(shards: usize) -> InteropConfig {
    InteropConfig {
        registry_shards: shards,
        ..InteropConfig::with_chains(["x", "y"])
    }
}

// ============================================================================
// SWAP REGISTRY: SHARDED VS SINGLE LOCK
// ============================================================================

fn bench_swap_registry_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-15-swap-registry");
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Elements((THREADS * SWAPS_PER_THREAD) as u64));

    let hash = create_hash_lock(b"bench-secret");

    for shards in [1usize, 4, 16, 64] {
        group.bench_with_input(
            BenchmarkId::new("initiate_complete", shards),
            &shards,
            |b, &shards| {
                b.iter(|| {
                    let engine = AtomicSwapEngine::new(&config(shards), collaborators());
                    std::thread::scope(|scope| {
                        for t in 0..THREADS {
                            let engine = &engine;
                            scope.spawn(move || {
                                for i in 0..SWAPS_PER_THREAD {
                                    let id = engine
                                        .initiate(
                                            SwapLeg::new("x", "A", 1 + i as u64, "alice@x"),
                                            SwapLeg::new("y", "B", 1 + t as u64, "bob@y"),
                                            hash,
                                            T0 + 3_600,
                                            "alice",
                                        )
                                        .unwrap();
                                    engine.complete(&id, b"bench-secret", "bob").unwrap();
                                }
                            });
                        }
                    });
                    black_box(engine.len())
                })
            },
        );
    }

    group.finish();
}

fn bench_sharded_registry_raw(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-15-sharded-registry");
    let ids: Vec<String> = (0..THREADS * SWAPS_PER_THREAD)
        .map(|i| format!("swp-{:016x}", i))
        .collect();

    for shards in [1usize, 16] {
        group.bench_with_input(BenchmarkId::new("insert_parallel", shards), &shards, |b, &shards| {
            b.iter(|| {
                let registry: ShardedRegistry<u64> = ShardedRegistry::new(shards);
                std::thread::scope(|scope| {
                    for chunk in ids.chunks(SWAPS_PER_THREAD) {
                        let registry = &registry;
                        scope.spawn(move || {
                            for (i, id) in chunk.iter().enumerate() {
                                registry.lock_shard(id).insert(id.clone(), i as u64);
                            }
                        });
                    }
                });
                black_box(registry.len())
            })
        });
    }

    group.finish();
}

// ============================================================================
// HASH-LOCK
// ============================================================================

fn bench_hash_lock(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-15-hash-lock");
    let secret = [7u8; 32];
    let hash = create_hash_lock(&secret);

    group.bench_function("verify_match", |b| {
        b.iter(|| black_box(verify_secret(black_box(&secret), &hash)))
    });
    group.bench_function("verify_mismatch", |b| {
        b.iter(|| black_box(verify_secret(black_box(b"wrong"), &hash)))
    });

    group.finish();
}

// ============================================================================
// BRIDGE
// ============================================================================

fn bench_bridge_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-15-bridge");
    let bridge = BridgeTransferManager::new(&config(1), collaborators());
    bridge.add_funds("SYN", u64::MAX / 2).unwrap();
    let terms = TransferTerms {
        from_chain: ChainId::new("x"),
        to_chain: ChainId::new("y"),
        amount: 1,
        token_symbol: "SYN".to_string(),
        from_address: "alice@x".to_string(),
        to_address: "bob@y".to_string(),
    };

    group.bench_function("initiate_transfer", |b| {
        b.iter(|| black_box(bridge.initiate_transfer(terms.clone()).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_swap_registry_contention,
    bench_sharded_registry_raw,
    bench_hash_lock,
    bench_bridge_transfer
);
criterion_main!(benches);
