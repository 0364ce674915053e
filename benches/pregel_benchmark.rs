//! Pregel Runtime Benchmarks
//!
//! Self-contained benchmarks over deterministic pseudo-random graphs.
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench pregel_benchmark
//! cargo bench --bench pregel_benchmark -- page_rank
//! ```

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pregel_core::algorithms::{MinLabelComponents, PageRank};
use pregel_core::graph::CsrGraph;
use pregel_core::pregel::{Pregel, PregelConfig};

const SEED: u64 = 42;
const AVERAGE_DEGREE: usize = 8;

/// Sparse random graph with `node_count * AVERAGE_DEGREE` relationships
fn random_graph(node_count: usize) -> Arc<CsrGraph> {
    let mut state = SEED;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % node_count as u64) as usize
    };
    let edges: Vec<(usize, usize)> = (0..node_count * AVERAGE_DEGREE)
        .map(|_| (next(), next()))
        .collect();
    Arc::new(CsrGraph::from_edges(node_count, edges).unwrap())
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

// =============================================================================
// PageRank
// =============================================================================

fn bench_page_rank(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("page_rank");
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(3));
    group.sample_size(10);

    for node_count in [10_000, 100_000] {
        let graph = random_graph(node_count);
        group.throughput(Throughput::Elements(node_count as u64));
        group.bench_with_input(
            BenchmarkId::new("20_supersteps", node_count),
            &graph,
            |b, graph| {
                b.to_async(&rt).iter(|| async {
                    let config = PregelConfig::default().with_max_iterations(20);
                    let pregel = Pregel::with_default_node_values(
                        Arc::clone(graph),
                        config,
                        PageRank::new(0.85),
                    )
                    .unwrap();
                    black_box(pregel.run().await.unwrap())
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// Components: synchronous vs asynchronous delivery
// =============================================================================

fn bench_components(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("components");
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(3));
    group.sample_size(10);

    let node_count = 100_000;
    let graph = random_graph(node_count);
    group.throughput(Throughput::Elements(node_count as u64));

    for asynchronous in [false, true] {
        let name = if asynchronous { "async" } else { "sync" };
        group.bench_with_input(BenchmarkId::new(name, node_count), &graph, |b, graph| {
            b.to_async(&rt).iter(|| async {
                let config = PregelConfig::default()
                    .with_asynchronous(asynchronous)
                    .with_max_iterations(node_count);
                let pregel =
                    Pregel::new(Arc::clone(graph), config, MinLabelComponents::new()).unwrap();
                black_box(pregel.run().await.unwrap())
            });
        });
    }

    group.finish();
}

// =============================================================================
// Batch size sweep
// =============================================================================

fn bench_batch_size(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("batch_size");
    group.sample_size(10);

    let node_count = 50_000;
    let graph = random_graph(node_count);

    for batch_size in [100, 1_000, 10_000, 50_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &batch_size,
            |b, &batch_size| {
                b.to_async(&rt).iter(|| async {
                    let config = PregelConfig::default()
                        .with_batch_size(batch_size)
                        .with_max_iterations(10);
                    let pregel = Pregel::with_default_node_values(
                        Arc::clone(&graph),
                        config,
                        PageRank::new(0.85),
                    )
                    .unwrap();
                    black_box(pregel.run().await.unwrap())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_page_rank, bench_components, bench_batch_size);
criterion_main!(benches);
