//! Integration Tests for minimum-label component propagation
//!
//! Graph: a 4-cycle {A, B, C, D}, a 3-cycle {E, F, G}, a mutual pair {H, I}
//! and an isolated node {J}, with ids 0..=9 in that order.

use std::sync::Arc;

use pregel_core::algorithms::MinLabelComponents;
use pregel_core::graph::{CsrGraph, Direction, GraphBuilder};
use pregel_core::pregel::{Pregel, PregelConfig};

const EXPECTED: [f64; 10] = [0.0, 0.0, 0.0, 0.0, 4.0, 4.0, 4.0, 7.0, 7.0, 9.0];

fn component_graph() -> CsrGraph {
    GraphBuilder::new(10)
        // relationships carry a message property of 1 in the fixture
        .default_weight(1.0)
        // {A, B, C, D}
        .relationships([(0, 1), (1, 2), (2, 3), (3, 0)])
        // {E, F, G}
        .relationships([(4, 5), (5, 6), (6, 4)])
        // {H, I}
        .relationships([(8, 7), (7, 8)])
        .build()
        .expect("valid graph")
}

#[tokio::test]
async fn test_components_synchronous() -> anyhow::Result<()> {
    let config = PregelConfig::default()
        .with_batch_size(10)
        .with_max_iterations(10);

    let result = Pregel::new(Arc::new(component_graph()), config, MinLabelComponents::new())?
        .run()
        .await?;

    assert_eq!(result.node_values, EXPECTED);
    assert!(result.did_converge);
    assert!(result.ran_iterations < 10);
    Ok(())
}

#[tokio::test]
async fn test_components_outgoing_only() -> anyhow::Result<()> {
    let graph = Arc::new(CsrGraph::from_edges(3, [(2, 1), (1, 0)])?);
    let config = PregelConfig::default().with_max_iterations(10);

    let result = Pregel::new(
        graph,
        config,
        MinLabelComponents::with_direction(Direction::Outgoing),
    )?
    .run()
    .await?;

    // labels flow 2 -> 1 -> 0; nothing smaller ever reaches 1 or 2
    assert_eq!(result.node_values, vec![0.0, 1.0, 2.0]);
    Ok(())
}

#[tokio::test]
async fn test_components_asynchronous_invariant_to_parallelism() {
    for (batch_size, concurrency) in [(1, 1), (1, 4), (2, 3), (3, 8), (10, 1), (64, 2)] {
        let config = PregelConfig::default()
            .with_asynchronous(true)
            .with_batch_size(batch_size)
            .with_concurrency(concurrency)
            .with_max_iterations(10);

        let result = Pregel::new(Arc::new(component_graph()), config, MinLabelComponents::new())
            .expect("valid config")
            .run()
            .await
            .expect("run succeeds");

        assert_eq!(
            result.node_values, EXPECTED,
            "batch_size={batch_size} concurrency={concurrency}"
        );
        assert!(result.did_converge);
    }
}

#[tokio::test]
async fn test_components_deterministic_across_runs() {
    let mut first: Option<Vec<u64>> = None;
    for _ in 0..10 {
        let config = PregelConfig::default()
            .with_batch_size(2)
            .with_concurrency(4)
            .with_max_iterations(10);
        let result = Pregel::new(Arc::new(component_graph()), config, MinLabelComponents::new())
            .expect("valid config")
            .run()
            .await
            .expect("run succeeds");

        let bits: Vec<u64> = result.node_values.iter().map(|v| v.to_bits()).collect();
        match &first {
            Some(expected) => assert_eq!(&bits, expected),
            None => first = Some(bits),
        }
    }
}

#[tokio::test]
async fn test_larger_random_graph_matches_between_modes() {
    // deterministic pseudo-random sparse graph
    let node_count = 2_000;
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % node_count as u64) as usize
    };
    let edges: Vec<(usize, usize)> = (0..1_500).map(|_| (next(), next())).collect();
    let graph = Arc::new(CsrGraph::from_edges(node_count, edges).expect("valid graph"));

    let run = |asynchronous: bool, batch_size: usize| {
        let graph = Arc::clone(&graph);
        async move {
            let config = PregelConfig::default()
                .with_asynchronous(asynchronous)
                .with_batch_size(batch_size)
                .with_concurrency(4)
                .with_max_iterations(node_count);
            Pregel::new(graph, config, MinLabelComponents::new())
                .expect("valid config")
                .run()
                .await
                .expect("run succeeds")
        }
    };

    let sync = run(false, 128).await;
    let asynchronous = run(true, 37).await;
    assert!(sync.did_converge);
    assert!(asynchronous.did_converge);
    assert_eq!(sync.node_values, asynchronous.node_values);
    // every label is the id of some node in the same component, never larger
    for (node_id, label) in sync.node_values.iter().enumerate() {
        assert!(*label <= node_id as f64);
    }
}

#[tokio::test]
async fn test_asynchronous_delivery_shortens_a_chain() -> anyhow::Result<()> {
    // 0 -> 1 -> ... -> 9, one batch, one worker: node i + 1 is computed after
    // node i within every superstep
    let node_count = 10;
    let graph = Arc::new(CsrGraph::from_edges(
        node_count,
        (0..node_count - 1).map(|i| (i, i + 1)),
    )?);

    let run = |asynchronous: bool| {
        let graph = Arc::clone(&graph);
        async move {
            let config = PregelConfig::default()
                .with_asynchronous(asynchronous)
                .with_batch_size(node_count)
                .with_concurrency(1)
                .with_max_iterations(50);
            Pregel::new(
                graph,
                config,
                MinLabelComponents::with_direction(Direction::Outgoing),
            )?
            .run()
            .await
        }
    };

    let sync = run(false).await?;
    let asynchronous = run(true).await?;

    assert_eq!(sync.node_values, vec![0.0; node_count]);
    assert_eq!(asynchronous.node_values, vec![0.0; node_count]);
    assert!(sync.did_converge);
    assert!(asynchronous.did_converge);

    // synchronous delivery moves the label one hop per superstep
    assert_eq!(sync.ran_iterations, node_count);
    // a label sent in superstep 1 reaches the end of the chain in that same superstep
    assert!(
        asynchronous.ran_iterations <= 3,
        "asynchronous run took {} supersteps",
        asynchronous.ran_iterations
    );
    Ok(())
}
