//! pregel-core: bulk-synchronous, vertex-centric graph computation
//!
//! A user-supplied [`Computation`](pregel::Computation) runs over every node
//! of a [`Graph`](graph::Graph), superstep by superstep, exchanging messages
//! along relationships until no node is active and no message is in flight,
//! or until the iteration budget is spent.
//!
//! - `graph`: read-only graph interface and an in-memory CSR implementation
//! - `pregel`: value store, message store, vertex contract, superstep executor
//! - `algorithms`: PageRank and minimum-label component propagation
//!
//! ```rust
//! use std::sync::Arc;
//! use pregel_core::algorithms::MinLabelComponents;
//! use pregel_core::graph::CsrGraph;
//! use pregel_core::pregel::{Pregel, PregelConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let graph = Arc::new(CsrGraph::from_edges(4, [(0, 1), (2, 3)])?);
//! let config = PregelConfig::default().with_max_iterations(10);
//!
//! let result = Pregel::new(graph, config, MinLabelComponents::new())?.run_blocking()?;
//! assert_eq!(result.node_values, vec![0.0, 0.0, 2.0, 2.0]);
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod graph;
pub mod pregel;

// Re-exports for convenience
pub use graph::{CsrGraph, Direction, Graph, GraphBuilder, GraphError};
pub use pregel::{
    Computation, ComputeContext, MessageCombiner, Messages, Pregel, PregelConfig, PregelError,
    PregelResult,
};
