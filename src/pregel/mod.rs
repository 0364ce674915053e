//! Pregel Runtime for vertex-centric graph computation
//!
//! This module implements a bulk-synchronous, Pregel-style engine.
//! Key concepts:
//!
//! - **Computation**: per-vertex program, invoked once per active node per superstep
//! - **Superstep**: one round; all active nodes compute, then a barrier
//! - **Message generation**: *current* (read this round) and *next* (written this round)
//! - **Combiner**: merges concurrent messages to the same node
//! - **Vote to halt**: a node sleeps until a message wakes it
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Pregel                              │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐                      │
//! │  │Superstep│→ │Superstep│→ │Superstep│→ ...                 │
//! │  │    0    │  │    1    │  │    2    │                      │
//! │  └─────────┘  └─────────┘  └─────────┘                      │
//! │       │            │            │                           │
//! │       ▼            ▼            ▼                           │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │ Per-Superstep: Dispatch → Compute → Await → Swap    │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Delivery Modes
//!
//! - Synchronous (default): messages sent in superstep `s` are read in `s + 1`.
//! - Asynchronous (`PregelConfig::with_asynchronous(true)`): messages are also
//!   visible to nodes computed later in the same superstep. Only suitable for
//!   monotone, idempotent programs such as minimum-label propagation.

pub mod config;
pub mod error;
pub mod message;
pub mod node_values;
pub mod partition;
pub mod runtime;
pub mod vertex;

// Re-exports
pub use config::PregelConfig;
pub use error::PregelError;
pub use message::{MessageCombiner, MessageStore, Messages};
pub use node_values::NodeValues;
pub use partition::{partition, Batch};
pub use runtime::{CancellationHandle, Pregel, PregelResult};
pub use vertex::{Computation, ComputeContext, FnComputation, HaltedBits};
