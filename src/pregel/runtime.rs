//! Pregel Runtime - superstep executor and run controller
//!
//! The runtime executes a [`Computation`] through barrier-synchronized
//! supersteps. Each superstep follows the sequence:
//! Dispatch batches → Compute → Await all → Swap generations → Halting check.

use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::time::Instant;
use tracing::Instrument;

use super::config::PregelConfig;
use super::error::PregelError;
use super::message::{MessageStore, Messages};
use super::node_values::NodeValues;
use super::partition::{partition, Batch};
use super::vertex::{Computation, ComputeContext, HaltedBits};
use crate::graph::{Direction, Graph};

/// Per-node seed function
type SeedFn = Box<dyn Fn(usize) -> f64 + Send + Sync>;

/// Result of a Pregel run
#[derive(Debug, Clone, PartialEq)]
pub struct PregelResult {
    /// Final value of every node, indexed by node id
    pub node_values: Vec<f64>,
    /// Number of supersteps executed
    pub ran_iterations: usize,
    /// Whether the run stopped because no node was active and no message was
    /// pending, rather than by exhausting `max_iterations`
    pub did_converge: bool,
}

impl PregelResult {
    /// Final value of `node_id`
    ///
    /// # Panics
    ///
    /// Panics if `node_id` is out of range.
    pub fn value(&self, node_id: usize) -> f64 {
        self.node_values[node_id]
    }

    /// Consume the result and return the node values
    pub fn into_values(self) -> Vec<f64> {
        self.node_values
    }
}

/// Requests that a run stop at its next superstep barrier
///
/// In-flight batch tasks always run to completion first; the run then
/// returns [`PregelError::Cancelled`] and no partial values.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancellationHandle {
    /// Ask the run to stop
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

/// State shared by every batch task of a run
struct SharedState<G, C> {
    graph: Arc<G>,
    computation: Arc<C>,
    direction: Direction,
    values: NodeValues,
    messages: MessageStore,
    halted: HaltedBits,
}

/// Counters produced by batch tasks
#[derive(Debug, Default, Clone, Copy)]
struct SuperstepStats {
    /// Nodes whose program was invoked
    computed: usize,
    /// Invoked nodes that did not vote to halt
    active: usize,
}

impl SuperstepStats {
    fn merge(&mut self, other: SuperstepStats) {
        self.computed += other.computed;
        self.active += other.active;
    }
}

impl<G, C> SharedState<G, C>
where
    G: Graph + 'static,
    C: Computation,
{
    /// Run the vertex program for every active node of `batch`
    fn compute_batch(&self, batch: Batch, superstep: usize) -> Result<SuperstepStats, PregelError> {
        let mut stats = SuperstepStats::default();
        let graph: &dyn Graph = self.graph.as_ref();

        for node_id in batch.node_ids() {
            let incoming = if superstep == 0 {
                Messages::empty()
            } else if self.halted.is_halted(node_id) && !self.messages.has_any(node_id) {
                continue;
            } else {
                self.messages.messages(node_id)
            };

            let mut ctx = ComputeContext::new(
                node_id,
                superstep,
                graph,
                self.direction,
                &self.values,
                &self.messages,
            );
            self.computation.compute(&mut ctx, incoming)?;

            stats.computed += 1;
            if ctx.has_voted_to_halt() {
                self.halted.halt(node_id);
            } else {
                self.halted.activate(node_id);
                stats.active += 1;
            }
        }

        Ok(stats)
    }
}

/// Run-scoped state owned by the executor loop
#[derive(Debug)]
struct RunContext {
    superstep: usize,
    started: Instant,
}

/// Barrier-synchronized superstep loop
struct SuperstepExecutor<G, C> {
    shared: Arc<SharedState<G, C>>,
    batches: Vec<Batch>,
    config: PregelConfig,
    cancelled: watch::Receiver<bool>,
}

impl<G, C> SuperstepExecutor<G, C>
where
    G: Graph + 'static,
    C: Computation,
{
    async fn run(self) -> Result<PregelResult, PregelError> {
        let mut run = RunContext {
            superstep: 0,
            started: Instant::now(),
        };
        let mut did_converge = false;

        tracing::info!(
            node_count = self.shared.values.len(),
            batches = self.batches.len(),
            concurrency = self.config.concurrency,
            asynchronous = self.config.is_asynchronous,
            combiner = ?self.shared.messages.combiner(),
            "Starting Pregel run"
        );

        loop {
            let stats = match self.execute_superstep(run.superstep).await {
                Ok(stats) => stats,
                Err(e) => {
                    tracing::error!(superstep = run.superstep, error = %e, "Superstep failed");
                    return Err(e);
                }
            };

            // Barrier: every batch task of this superstep has finished.
            let pending = self.shared.messages.pending_targets();
            self.shared.messages.swap_generations();
            run.superstep += 1;

            if self.config.tracing_enabled {
                tracing::debug!(
                    superstep = run.superstep - 1,
                    computed = stats.computed,
                    active = stats.active,
                    pending_targets = pending,
                    "Superstep complete"
                );
            }

            if stats.active == 0 && pending == 0 {
                did_converge = true;
                break;
            }
            if run.superstep >= self.config.max_iterations {
                break;
            }
            if *self.cancelled.borrow() {
                tracing::warn!(superstep = run.superstep, "Pregel run cancelled");
                return Err(PregelError::Cancelled {
                    superstep: run.superstep,
                });
            }
            if let Some(timeout) = self.config.timeout {
                if run.started.elapsed() >= timeout {
                    tracing::warn!(superstep = run.superstep, ?timeout, "Pregel run timed out");
                    return Err(PregelError::Timeout(timeout));
                }
            }
        }

        tracing::info!(
            ran_iterations = run.superstep,
            did_converge,
            elapsed = ?run.started.elapsed(),
            "Pregel run finished"
        );

        Ok(PregelResult {
            node_values: self.shared.values.to_vec(),
            ran_iterations: run.superstep,
            did_converge,
        })
    }

    /// Dispatch one task per batch and wait for all of them
    async fn execute_superstep(&self, superstep: usize) -> Result<SuperstepStats, PregelError> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut handles = Vec::with_capacity(self.batches.len());
        let mut first_error = None;

        for &batch in &self.batches {
            // Permit is held by the task until it finishes
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    first_error = Some(PregelError::TaskFailed(e.to_string()));
                    break;
                }
            };
            let shared = Arc::clone(&self.shared);
            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                shared.compute_batch(batch, superstep)
            }));
        }

        // Await every task, even after a failure, so no task outlives the superstep
        let mut stats = SuperstepStats::default();
        for result in futures::future::join_all(handles).await {
            match result.map_err(PregelError::from_join_error).and_then(|r| r) {
                Ok(batch_stats) => stats.merge(batch_stats),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    }
}

/// Run controller: validates configuration, allocates stores, runs supersteps
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use pregel_core::algorithms::PageRank;
/// use pregel_core::graph::CsrGraph;
/// use pregel_core::pregel::{Pregel, PregelConfig};
///
/// let graph = Arc::new(CsrGraph::from_edges(3, [(0, 1), (1, 2), (2, 0)]).unwrap());
/// let config = PregelConfig::default().with_max_iterations(10).with_concurrency(2);
///
/// let result = Pregel::with_default_node_values(graph, config, PageRank::new(0.85))
///     .unwrap()
///     .run_blocking()
///     .unwrap();
///
/// assert_eq!(result.node_values.len(), 3);
/// assert!((result.value(0) - 1.0 / 3.0).abs() < 1e-9);
/// ```
pub struct Pregel<G, C> {
    graph: Arc<G>,
    config: PregelConfig,
    computation: Arc<C>,
    seed: Option<SeedFn>,
    cancel_sender: Arc<watch::Sender<bool>>,
    cancel_receiver: watch::Receiver<bool>,
}

impl<G, C> Pregel<G, C>
where
    G: Graph + 'static,
    C: Computation,
{
    /// Create a run, failing fast on invalid configuration
    ///
    /// Nodes are seeded from `config.initial_node_value`, or `1 / node_count`
    /// when it is unset, unless [`with_initial_values`](Self::with_initial_values)
    /// supplies a per-node seed.
    pub fn new(graph: Arc<G>, config: PregelConfig, computation: C) -> Result<Self, PregelError> {
        config.validate()?;
        let (cancel_sender, cancel_receiver) = watch::channel(false);
        Ok(Self {
            graph,
            config,
            computation: Arc::new(computation),
            seed: None,
            cancel_sender: Arc::new(cancel_sender),
            cancel_receiver,
        })
    }

    /// Create a run seeded with the default uniform node value
    pub fn with_default_node_values(
        graph: Arc<G>,
        config: PregelConfig,
        computation: C,
    ) -> Result<Self, PregelError> {
        Self::new(graph, config, computation)
    }

    /// Seed each node from `seed(node_id)` instead of the uniform default
    pub fn with_initial_values(mut self, seed: impl Fn(usize) -> f64 + Send + Sync + 'static) -> Self {
        self.seed = Some(Box::new(seed));
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &PregelConfig {
        &self.config
    }

    /// Handle that cancels this run at its next barrier
    pub fn cancellation_handle(&self) -> CancellationHandle {
        CancellationHandle {
            sender: Arc::clone(&self.cancel_sender),
        }
    }

    /// Run supersteps until convergence, `max_iterations`, or an error
    ///
    /// Batches execute on the tokio blocking pool, at most
    /// `config.concurrency` at a time.
    pub async fn run(self) -> Result<PregelResult, PregelError> {
        let node_count = self.graph.node_count();
        let span = tracing::info_span!("pregel", node_count);

        let values = NodeValues::new(node_count);
        match &self.seed {
            Some(seed) => values.fill_with(seed),
            None => {
                let value = self.config.default_node_value(node_count);
                values.fill_with(|_| value);
            }
        }

        let shared = SharedState {
            direction: self.computation.relationship_direction(),
            messages: MessageStore::new(
                node_count,
                self.computation.combiner(),
                self.config.is_asynchronous,
            ),
            halted: HaltedBits::new(node_count),
            values,
            graph: self.graph,
            computation: self.computation,
        };

        let executor = SuperstepExecutor {
            shared: Arc::new(shared),
            batches: partition(node_count, self.config.batch_size),
            config: self.config,
            cancelled: self.cancel_receiver,
        };

        executor.run().instrument(span).await
    }

    /// Run on a dedicated runtime, blocking the calling thread until done
    ///
    /// Must not be called from within an async context; use
    /// [`run`](Self::run) there.
    pub fn run_blocking(self) -> Result<PregelResult, PregelError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .max_blocking_threads(self.config.concurrency)
            .build()?;
        runtime.block_on(self.run())
    }
}
