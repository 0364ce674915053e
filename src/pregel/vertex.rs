//! Vertex compute contract
//!
//! A [`Computation`] is invoked once per active node per superstep. Its only
//! side effects go through the [`ComputeContext`]: replacing the node's own
//! value, sending messages, and voting to halt. No other node's value or
//! message slot is reachable, which is what lets batches run in parallel
//! without locking the value store.

use std::sync::atomic::{AtomicU64, Ordering};

use super::error::PregelError;
use super::message::{MessageCombiner, MessageStore, Messages};
use super::node_values::NodeValues;
use crate::graph::{Direction, Graph};

/// The per-vertex program executed every superstep
///
/// # Example
///
/// ```
/// use pregel_core::pregel::{Computation, ComputeContext, MessageCombiner, Messages, PregelError};
///
/// /// Every node ends with the largest value among its in-neighbours.
/// struct MaxValue;
///
/// impl Computation for MaxValue {
///     fn combiner(&self) -> MessageCombiner {
///         MessageCombiner::Max
///     }
///
///     fn compute(&self, ctx: &mut ComputeContext<'_>, messages: Messages) -> Result<(), PregelError> {
///         if ctx.is_initial_superstep() {
///             ctx.send_to_neighbors(ctx.value());
///         } else if let Some(max) = messages.max_by(f64::total_cmp) {
///             if max > ctx.value() {
///                 ctx.set_value(max);
///                 ctx.send_to_neighbors(max);
///             }
///         }
///         ctx.vote_to_halt();
///         Ok(())
///     }
/// }
/// ```
pub trait Computation: Send + Sync + 'static {
    /// Run the program for `ctx.node_id()` with the messages delivered to it
    ///
    /// Returning an error aborts the superstep and the whole run.
    fn compute(&self, ctx: &mut ComputeContext<'_>, messages: Messages) -> Result<(), PregelError>;

    /// How concurrent messages to the same node are merged
    ///
    /// Defaults to keeping every message.
    fn combiner(&self) -> MessageCombiner {
        MessageCombiner::List
    }

    /// Relationships followed by [`ComputeContext::send_to_neighbors`]
    fn relationship_direction(&self) -> Direction {
        Direction::Outgoing
    }
}

impl<C: Computation + ?Sized> Computation for std::sync::Arc<C> {
    fn compute(&self, ctx: &mut ComputeContext<'_>, messages: Messages) -> Result<(), PregelError> {
        (**self).compute(ctx, messages)
    }

    fn combiner(&self) -> MessageCombiner {
        (**self).combiner()
    }

    fn relationship_direction(&self) -> Direction {
        (**self).relationship_direction()
    }
}

/// Adapter turning a closure into a [`Computation`]
///
/// ```
/// use pregel_core::pregel::{FnComputation, MessageCombiner};
///
/// let halt_immediately = FnComputation::new(MessageCombiner::Sum, |ctx, _messages| {
///     ctx.vote_to_halt();
///     Ok(())
/// });
/// ```
pub struct FnComputation<F> {
    combiner: MessageCombiner,
    direction: Direction,
    compute: F,
}

impl<F> FnComputation<F>
where
    F: Fn(&mut ComputeContext<'_>, Messages) -> Result<(), PregelError> + Send + Sync + 'static,
{
    /// Wrap `compute`, following outgoing relationships
    pub fn new(combiner: MessageCombiner, compute: F) -> Self {
        Self {
            combiner,
            direction: Direction::Outgoing,
            compute,
        }
    }

    /// Follow `direction` when sending to neighbours
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

impl<F> Computation for FnComputation<F>
where
    F: Fn(&mut ComputeContext<'_>, Messages) -> Result<(), PregelError> + Send + Sync + 'static,
{
    fn compute(&self, ctx: &mut ComputeContext<'_>, messages: Messages) -> Result<(), PregelError> {
        (self.compute)(ctx, messages)
    }

    fn combiner(&self) -> MessageCombiner {
        self.combiner
    }

    fn relationship_direction(&self) -> Direction {
        self.direction
    }
}

/// One halted bit per node
///
/// A node's bit is written only by the task computing that node; bits of
/// different nodes may share a word, so updates use atomic `fetch_or` and
/// `fetch_and`.
#[derive(Debug)]
pub struct HaltedBits {
    words: Box<[AtomicU64]>,
}

impl HaltedBits {
    /// All nodes active
    pub fn new(node_count: usize) -> Self {
        Self {
            words: (0..node_count.div_ceil(64)).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    #[inline]
    fn locate(node_id: usize) -> (usize, u64) {
        (node_id / 64, 1u64 << (node_id % 64))
    }

    /// Whether `node_id` voted to halt in its last invocation
    pub fn is_halted(&self, node_id: usize) -> bool {
        let (word, mask) = Self::locate(node_id);
        self.words[word].load(Ordering::Relaxed) & mask != 0
    }

    /// Mark `node_id` halted
    pub fn halt(&self, node_id: usize) {
        let (word, mask) = Self::locate(node_id);
        self.words[word].fetch_or(mask, Ordering::Relaxed);
    }

    /// Mark `node_id` active
    pub fn activate(&self, node_id: usize) {
        let (word, mask) = Self::locate(node_id);
        self.words[word].fetch_and(!mask, Ordering::Relaxed);
    }
}

/// Capabilities handed to a [`Computation`] for one node invocation
pub struct ComputeContext<'a> {
    node_id: usize,
    superstep: usize,
    graph: &'a dyn Graph,
    direction: Direction,
    values: &'a NodeValues,
    messages: &'a MessageStore,
    voted_to_halt: bool,
}

impl<'a> ComputeContext<'a> {
    pub(crate) fn new(
        node_id: usize,
        superstep: usize,
        graph: &'a dyn Graph,
        direction: Direction,
        values: &'a NodeValues,
        messages: &'a MessageStore,
    ) -> Self {
        Self {
            node_id,
            superstep,
            graph,
            direction,
            values,
            messages,
            voted_to_halt: false,
        }
    }

    /// Id of the node being computed
    pub fn node_id(&self) -> usize {
        self.node_id
    }

    /// Current superstep (0-indexed)
    pub fn superstep(&self) -> usize {
        self.superstep
    }

    /// Check if this is the first superstep
    pub fn is_initial_superstep(&self) -> bool {
        self.superstep == 0
    }

    /// Number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Current value of this node
    pub fn value(&self) -> f64 {
        self.values.get(self.node_id)
    }

    /// Replace the value of this node
    pub fn set_value(&mut self, value: f64) {
        self.values.set(self.node_id, value);
    }

    /// Number of relationships in the computation's direction
    pub fn degree(&self) -> usize {
        self.graph.degree(self.node_id, self.direction)
    }

    /// Send `value` to an arbitrary node
    ///
    /// # Panics
    ///
    /// Panics if `target` is not a node id of the graph.
    pub fn send_message(&mut self, target: usize, value: f64) {
        assert!(
            target < self.graph.node_count(),
            "message target {target} out of range for graph with {} nodes",
            self.graph.node_count()
        );
        self.messages.send(target, value);
    }

    /// Send `value` to every neighbour in the computation's direction
    pub fn send_to_neighbors(&mut self, value: f64) {
        let messages = self.messages;
        self.graph
            .for_each_relationship(self.node_id, self.direction, &mut |_, target, _| {
                messages.send(target, value);
                true
            });
    }

    /// Visit `(target, weight)` of every neighbour in the computation's direction
    pub fn for_each_neighbor(&self, mut visitor: impl FnMut(usize, f64)) {
        self.graph
            .for_each_relationship(self.node_id, self.direction, &mut |_, target, weight| {
                visitor(target, weight);
                true
            });
    }

    /// Declare that this node has nothing to do until a message arrives
    pub fn vote_to_halt(&mut self) {
        self.voted_to_halt = true;
    }

    /// Whether [`vote_to_halt`](Self::vote_to_halt) was called
    pub fn has_voted_to_halt(&self) -> bool {
        self.voted_to_halt
    }
}
