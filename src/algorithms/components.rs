//! Minimum-label component propagation
//!
//! Every node starts with its own id as label and repeatedly adopts the
//! smallest label it hears about, forwarding it only when it changes. The
//! update is monotone and idempotent, so the program is correct under both
//! synchronous and asynchronous delivery and under any interleaving.

use crate::graph::Direction;
use crate::pregel::{Computation, ComputeContext, MessageCombiner, Messages, PregelError};

/// Label propagation that converges to the minimum node id per component
#[derive(Debug, Clone, Copy)]
pub struct MinLabelComponents {
    direction: Direction,
}

impl MinLabelComponents {
    /// Propagate along relationships in both directions
    pub fn new() -> Self {
        Self {
            direction: Direction::Both,
        }
    }

    /// Propagate only along `direction`
    pub fn with_direction(direction: Direction) -> Self {
        Self { direction }
    }
}

impl Default for MinLabelComponents {
    fn default() -> Self {
        Self::new()
    }
}

impl Computation for MinLabelComponents {
    fn compute(&self, ctx: &mut ComputeContext<'_>, messages: Messages) -> Result<(), PregelError> {
        if ctx.is_initial_superstep() {
            let label = ctx.node_id() as f64;
            ctx.set_value(label);
            ctx.send_to_neighbors(label);
        } else {
            let current = ctx.value();
            let smallest = messages.fold(current, f64::min);
            if smallest < current {
                ctx.set_value(smallest);
                ctx.send_to_neighbors(smallest);
            }
        }
        ctx.vote_to_halt();
        Ok(())
    }

    fn combiner(&self) -> MessageCombiner {
        MessageCombiner::Min
    }

    fn relationship_direction(&self) -> Direction {
        self.direction
    }
}
