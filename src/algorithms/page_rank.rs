//! PageRank as a vertex program
//!
//! Superstep 0 only distributes the seeded rank. Every later superstep sets
//! `rank = (1 - d) / n + d * sum(incoming)` and sends `rank / out_degree`
//! along outgoing relationships. Nodes never vote to halt, so the run lasts
//! exactly `max_iterations` supersteps.

use crate::pregel::{Computation, ComputeContext, MessageCombiner, Messages, PregelError};

/// PageRank with a fixed damping factor
///
/// The teleport term uses the node count of the graph being run.
#[derive(Debug, Clone, Copy)]
pub struct PageRank {
    damping_factor: f64,
}

impl PageRank {
    /// Create a PageRank program
    pub fn new(damping_factor: f64) -> Self {
        Self { damping_factor }
    }

    /// Probability of following a relationship rather than jumping
    pub fn damping_factor(&self) -> f64 {
        self.damping_factor
    }
}

impl Computation for PageRank {
    fn compute(&self, ctx: &mut ComputeContext<'_>, messages: Messages) -> Result<(), PregelError> {
        let mut rank = ctx.value();

        if !ctx.is_initial_superstep() {
            let sum: f64 = messages.sum();
            let teleport = (1.0 - self.damping_factor) / ctx.node_count() as f64;
            rank = teleport + self.damping_factor * sum;
            ctx.set_value(rank);
        }

        let degree = ctx.degree();
        if degree > 0 {
            ctx.send_to_neighbors(rank / degree as f64);
        }
        Ok(())
    }

    fn combiner(&self) -> MessageCombiner {
        MessageCombiner::Sum
    }
}
