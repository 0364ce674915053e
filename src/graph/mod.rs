//! Graph collaborator for the Pregel engine
//!
//! The engine only needs a read-only view: how many nodes exist, and the
//! relationships of a node in a given direction. [`CsrGraph`] is an
//! in-memory implementation built with [`GraphBuilder`].

mod csr;

pub use csr::{CsrGraph, GraphBuilder};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which relationships of a node to enumerate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Relationships that start at the node
    #[default]
    Outgoing,
    /// Relationships that end at the node
    Incoming,
    /// Outgoing relationships followed by incoming ones
    Both,
}

/// Read-only graph with dense node ids `0..node_count()`
pub trait Graph: Send + Sync {
    /// Number of nodes
    fn node_count(&self) -> usize;

    /// Visit the relationships of `node_id` in `direction`
    ///
    /// The visitor receives `(source, target, weight)` where `source` is
    /// always `node_id` and `target` is the node at the other end. Returning
    /// `false` stops the iteration.
    fn for_each_relationship(
        &self,
        node_id: usize,
        direction: Direction,
        visitor: &mut dyn FnMut(usize, usize, f64) -> bool,
    );

    /// Number of relationships of `node_id` in `direction`
    fn degree(&self, node_id: usize, direction: Direction) -> usize {
        let mut degree = 0;
        self.for_each_relationship(node_id, direction, &mut |_, _, _| {
            degree += 1;
            true
        });
        degree
    }
}

/// Errors raised while building a graph
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    /// A relationship references a node id that does not exist
    #[error("Node {node_id} out of range for graph with {node_count} nodes")]
    NodeOutOfRange { node_id: usize, node_count: usize },

    /// A relationship weight is NaN
    #[error("Relationship ({source_id})->({target_id}) has a NaN weight")]
    InvalidWeight { source_id: usize, target_id: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ring(usize);

    impl Graph for Ring {
        fn node_count(&self) -> usize {
            self.0
        }

        fn for_each_relationship(
            &self,
            node_id: usize,
            direction: Direction,
            visitor: &mut dyn FnMut(usize, usize, f64) -> bool,
        ) {
            let next = (node_id + 1) % self.0;
            let prev = (node_id + self.0 - 1) % self.0;
            match direction {
                Direction::Outgoing => {
                    visitor(node_id, next, 1.0);
                }
                Direction::Incoming => {
                    visitor(node_id, prev, 1.0);
                }
                Direction::Both => {
                    if visitor(node_id, next, 1.0) {
                        visitor(node_id, prev, 1.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_default_degree_counts_relationships() {
        let ring = Ring(5);
        assert_eq!(ring.degree(0, Direction::Outgoing), 1);
        assert_eq!(ring.degree(0, Direction::Incoming), 1);
        assert_eq!(ring.degree(0, Direction::Both), 2);
    }

    #[test]
    fn test_direction_default() {
        assert_eq!(Direction::default(), Direction::Outgoing);
    }

    #[test]
    fn test_graph_error_display() {
        let err = GraphError::NodeOutOfRange {
            node_id: 12,
            node_count: 10,
        };
        assert_eq!(err.to_string(), "Node 12 out of range for graph with 10 nodes");
    }
}
