//! Compressed sparse row graph
//!
//! Outgoing and incoming adjacency are both materialized, each sorted by
//! neighbour id, so every direction is a contiguous slice scan.

use super::{Direction, Graph, GraphError};

/// One direction of adjacency in CSR form
#[derive(Debug, Clone, Default)]
struct Adjacency {
    offsets: Vec<usize>,
    targets: Vec<usize>,
    weights: Vec<f64>,
}

impl Adjacency {
    /// `entries` are `(node, neighbour, weight)` triples
    fn build(node_count: usize, mut entries: Vec<(usize, usize, f64)>) -> Self {
        entries.sort_by_key(|&(node, neighbour, _)| (node, neighbour));

        let mut offsets = vec![0; node_count + 1];
        for &(node, _, _) in &entries {
            offsets[node + 1] += 1;
        }
        for i in 0..node_count {
            offsets[i + 1] += offsets[i];
        }

        let (targets, weights) = entries.into_iter().map(|(_, t, w)| (t, w)).unzip();
        Self {
            offsets,
            targets,
            weights,
        }
    }

    fn range(&self, node_id: usize) -> std::ops::Range<usize> {
        self.offsets[node_id]..self.offsets[node_id + 1]
    }

    fn degree(&self, node_id: usize) -> usize {
        self.range(node_id).len()
    }

    /// Returns false if the visitor stopped the iteration
    fn visit(&self, node_id: usize, visitor: &mut dyn FnMut(usize, usize, f64) -> bool) -> bool {
        for i in self.range(node_id) {
            if !visitor(node_id, self.targets[i], self.weights[i]) {
                return false;
            }
        }
        true
    }
}

/// Immutable in-memory graph
#[derive(Debug, Clone)]
pub struct CsrGraph {
    node_count: usize,
    outgoing: Adjacency,
    incoming: Adjacency,
}

impl CsrGraph {
    /// Build an unweighted graph from `(source, target)` pairs
    pub fn from_edges(
        node_count: usize,
        edges: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, GraphError> {
        GraphBuilder::new(node_count).relationships(edges).build()
    }

    /// Number of stored relationships
    pub fn relationship_count(&self) -> usize {
        self.outgoing.targets.len()
    }

    /// Weight of the first stored `(source)->(target)` relationship
    pub fn weight_of(&self, source: usize, target: usize) -> Option<f64> {
        let range = self.outgoing.range(source);
        let targets = &self.outgoing.targets[range.clone()];
        targets
            .binary_search(&target)
            .ok()
            .map(|found| {
                // binary_search may land on any duplicate; walk back to the first
                let mut first = found;
                while first > 0 && targets[first - 1] == target {
                    first -= 1;
                }
                self.outgoing.weights[range.start + first]
            })
    }
}

impl Graph for CsrGraph {
    fn node_count(&self) -> usize {
        self.node_count
    }

    fn for_each_relationship(
        &self,
        node_id: usize,
        direction: Direction,
        visitor: &mut dyn FnMut(usize, usize, f64) -> bool,
    ) {
        match direction {
            Direction::Outgoing => {
                self.outgoing.visit(node_id, visitor);
            }
            Direction::Incoming => {
                self.incoming.visit(node_id, visitor);
            }
            Direction::Both => {
                if self.outgoing.visit(node_id, visitor) {
                    self.incoming.visit(node_id, visitor);
                }
            }
        }
    }

    fn degree(&self, node_id: usize, direction: Direction) -> usize {
        match direction {
            Direction::Outgoing => self.outgoing.degree(node_id),
            Direction::Incoming => self.incoming.degree(node_id),
            Direction::Both => self.outgoing.degree(node_id) + self.incoming.degree(node_id),
        }
    }
}

/// Builder for [`CsrGraph`]
///
/// # Example
///
/// ```
/// use pregel_core::graph::{Direction, Graph, GraphBuilder};
///
/// let graph = GraphBuilder::new(3)
///     .weighted_relationship(0, 1, 2.5)
///     .relationship(1, 2)
///     .build()
///     .unwrap();
///
/// assert_eq!(graph.degree(1, Direction::Both), 2);
/// assert_eq!(graph.weight_of(1, 2), Some(1.0));
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    node_count: usize,
    default_weight: f64,
    relationships: Vec<(usize, usize, Option<f64>)>,
}

impl GraphBuilder {
    /// Start a graph with `node_count` nodes and no relationships
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            default_weight: 1.0,
            relationships: Vec::new(),
        }
    }

    /// Weight given to relationships added without one (default `1.0`)
    pub fn default_weight(mut self, weight: f64) -> Self {
        self.default_weight = weight;
        self
    }

    /// Add an unweighted `(source)->(target)` relationship
    pub fn relationship(mut self, source: usize, target: usize) -> Self {
        self.relationships.push((source, target, None));
        self
    }

    /// Add a weighted `(source)->(target)` relationship
    pub fn weighted_relationship(mut self, source: usize, target: usize, weight: f64) -> Self {
        self.relationships.push((source, target, Some(weight)));
        self
    }

    /// Add many unweighted relationships
    pub fn relationships(mut self, edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        self.relationships
            .extend(edges.into_iter().map(|(s, t)| (s, t, None)));
        self
    }

    /// Validate ids and weights and materialize both adjacency directions
    pub fn build(self) -> Result<CsrGraph, GraphError> {
        let node_count = self.node_count;
        let mut outgoing = Vec::with_capacity(self.relationships.len());
        let mut incoming = Vec::with_capacity(self.relationships.len());

        for (source, target, weight) in self.relationships {
            for node_id in [source, target] {
                if node_id >= node_count {
                    return Err(GraphError::NodeOutOfRange {
                        node_id,
                        node_count,
                    });
                }
            }
            let weight = weight.unwrap_or(self.default_weight);
            if weight.is_nan() {
                return Err(GraphError::InvalidWeight {
                    source_id: source,
                    target_id: target,
                });
            }
            outgoing.push((source, target, weight));
            incoming.push((target, source, weight));
        }

        Ok(CsrGraph {
            node_count,
            outgoing: Adjacency::build(node_count, outgoing),
            incoming: Adjacency::build(node_count, incoming),
        })
    }
}
