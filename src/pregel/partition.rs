//! Batch partitioning of the node id space
//!
//! `[0, node_count)` is split into contiguous, non-overlapping batches of
//! `batch_size` ids; the final batch may be shorter. Batches never share an
//! id, which is what makes unsynchronized node value writes safe.

use std::ops::Range;

/// Half-open node id range `[start, end)` processed by one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Batch {
    start: usize,
    end: usize,
}

impl Batch {
    /// Create a batch covering `[start, end)`
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "batch start {start} after end {end}");
        Self { start, end }
    }

    /// First node id in the batch
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last node id in the batch
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of node ids in the batch
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the batch covers no ids
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Node ids in the batch
    pub fn node_ids(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Split `[0, node_count)` into `ceil(node_count / batch_size)` batches
///
/// # Panics
///
/// Panics if `batch_size` is zero; the run controller rejects that
/// configuration before partitioning.
pub fn partition(node_count: usize, batch_size: usize) -> Vec<Batch> {
    assert!(batch_size > 0, "batch_size must be at least 1");
    (0..node_count)
        .step_by(batch_size)
        .map(|start| Batch::new(start, start.saturating_add(batch_size).min(node_count)))
        .collect()
}
