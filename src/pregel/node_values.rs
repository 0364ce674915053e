//! Per-node value storage
//!
//! A preallocated array of `f64` slots addressed by dense node id. Slots are
//! stored as `AtomicU64` bit patterns so that batch tasks can write through a
//! shared reference; the batch partitioning guarantees that every id has a
//! single writer per superstep, so relaxed ordering is sufficient. The
//! superstep barrier (task join) provides the happens-before edge between
//! rounds.

use std::sync::atomic::{AtomicU64, Ordering};

/// Node value store shared by all batch tasks of a run
#[derive(Debug)]
pub struct NodeValues {
    values: Box<[AtomicU64]>,
}

impl NodeValues {
    /// Allocate `node_count` slots, all set to `0.0`
    pub fn new(node_count: usize) -> Self {
        Self::filled(node_count, 0.0)
    }

    /// Allocate `node_count` slots, all set to `value`
    pub fn filled(node_count: usize, value: f64) -> Self {
        let bits = value.to_bits();
        Self {
            values: (0..node_count).map(|_| AtomicU64::new(bits)).collect(),
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store has no slots
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read the value of `node_id`
    ///
    /// # Panics
    ///
    /// Panics if `node_id` is out of range.
    #[inline]
    pub fn get(&self, node_id: usize) -> f64 {
        f64::from_bits(self.values[node_id].load(Ordering::Relaxed))
    }

    /// Overwrite the value of `node_id`
    ///
    /// # Panics
    ///
    /// Panics if `node_id` is out of range.
    #[inline]
    pub fn set(&self, node_id: usize, value: f64) {
        self.values[node_id].store(value.to_bits(), Ordering::Relaxed);
    }

    /// Bulk-initialize every slot from a per-node function
    pub fn fill_with(&self, seed: impl Fn(usize) -> f64) {
        for (node_id, slot) in self.values.iter().enumerate() {
            slot.store(seed(node_id).to_bits(), Ordering::Relaxed);
        }
    }

    /// Copy all values out
    pub fn to_vec(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(|slot| f64::from_bits(slot.load(Ordering::Relaxed)))
            .collect()
    }
}
