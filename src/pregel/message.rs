//! Double-buffered message store
//!
//! Messages sent during superstep `s` land in the *next* generation and are
//! read from the *current* generation during superstep `s + 1`. The two
//! generations are flipped by index at the barrier; nothing is copied.
//!
//! Concurrent sends to the same target are merged by a [`MessageCombiner`].
//! The reducing combiners (`Sum`, `Min`, `Max`) use a lock-free CAS loop on
//! the value's bit pattern; `List` appends to a per-target vector behind a
//! `parking_lot` mutex.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// How multiple messages for the same target are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MessageCombiner {
    /// Keep every message, in arrival order
    #[default]
    List,
    /// Add messages together
    Sum,
    /// Keep the smallest message
    Min,
    /// Keep the largest message
    Max,
}

impl MessageCombiner {
    /// Whether messages are reduced to a single value per target
    pub fn is_reducing(&self) -> bool {
        !matches!(self, MessageCombiner::List)
    }

    /// Neutral element of the reduction
    pub fn identity(&self) -> f64 {
        match self {
            MessageCombiner::Sum | MessageCombiner::List => 0.0,
            MessageCombiner::Min => f64::INFINITY,
            MessageCombiner::Max => f64::NEG_INFINITY,
        }
    }

    /// Merge two messages
    ///
    /// For `List` this has no meaning and returns `incoming`.
    #[inline]
    pub fn combine(&self, accumulated: f64, incoming: f64) -> f64 {
        match self {
            MessageCombiner::Sum => accumulated + incoming,
            MessageCombiner::Min => accumulated.min(incoming),
            MessageCombiner::Max => accumulated.max(incoming),
            MessageCombiner::List => incoming,
        }
    }
}

/// Lazy sequence of the messages delivered to one node
///
/// Iterating does not touch the store; calling
/// [`MessageStore::messages`] again yields the same sequence.
#[derive(Debug, Clone)]
pub struct Messages {
    inner: MessagesInner,
}

#[derive(Debug, Clone)]
enum MessagesInner {
    Reduced(std::option::IntoIter<f64>),
    Listed(std::vec::IntoIter<f64>),
}

impl Messages {
    /// No messages (used for superstep 0)
    pub fn empty() -> Self {
        Self {
            inner: MessagesInner::Reduced(None.into_iter()),
        }
    }

    fn reduced(value: Option<f64>) -> Self {
        Self {
            inner: MessagesInner::Reduced(value.into_iter()),
        }
    }

    fn listed(values: Vec<f64>) -> Self {
        Self {
            inner: MessagesInner::Listed(values.into_iter()),
        }
    }
}

impl Iterator for Messages {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        match &mut self.inner {
            MessagesInner::Reduced(it) => it.next(),
            MessagesInner::Listed(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            MessagesInner::Reduced(it) => it.size_hint(),
            MessagesInner::Listed(it) => it.size_hint(),
        }
    }
}

impl ExactSizeIterator for Messages {}

enum Slots {
    Reduced {
        values: Box<[AtomicU64]>,
        present: Box<[AtomicBool]>,
    },
    Listed(Box<[Mutex<Vec<f64>>]>),
}

/// One message generation: a slot per node plus the list of touched targets
struct Generation {
    combiner: MessageCombiner,
    slots: Slots,
    touched: Mutex<Vec<usize>>,
}

impl Generation {
    fn new(node_count: usize, combiner: MessageCombiner) -> Self {
        let slots = if combiner.is_reducing() {
            let identity = combiner.identity().to_bits();
            Slots::Reduced {
                values: (0..node_count).map(|_| AtomicU64::new(identity)).collect(),
                present: (0..node_count).map(|_| AtomicBool::new(false)).collect(),
            }
        } else {
            Slots::Listed((0..node_count).map(|_| Mutex::new(Vec::new())).collect())
        };
        Self {
            combiner,
            slots,
            touched: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, target: usize, value: f64) {
        let first = match &self.slots {
            Slots::Reduced { values, present } => {
                let slot = &values[target];
                let mut current = slot.load(Ordering::Acquire);
                loop {
                    let merged = self.combiner.combine(f64::from_bits(current), value).to_bits();
                    match slot.compare_exchange_weak(
                        current,
                        merged,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    ) {
                        Ok(_) => break,
                        Err(actual) => current = actual,
                    }
                }
                // Value first, flag second: a reader that sees the flag sees the value.
                !present[target].swap(true, Ordering::AcqRel)
            }
            Slots::Listed(lists) => {
                let mut list = lists[target].lock();
                list.push(value);
                list.len() == 1
            }
        };
        if first {
            self.touched.lock().push(target);
        }
    }

    fn has_any(&self, node_id: usize) -> bool {
        match &self.slots {
            Slots::Reduced { present, .. } => present[node_id].load(Ordering::Acquire),
            Slots::Listed(lists) => !lists[node_id].lock().is_empty(),
        }
    }

    fn messages(&self, node_id: usize) -> Messages {
        match &self.slots {
            Slots::Reduced { values, present } => {
                if present[node_id].load(Ordering::Acquire) {
                    Messages::reduced(Some(f64::from_bits(
                        values[node_id].load(Ordering::Acquire),
                    )))
                } else {
                    Messages::reduced(None)
                }
            }
            Slots::Listed(lists) => Messages::listed(lists[node_id].lock().clone()),
        }
    }

    fn target_count(&self) -> usize {
        self.touched.lock().len()
    }

    /// Reset only the slots written since the last clear
    fn clear(&self) {
        let touched = std::mem::take(&mut *self.touched.lock());
        match &self.slots {
            Slots::Reduced { values, present } => {
                let identity = self.combiner.identity().to_bits();
                for node_id in touched {
                    values[node_id].store(identity, Ordering::Relaxed);
                    present[node_id].store(false, Ordering::Relaxed);
                }
            }
            Slots::Listed(lists) => {
                for node_id in touched {
                    lists[node_id].lock().clear();
                }
            }
        }
    }
}

/// Two-generation message store shared by all batch tasks of a run
pub struct MessageStore {
    generations: [Generation; 2],
    current: AtomicUsize,
    asynchronous: bool,
}

impl MessageStore {
    /// Allocate both generations for `node_count` targets
    pub fn new(node_count: usize, combiner: MessageCombiner, asynchronous: bool) -> Self {
        Self {
            generations: [
                Generation::new(node_count, combiner),
                Generation::new(node_count, combiner),
            ],
            current: AtomicUsize::new(0),
            asynchronous,
        }
    }

    /// Combiner used by both generations
    pub fn combiner(&self) -> MessageCombiner {
        self.generations[0].combiner
    }

    /// Whether sends are mirrored into the current generation
    pub fn is_asynchronous(&self) -> bool {
        self.asynchronous
    }

    fn current(&self) -> &Generation {
        &self.generations[self.current.load(Ordering::Acquire)]
    }

    fn next(&self) -> &Generation {
        &self.generations[1 - self.current.load(Ordering::Acquire)]
    }

    /// Merge `value` into the next generation's entry for `target`
    ///
    /// In asynchronous mode the message is also merged into the current
    /// generation, where vertices computed later in the same superstep may
    /// observe it.
    ///
    /// # Panics
    ///
    /// Panics if `target` is out of range.
    pub fn send(&self, target: usize, value: f64) {
        self.next().push(target, value);
        if self.asynchronous {
            self.current().push(target, value);
        }
    }

    /// Messages for `node_id` in the current generation
    pub fn messages(&self, node_id: usize) -> Messages {
        self.current().messages(node_id)
    }

    /// Whether `node_id` has at least one message in the current generation
    pub fn has_any(&self, node_id: usize) -> bool {
        self.current().has_any(node_id)
    }

    /// Whether the next generation holds any message
    pub fn any_pending(&self) -> bool {
        self.pending_targets() > 0
    }

    /// Number of distinct targets with a message in the next generation
    pub fn pending_targets(&self) -> usize {
        self.next().target_count()
    }

    /// Flip generations and clear the new next generation
    ///
    /// Must only be called at a superstep barrier, when no batch task is
    /// running.
    pub fn swap_generations(&self) {
        let old_current = self.current.load(Ordering::Acquire);
        self.current.store(1 - old_current, Ordering::Release);
        self.generations[old_current].clear();
    }
}

impl std::fmt::Debug for MessageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStore")
            .field("combiner", &self.combiner())
            .field("asynchronous", &self.asynchronous)
            .field("current_targets", &self.current().target_count())
            .field("pending_targets", &self.pending_targets())
            .finish()
    }
}
