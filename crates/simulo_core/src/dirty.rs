//! # Dirty Set
//!
//! Nodes whose local transform changed since the last resolution pass.
//!
//! Membership is tracked in a compact bitset keyed by slot index, and the
//! marked ids are kept in insertion order so the resolver can iterate them
//! without scanning the whole arena.
//!
//! ## Performance
//!
//! - Mark: O(1), duplicates are ignored
//! - Contains: O(1)
//! - Clear: O(marked)

use crate::node::NodeId;

/// Insertion-ordered set of dirty nodes.
#[derive(Debug, Default, Clone)]
pub struct DirtySet {
    /// Bitset: 1 = dirty. 64 slots per u64.
    bits: Vec<u64>,
    /// Marked ids in first-mark order. May hold ids whose bit was cleared.
    entries: Vec<NodeId>,
    /// Cached count of set bits.
    dirty_count: usize,
}

impl DirtySet {
    /// Creates an empty dirty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty dirty set sized for `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: vec![0u64; capacity.div_ceil(64)],
            entries: Vec::with_capacity(capacity),
            dirty_count: 0,
        }
    }

    /// Marks a node dirty. Returns `false` if it already was.
    #[inline]
    pub fn mark(&mut self, id: NodeId) -> bool {
        let index = id.index() as usize;
        let word = index / 64;
        let mask = 1u64 << (index % 64);
        if word >= self.bits.len() {
            self.bits.resize(word + 1, 0);
        }
        if self.bits[word] & mask != 0 {
            return false;
        }
        self.bits[word] |= mask;
        self.entries.push(id);
        self.dirty_count += 1;
        true
    }

    /// Clears the mark for a slot, e.g. when its node is despawned.
    ///
    /// The id stays in [`entries`](Self::entries) until the next
    /// [`clear`](Self::clear); consumers must skip ids that are no longer alive.
    #[inline]
    pub fn unmark(&mut self, id: NodeId) {
        let index = id.index() as usize;
        let word = index / 64;
        let mask = 1u64 << (index % 64);
        if let Some(bits) = self.bits.get_mut(word) {
            if *bits & mask != 0 {
                *bits &= !mask;
                self.dirty_count -= 1;
            }
        }
    }

    /// Returns `true` if the node's slot is marked.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        let index = id.index() as usize;
        self.bits
            .get(index / 64)
            .is_some_and(|bits| bits & (1u64 << (index % 64)) != 0)
    }

    /// Marked ids in first-mark order.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[NodeId] {
        &self.entries
    }

    /// Number of marked slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.dirty_count
    }

    /// Returns `true` if nothing is marked.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dirty_count == 0
    }

    /// Empties the set, keeping its allocations.
    pub fn clear(&mut self) {
        for id in self.entries.drain(..) {
            let index = id.index() as usize;
            if let Some(bits) = self.bits.get_mut(index / 64) {
                *bits &= !(1u64 << (index % 64));
            }
        }
        self.dirty_count = 0;
    }
}
