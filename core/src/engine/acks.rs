//! Ack table: per-block record of acknowledged packet offsets.
//!
//! Offsets are kept in arrival order with duplicates ignored, so the
//! distinct-offset count is simply the list length. Iteration over blocks is
//! in block-id order for deterministic retransmission scans.

use std::collections::BTreeMap;

/// Mapping from block id to the ordered set of acknowledged offsets.
#[derive(Debug, Default)]
pub struct AckTable {
    acked: BTreeMap<u64, Vec<usize>>,
}

impl AckTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if this exact (block, offset) pair was already acknowledged.
    pub fn contains(&self, block_id: u64, offset: usize) -> bool {
        self.acked
            .get(&block_id)
            .is_some_and(|offsets| offsets.contains(&offset))
    }

    /// Record an acknowledged offset, creating the block's entry on first
    /// ack. Returns `false` (and changes nothing) for a duplicate.
    pub fn insert(&mut self, block_id: u64, offset: usize) -> bool {
        let offsets = self.acked.entry(block_id).or_default();
        if offsets.contains(&offset) {
            return false;
        }
        offsets.push(offset);
        true
    }

    /// Number of distinct offsets acknowledged for a block.
    pub fn count(&self, block_id: u64) -> usize {
        self.acked.get(&block_id).map_or(0, Vec::len)
    }

    /// Acknowledged offsets for a block, in arrival order.
    pub fn offsets(&self, block_id: u64) -> Option<&[usize]> {
        self.acked.get(&block_id).map(Vec::as_slice)
    }

    /// Blocks with at least one acknowledgment, in block-id order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[usize])> + '_ {
        self.acked.iter().map(|(id, offsets)| (*id, offsets.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.acked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acked.is_empty()
    }
}
