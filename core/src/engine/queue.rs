//! Block queue manager: admission, policy-driven selection, and eager
//! deadline pruning.
//!
//! Selection delegates to the injected [`BlockSelectionPolicy`]. Immediately
//! after a successful selection the remaining queue is swept in reverse
//! index order and every block past its deadline is evicted; reverse
//! iteration so that removal by index does not perturb not-yet-visited
//! indices. Evicted blocks come back to the caller marked as deadline
//! misses; the engine logs them within the same call.

use crate::models::Block;
use crate::policy::BlockSelectionPolicy;

/// Pending-block queue with pluggable selection.
pub struct BlockQueue {
    pending: Vec<Block>,
    policy: Box<dyn BlockSelectionPolicy>,
}

impl BlockQueue {
    pub fn new(policy: Box<dyn BlockSelectionPolicy>) -> Self {
        Self {
            pending: Vec::new(),
            policy,
        }
    }

    /// Admit a block into the pending queue.
    pub fn push(&mut self, block: Block) {
        self.pending.push(block);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending blocks, in queue order.
    pub fn pending(&self) -> &[Block] {
        &self.pending
    }

    /// Ask the policy for the next block to transmit.
    ///
    /// Returns the selected block (removed from the queue) together with
    /// every block evicted by the post-selection deadline sweep, each marked
    /// `miss_ddl`. A policy answer of "none" yields no block and no sweep.
    ///
    /// # Panics
    /// Panics if the policy returns an out-of-range index (contract
    /// violation).
    pub fn select_block(&mut self, current_time: f64) -> (Option<Block>, Vec<Block>) {
        let Some(idx) = self.policy.select(current_time, &self.pending) else {
            return (None, Vec::new());
        };
        assert!(
            idx < self.pending.len(),
            "selection policy returned out-of-range index {} (queue len {})",
            idx,
            self.pending.len()
        );
        let selected = self.pending.remove(idx);

        let mut expired = Vec::new();
        for i in (0..self.pending.len()).rev() {
            let block = &self.pending[i];
            if block.timestamp() + block.deadline() < current_time {
                let mut evicted = self.pending.remove(i);
                evicted.mark_missed();
                expired.push(evicted);
            }
        }

        (Some(selected), expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FifoPolicy;

    /// Scripted policy returning a fixed sequence of answers.
    struct ScriptedPolicy {
        answers: Vec<Option<usize>>,
    }

    impl BlockSelectionPolicy for ScriptedPolicy {
        fn select(&mut self, _current_time: f64, _queue: &[Block]) -> Option<usize> {
            if self.answers.is_empty() {
                None
            } else {
                self.answers.remove(0)
            }
        }
    }

    #[test]
    fn test_selection_removes_block() {
        let mut queue = BlockQueue::new(Box::new(FifoPolicy::new()));
        queue.push(Block::new(1, 1000, 0.2, 0.0));
        queue.push(Block::new(2, 1000, 0.2, 0.0));

        let (selected, expired) = queue.select_block(0.1);
        assert_eq!(selected.map(|b| b.block_id()), Some(1));
        assert!(expired.is_empty());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_policy_none_leaves_queue_untouched() {
        let mut queue = BlockQueue::new(Box::new(ScriptedPolicy { answers: vec![None] }));
        queue.push(Block::new(1, 1000, 0.2, 0.0));

        let (selected, expired) = queue.select_block(5.0);
        assert!(selected.is_none());
        // No sweep without a selection, even though the block is expired.
        assert!(expired.is_empty());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_sweep_evicts_expired_blocks() {
        let mut queue = BlockQueue::new(Box::new(ScriptedPolicy {
            answers: vec![Some(2)],
        }));
        queue.push(Block::new(1, 1000, 0.2, 0.0)); // expires at 0.2
        queue.push(Block::new(2, 1000, 0.1, 0.1)); // expires at 0.2
        queue.push(Block::new(3, 1000, 2.0, 0.0)); // selected
        queue.push(Block::new(4, 1000, 5.0, 0.0)); // survives

        let (selected, expired) = queue.select_block(0.5);
        assert_eq!(selected.map(|b| b.block_id()), Some(3));

        let expired_ids: Vec<u64> = expired.iter().map(Block::block_id).collect();
        assert_eq!(expired_ids, vec![2, 1], "reverse index order");
        assert!(expired.iter().all(Block::miss_ddl));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pending()[0].block_id(), 4);
    }

    #[test]
    fn test_deadline_boundary_is_exclusive() {
        // timestamp + deadline == current_time must NOT evict.
        let mut queue = BlockQueue::new(Box::new(ScriptedPolicy {
            answers: vec![Some(0)],
        }));
        queue.push(Block::new(1, 1000, 5.0, 0.0));
        queue.push(Block::new(2, 1000, 0.5, 0.0)); // expires exactly at 0.5

        let (_, expired) = queue.select_block(0.5);
        assert!(expired.is_empty());
        assert_eq!(queue.len(), 1);
    }
}
