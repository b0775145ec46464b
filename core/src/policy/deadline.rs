//! Earliest-Deadline Policy
//!
//! Deadline-pressure baseline: among blocks that have already arrived, pick
//! the one whose absolute deadline (`timestamp + deadline`) is nearest.
//! Ties resolve to the lower queue index for determinism.

use super::BlockSelectionPolicy;
use crate::models::Block;

/// Earliest-deadline-first selection.
///
/// # Example
///
/// ```
/// use block_sim_core_rs::policy::{BlockSelectionPolicy, EarliestDeadlinePolicy};
/// use block_sim_core_rs::Block;
///
/// let queue = vec![
///     Block::new(1, 2000, 0.9, 0.0), // expires at 0.9
///     Block::new(2, 2000, 0.3, 0.0), // expires at 0.3
/// ];
/// let mut policy = EarliestDeadlinePolicy::new();
/// assert_eq!(policy.select(0.1, &queue), Some(1));
/// ```
pub struct EarliestDeadlinePolicy;

impl EarliestDeadlinePolicy {
    /// Create new earliest-deadline policy
    pub fn new() -> Self {
        Self
    }
}

impl Default for EarliestDeadlinePolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockSelectionPolicy for EarliestDeadlinePolicy {
    fn select(&mut self, current_time: f64, queue: &[Block]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, block) in queue.iter().enumerate() {
            if block.timestamp() > current_time {
                continue;
            }
            let expiry = block.timestamp() + block.deadline();
            match best {
                Some((_, best_expiry)) if best_expiry <= expiry => {}
                _ => best = Some((idx, expiry)),
            }
        }
        best.map(|(idx, _)| idx)
    }
}
