//! FIFO (First-In-First-Out) Policy
//!
//! Simplest baseline policy: transmit the first block that has already
//! arrived, in queue order. No consideration of deadlines or urgency.
//! Useful as a comparison baseline and for deterministic tests.

use super::BlockSelectionPolicy;
use crate::models::Block;

/// FIFO policy: pick the first arrived block.
///
/// # Example
///
/// ```
/// use block_sim_core_rs::policy::{BlockSelectionPolicy, FifoPolicy};
/// use block_sim_core_rs::Block;
///
/// let queue = vec![
///     Block::new(1, 2000, 0.2, 0.5), // not arrived yet at t=0.1
///     Block::new(2, 2000, 0.2, 0.0),
/// ];
/// let mut policy = FifoPolicy::new();
/// assert_eq!(policy.select(0.1, &queue), Some(1));
/// ```
pub struct FifoPolicy;

impl FifoPolicy {
    /// Create new FIFO policy
    pub fn new() -> Self {
        Self
    }
}

impl Default for FifoPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockSelectionPolicy for FifoPolicy {
    fn select(&mut self, current_time: f64, queue: &[Block]) -> Option<usize> {
        queue
            .iter()
            .position(|block| block.timestamp() <= current_time)
    }
}
