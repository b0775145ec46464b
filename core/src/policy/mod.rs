//! Block Selection Policy Module
//!
//! This module defines the policy interface for deciding **which** pending
//! block to transmit next. The engine delegates every selection to an
//! injected policy and makes no assumption about the heuristic beyond
//! "valid index or none", so policies can be swapped without touching the
//! engine, and tests can drive the engine with a scripted stub.
//!
//! # Policy Interface
//!
//! All policies implement the `BlockSelectionPolicy` trait:
//!
//! ```rust
//! use block_sim_core_rs::policy::BlockSelectionPolicy;
//! use block_sim_core_rs::Block;
//!
//! struct MyPolicy;
//!
//! impl BlockSelectionPolicy for MyPolicy {
//!     fn select(&mut self, _current_time: f64, queue: &[Block]) -> Option<usize> {
//!         // Decision logic here
//!         if queue.is_empty() { None } else { Some(0) }
//!     }
//! }
//! ```
//!
//! Available baselines:
//! 1. **Fifo**: first block that has already arrived (simple baseline)
//! 2. **EarliestDeadline**: arrived block with the nearest absolute deadline

use crate::models::Block;

pub mod deadline;
pub mod fifo;

pub use deadline::EarliestDeadlinePolicy;
pub use fifo::FifoPolicy;

/// Strategy deciding which queued block to transmit next.
///
/// `select` receives the current simulation time and the pending queue and
/// returns either an index into the queue or `None` meaning "nothing
/// suitable now" (for instance, pacing says not yet). A returned index must
/// be in range; the engine removes that block from the queue.
pub trait BlockSelectionPolicy {
    fn select(&mut self, current_time: f64, queue: &[Block]) -> Option<usize>;
}
