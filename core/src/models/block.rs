//! Block model
//!
//! A block is a logical unit of application data with a size, arrival time,
//! and delivery deadline. Blocks are split into packets for transmission and
//! accumulate per-packet delay metrics as acknowledgments come back.
//!
//! Lifecycle: created by ingestion → pending queue → selected for
//! transmission (enters in-flight tracking) or evicted on deadline expiry →
//! fully acknowledged or force-flushed at shutdown, then logged.

use serde::{Deserialize, Serialize};

use crate::models::packet::Packet;

/// Application-layer data block.
///
/// # Example
/// ```
/// use block_sim_core_rs::Block;
///
/// let block = Block::new(1, 200_000, 0.2, 0.0).with_priority("P".to_string());
/// assert_eq!(block.size(), 200_000);
/// assert!(!block.miss_ddl());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Unique block identifier (assigned by the ingestion source)
    block_id: u64,

    /// Scheduling hint, opaque to the engine (pattern-file "type" column)
    priority: String,

    /// Block size in bytes
    size: u64,

    /// Delivery deadline in seconds, relative to `timestamp`
    deadline: f64,

    /// Creation/arrival time in seconds
    timestamp: f64,

    /// Packet count once packetization starts; fixed once set
    split_nums: usize,

    /// Bytes acknowledged so far
    finished_bytes: u64,

    /// Cumulative transmission delay across acked packets
    send_delay: f64,

    /// Cumulative queueing delay across acked packets
    queue_delay: f64,

    /// Cumulative propagation delay across acked packets
    propagation_delay: f64,

    /// Time the block was logged (completion, eviction, or force flush)
    finish_timestamp: f64,

    /// Whether the block missed its delivery deadline
    miss_ddl: bool,
}

impl Block {
    /// Create a new block.
    ///
    /// # Panics
    /// Panics if `size` is zero or `deadline` is negative.
    pub fn new(block_id: u64, size: u64, deadline: f64, timestamp: f64) -> Self {
        assert!(size > 0, "block size must be positive");
        assert!(deadline >= 0.0, "deadline must be non-negative");

        Self {
            block_id,
            priority: "0".to_string(),
            size,
            deadline,
            timestamp,
            split_nums: 0,
            finished_bytes: 0,
            send_delay: 0.0,
            queue_delay: 0.0,
            propagation_delay: 0.0,
            finish_timestamp: 0.0,
            miss_ddl: false,
        }
    }

    /// Set the scheduling hint (builder style).
    pub fn with_priority(mut self, priority: String) -> Self {
        self.priority = priority;
        self
    }

    pub fn block_id(&self) -> u64 {
        self.block_id
    }

    pub fn priority(&self) -> &str {
        &self.priority
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn deadline(&self) -> f64 {
        self.deadline
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Packet count; zero until packetization fixes it.
    pub fn split_nums(&self) -> usize {
        self.split_nums
    }

    pub fn finished_bytes(&self) -> u64 {
        self.finished_bytes
    }

    pub fn send_delay(&self) -> f64 {
        self.send_delay
    }

    pub fn queue_delay(&self) -> f64 {
        self.queue_delay
    }

    pub fn propagation_delay(&self) -> f64 {
        self.propagation_delay
    }

    pub fn finish_timestamp(&self) -> f64 {
        self.finish_timestamp
    }

    pub fn miss_ddl(&self) -> bool {
        self.miss_ddl
    }

    /// Fix the packet count at first packetization.
    ///
    /// # Panics
    /// Panics if the count was already set; the split count is never
    /// recomputed once packetization has started.
    pub fn set_split_nums(&mut self, split_nums: usize) {
        assert!(split_nums > 0, "split count must be positive");
        assert!(self.split_nums == 0, "split count is fixed once set");
        self.split_nums = split_nums;
    }

    /// Total accumulated delivery cost: queue + transmission + propagation.
    pub fn cost_time(&self) -> f64 {
        self.send_delay + self.queue_delay + self.propagation_delay
    }

    /// Fold one acknowledged packet's delays and payload into this block.
    pub fn absorb_ack(&mut self, packet: &Packet) {
        self.send_delay += packet.send_delay();
        self.queue_delay += packet.queue_delay();
        self.propagation_delay += packet.propagation_delay();
        self.finished_bytes += packet.payload();
    }

    /// Mark the block as having missed its deadline (queue eviction).
    pub fn mark_missed(&mut self) {
        self.miss_ddl = true;
    }

    /// Stamp the finish time and flag a late completion.
    ///
    /// A block that was never evicted can still miss its deadline if its
    /// accumulated cost exceeds the allowed budget. The flag is only ever
    /// raised here, never cleared.
    pub fn finish(&mut self, current_time: f64) {
        self.finish_timestamp = current_time;
        if self.cost_time() > self.deadline {
            self.miss_ddl = true;
        }
    }
}
