//! Application Layer engine
//!
//! Main engine integrating all components:
//! - Block admission and deadline pruning (queue manager)
//! - Packetization of the selected block into fixed-size transport units
//! - Acknowledgment reconciliation with retransmission-gap detection
//! - Completion/failure logging
//!
//! # Architecture
//!
//! The engine is single-threaded, synchronous, and clock-driven: it has no
//! internal notion of time except what callers pass in on each invocation.
//! A driving loop repeatedly calls [`AppLayer::next_packet`] for the next
//! unit to send; acknowledgment events flow back in through
//! [`AppLayer::record_ack`]; at the end of a run [`AppLayer::shutdown`]
//! force-logs whatever never completed.
//!
//! The engine exclusively owns the pending queue, the ack table, and the
//! block-status table; external actors only read them through the query
//! methods.
//!
//! # Example
//!
//! ```
//! use block_sim_core_rs::{AckOutcome, AppLayer, Block, EngineConfig, FifoPolicy};
//!
//! let log = std::env::temp_dir().join("block_sim_doc_engine.log");
//! let config = EngineConfig {
//!     log_path: log,
//!     ..Default::default()
//! };
//! let mut engine = AppLayer::new(config, Box::new(FifoPolicy::new())).unwrap();
//! engine.admit_block(Block::new(1, 3000, 0.2, 0.0));
//!
//! let packet = engine.next_packet(0.0).unwrap().expect("block is ready");
//! assert_eq!(packet.payload(), 1480);
//! assert_eq!(engine.record_ack(&packet).unwrap(), AckOutcome::Recorded);
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::time::SimClock;
use crate::logging::{BlockLogger, BlockRecord, LogError};
use crate::models::{Block, Packet};
use crate::policy::BlockSelectionPolicy;

pub mod acks;
pub mod queue;

pub use acks::AckTable;
pub use queue::BlockQueue;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Total packet size on the wire, header included (bytes)
    pub bytes_per_packet: u64,

    /// Header bytes per packet; payload capacity is the difference
    pub head_per_packet: u64,

    /// Simulation start time in seconds
    pub init_time: f64,

    /// Target file for the block log
    pub log_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bytes_per_packet: 1500,
            head_per_packet: 20,
            init_time: 0.0,
            log_path: PathBuf::from("output/block.log"),
        }
    }
}

/// Errors surfaced by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration validation error
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Ack referenced a block this engine never packetized: the caller fed
    /// an ack for a packet that was never emitted. Fatal by contract.
    #[error("ack references unknown block {0}: the block was never packetized")]
    UnknownBlock(u64),

    /// Block log write failure; the run should abort.
    #[error(transparent)]
    Log(#[from] LogError),
}

/// Outcome of recording one acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// New offset recorded; block still incomplete
    Recorded,

    /// Duplicate (block, offset) pair; nothing changed
    Duplicate,

    /// This ack completed the block; it has been logged
    Completed,
}

/// Packetization cursor over the block currently being transmitted.
#[derive(Debug, Clone)]
struct Cursor {
    block_id: u64,
    /// Next offset to emit, in `[0, split_nums]`
    offset: usize,
    split_nums: usize,
    size: u64,
    timestamp: f64,
}

/// Application Layer engine: block queue, packetizer, ack reconciler, and
/// finalizer behind one facade.
pub struct AppLayer {
    config: EngineConfig,
    clock: SimClock,
    queue: BlockQueue,
    cursor: Option<Cursor>,
    acks: AckTable,
    /// In-flight and finished blocks accumulating delay/byte metrics; the
    /// same entries are used for logging.
    blocks_status: BTreeMap<u64, Block>,
    logger: BlockLogger,
    /// Blocks ever registered in the status table, reported at shutdown.
    total_tracked: usize,
}

impl AppLayer {
    /// Create a new engine with the given configuration and selection
    /// policy.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidConfig`] if the header does not leave
    /// room for any payload.
    pub fn new(
        config: EngineConfig,
        policy: Box<dyn BlockSelectionPolicy>,
    ) -> Result<Self, EngineError> {
        if config.head_per_packet >= config.bytes_per_packet {
            return Err(EngineError::InvalidConfig(format!(
                "header {} leaves no payload capacity in packet size {}",
                config.head_per_packet, config.bytes_per_packet
            )));
        }

        Ok(Self {
            clock: SimClock::new(config.init_time),
            queue: BlockQueue::new(policy),
            cursor: None,
            acks: AckTable::new(),
            blocks_status: BTreeMap::new(),
            logger: BlockLogger::new(config.log_path.clone()),
            total_tracked: 0,
            config,
        })
    }

    /// Payload capacity per packet.
    pub fn capacity(&self) -> u64 {
        self.config.bytes_per_packet - self.config.head_per_packet
    }

    /// Admit one block into the pending queue.
    pub fn admit_block(&mut self, block: Block) {
        self.queue.push(block);
    }

    /// Admit a batch of ingested blocks.
    pub fn admit_blocks<I: IntoIterator<Item = Block>>(&mut self, blocks: I) {
        for block in blocks {
            self.queue.push(block);
        }
    }

    /// Produce the next packet to send, if any.
    ///
    /// Advances the clock to `current_time`. When the current block is
    /// exhausted (or there is none), asks the queue for a new one, which
    /// also runs the deadline sweep, logging evictions before this call
    /// returns. Yields `None` when the policy has nothing to offer.
    pub fn next_packet(&mut self, current_time: f64) -> Result<Option<Packet>, EngineError> {
        self.clock.advance_to(current_time);
        let now = self.clock.now();

        let exhausted = self
            .cursor
            .as_ref()
            .map_or(true, |c| c.offset == c.split_nums);
        if exhausted && !self.adopt_next_block(now)? {
            return Ok(None);
        }

        let capacity = self.capacity();
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };

        // Last packet carries the remainder, except when the block size is
        // an exact multiple of capacity: then the remainder is zero and the
        // full-capacity branch must apply to the last packet too.
        let remainder = cursor.size % capacity;
        let payload = if cursor.offset == cursor.split_nums - 1 && remainder != 0 {
            remainder
        } else {
            capacity
        };

        // A block cannot be sent before it exists, even if the clock has
        // already advanced past a gap.
        let create_time = if now > cursor.timestamp {
            now
        } else {
            cursor.timestamp
        };

        let packet = Packet::new(
            create_time,
            cursor.block_id,
            cursor.offset,
            payload,
            self.config.bytes_per_packet,
        );
        cursor.offset += 1;

        Ok(Some(packet))
    }

    /// Select and adopt a new current block. Returns `false` when the
    /// policy yields nothing. Evictions from the deadline sweep are logged
    /// here, within the same call.
    fn adopt_next_block(&mut self, now: f64) -> Result<bool, EngineError> {
        let (selected, expired) = self.queue.select_block(now);
        for evicted in expired {
            self.log_evicted(evicted)?;
        }

        let Some(mut block) = selected else {
            self.cursor = None;
            return Ok(false);
        };

        let capacity = self.capacity();
        let split_nums = block.size().div_ceil(capacity) as usize;
        block.set_split_nums(split_nums);

        self.cursor = Some(Cursor {
            block_id: block.block_id(),
            offset: 0,
            split_nums,
            size: block.size(),
            timestamp: block.timestamp(),
        });
        self.total_tracked += 1;
        self.blocks_status.insert(block.block_id(), block);
        Ok(true)
    }

    /// First missing offset of any partially acknowledged block.
    ///
    /// Scans blocks with at least one acknowledgment, in block-id order,
    /// and returns the first offset in `[0, split_nums)` absent from the
    /// block's acked set. Blocks with zero acknowledgments so far are not
    /// considered (see DESIGN.md). Read-only.
    pub fn find_retransmit_candidate(&self) -> Option<usize> {
        for (block_id, offsets) in self.acks.iter() {
            let Some(status) = self.blocks_status.get(&block_id) else {
                continue;
            };
            if offsets.len() == status.split_nums() {
                continue;
            }
            for candidate in 0..status.split_nums() {
                if !offsets.contains(&candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Reconcile one acknowledgment.
    ///
    /// Duplicate acks (same block and offset) are harmless no-ops. A fresh
    /// ack accumulates the packet's delays and payload onto the block's
    /// status entry; when the distinct-acked count reaches the split count
    /// the block is complete and gets logged.
    ///
    /// # Errors
    /// [`EngineError::UnknownBlock`] if the ack references a block never
    /// packetized by this engine.
    pub fn record_ack(&mut self, packet: &Packet) -> Result<AckOutcome, EngineError> {
        if self.acks.contains(packet.block_id(), packet.offset()) {
            return Ok(AckOutcome::Duplicate);
        }

        let split_nums = {
            let block = self
                .blocks_status
                .get_mut(&packet.block_id())
                .ok_or(EngineError::UnknownBlock(packet.block_id()))?;
            block.absorb_ack(packet);
            block.split_nums()
        };

        self.acks.insert(packet.block_id(), packet.offset());

        if self.acks.count(packet.block_id()) == split_nums {
            self.finalize_block(packet.block_id())?;
            return Ok(AckOutcome::Completed);
        }
        Ok(AckOutcome::Recorded)
    }

    /// Force-log every tracked block that never fully acknowledged and
    /// report the total number of blocks ever tracked.
    pub fn shutdown(&mut self) -> Result<usize, EngineError> {
        let unfinished: Vec<u64> = self
            .blocks_status
            .iter()
            .filter(|(id, block)| self.acks.count(**id) < block.split_nums())
            .map(|(id, _)| *id)
            .collect();
        for block_id in unfinished {
            self.finalize_block(block_id)?;
        }
        Ok(self.total_tracked)
    }

    /// Stamp finish state on a tracked block and append its log record.
    fn finalize_block(&mut self, block_id: u64) -> Result<(), EngineError> {
        let now = self.clock.now();
        let record = {
            let block = self
                .blocks_status
                .get_mut(&block_id)
                .ok_or(EngineError::UnknownBlock(block_id))?;
            block.finish(now);
            BlockRecord::from(&*block)
        };
        self.logger.append(&record)?;
        Ok(())
    }

    /// Log a block evicted by the deadline sweep (never packetized).
    fn log_evicted(&mut self, mut block: Block) -> Result<(), EngineError> {
        block.finish(self.clock.now());
        self.logger.append(&BlockRecord::from(&block))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Query operations (read-only views for callers and tests)
    // ------------------------------------------------------------------

    /// Blocks still waiting in the pending queue.
    pub fn pending(&self) -> &[Block] {
        self.queue.pending()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Block currently being packetized, if any offsets remain.
    pub fn current_block_id(&self) -> Option<u64> {
        self.cursor.as_ref().map(|c| c.block_id)
    }

    /// Status entry for a tracked (in-flight or finished) block.
    pub fn block_status(&self, block_id: u64) -> Option<&Block> {
        self.blocks_status.get(&block_id)
    }

    /// Acknowledged offsets for a block, in arrival order.
    pub fn acked_offsets(&self, block_id: u64) -> Option<&[usize]> {
        self.acks.offsets(block_id)
    }

    /// Current simulation time as last reported by a caller.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }
}
