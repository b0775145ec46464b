//! Block Delivery Simulator Core - Rust Engine
//!
//! Simulates application-layer delivery of discrete data blocks, each with
//! a size, arrival time, and delivery deadline, over a packetized
//! transport, to evaluate block-scheduling and retransmission policies
//! under deadline pressure.
//!
//! # Architecture
//!
//! - **core**: Simulation clock (caller-driven time)
//! - **models**: Domain types (Block, Packet)
//! - **policy**: Pluggable block-selection policies
//! - **engine**: Application Layer engine (queue, packetizer, ack reconciler)
//! - **ingest**: Block-file parsing (CSV and pattern formats)
//! - **logging**: Durable per-block log records
//!
//! # Critical Invariants
//!
//! 1. A block's split count is fixed at first packetization, never recomputed
//! 2. Packet ids are process-wide, unique, and monotonically increasing
//! 3. Duplicate acknowledgments are idempotent no-ops

// Module declarations
pub mod core;
pub mod engine;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod policy;

// Re-exports for convenience
pub use crate::core::time::SimClock;
pub use engine::{AckOutcome, AppLayer, BlockQueue, EngineConfig, EngineError};
pub use ingest::{BlockSource, IngestConfig, IngestError};
pub use logging::{BlockLogger, BlockRecord, LogError, PacketRecord};
pub use models::{Block, Packet, PacketType};
pub use policy::{BlockSelectionPolicy, EarliestDeadlinePolicy, FifoPolicy};
