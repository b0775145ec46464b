//! Domain models for the block delivery simulator

pub mod block;
pub mod packet;

// Re-exports
pub use block::Block;
pub use packet::{Packet, PacketType};
