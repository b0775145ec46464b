//! Packet (transport unit) model
//!
//! A packet is a bounded-size fragment of a block, individually
//! acknowledged. Packet identifiers are process-wide, monotonically
//! increasing, and assigned from a single atomic counter shared by all
//! constructors; the counter resets only at process start.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Global packet id generator. `fetch_add` guarantees every constructed
/// packet gets a distinct, strictly increasing identifier.
static NEXT_PACKET_ID: AtomicU64 = AtomicU64::new(1);

fn next_packet_id() -> u64 {
    NEXT_PACKET_ID.fetch_add(1, Ordering::Relaxed)
}

/// Direction/kind of a transport unit on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketType {
    /// Data packet travelling sender → receiver
    #[serde(rename = "S")]
    Data,

    /// Acknowledgment travelling receiver → sender
    #[serde(rename = "A")]
    Ack,
}

/// A single transport unit of a block.
///
/// The engine constructs data packets; the network layer populates the
/// delay, latency, and drop fields before acknowledgments flow back in.
///
/// # Example
/// ```
/// use block_sim_core_rs::Packet;
///
/// let first = Packet::new(0.0, 1, 0, 1480, 1500);
/// let second = Packet::new(0.0, 1, 1, 1480, 1500);
/// assert!(second.packet_id() > first.packet_id());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packet {
    /// Globally unique, monotonically increasing identifier
    packet_id: u64,

    packet_type: PacketType,

    /// Construction time; never earlier than the owning block's arrival
    create_time: f64,

    /// Owning block
    block_id: u64,

    /// 0-based sequence index within the owning block
    offset: usize,

    /// Bytes of block data carried (at most capacity)
    payload: u64,

    /// Total size on the wire, header included
    packet_size: u64,

    /// Position/hop in the simulated path, set by the network layer
    next_hop: u8,

    // Populated by the network layer before the ack returns.
    send_delay: f64,
    queue_delay: f64,
    propagation_delay: f64,
    latency: f64,
    dropped: bool,
}

impl Packet {
    /// Construct a data packet with a freshly assigned global id.
    pub fn new(create_time: f64, block_id: u64, offset: usize, payload: u64, packet_size: u64) -> Self {
        Self::with_packet_id(next_packet_id(), create_time, block_id, offset, payload, packet_size)
    }

    /// Construct a packet with an explicitly supplied id.
    ///
    /// Normal construction goes through [`Packet::new`]; this exists for
    /// callers that replay or clone an existing wire record.
    pub fn with_packet_id(
        packet_id: u64,
        create_time: f64,
        block_id: u64,
        offset: usize,
        payload: u64,
        packet_size: u64,
    ) -> Self {
        Self {
            packet_id,
            packet_type: PacketType::Data,
            create_time,
            block_id,
            offset,
            payload,
            packet_size,
            next_hop: 0,
            send_delay: 0.0,
            queue_delay: 0.0,
            propagation_delay: 0.0,
            latency: 0.0,
            dropped: false,
        }
    }

    pub fn packet_id(&self) -> u64 {
        self.packet_id
    }

    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    pub fn create_time(&self) -> f64 {
        self.create_time
    }

    pub fn block_id(&self) -> u64 {
        self.block_id
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn payload(&self) -> u64 {
        self.payload
    }

    pub fn packet_size(&self) -> u64 {
        self.packet_size
    }

    pub fn next_hop(&self) -> u8 {
        self.next_hop
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

    pub fn latency(&self) -> f64 {
        self.latency
    }

    pub fn dropped(&self) -> bool {
        self.dropped
    }

    /// Populate the per-hop delay fields (network layer).
    pub fn set_delays(&mut self, send: f64, queue: f64, propagation: f64) {
        self.send_delay = send;
        self.queue_delay = queue;
        self.propagation_delay = propagation;
    }

    pub fn set_latency(&mut self, latency: f64) {
        self.latency = latency;
    }

    pub fn set_next_hop(&mut self, next_hop: u8) {
        self.next_hop = next_hop;
    }

    pub fn mark_dropped(&mut self) {
        self.dropped = true;
    }

    /// Turn a delivered data packet into the acknowledgment flowing back.
    pub fn into_ack(mut self, position: u8) -> Packet {
        self.packet_type = PacketType::Ack;
        self.next_hop = position;
        self
    }

    /// Clone this packet for retransmission at a later time.
    ///
    /// The clone carries the same block, offset, payload, and size but a
    /// fresh packet id and create time; delay fields start clean so the
    /// network layer fills them for the new transmission.
    pub fn retransmit_at(&self, current_time: f64) -> Packet {
        Packet::new(
            current_time,
            self.block_id,
            self.offset,
            self.payload,
            self.packet_size,
        )
    }
}
