//! Durable block log and wire-record shapes.
//!
//! The block log is the evaluation record of a run: one JSON object per
//! line, append-only, so downstream analysis tools can stream it. The log
//! target is truncated exactly once, on the first write of a run, and
//! appended thereafter. Each write opens the file, appends one line, and
//! releases it, so a crash mid-run loses at most the in-progress line.
//!
//! Write failures are not retried: without the log the run is meaningless,
//! so errors propagate and the caller aborts.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Block, Packet, PacketType};

/// Errors raised while writing the block log.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("block log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("block record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One durable record per block, completed or force-flushed.
///
/// Field names follow the established log format so existing analysis
/// tooling keeps working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    #[serde(rename = "Type")]
    pub priority: String,
    #[serde(rename = "Block_id")]
    pub block_id: u64,
    #[serde(rename = "Size")]
    pub size: u64,
    #[serde(rename = "Deadline")]
    pub deadline: f64,
    #[serde(rename = "Timestamp")]
    pub timestamp: f64,
    #[serde(rename = "Finish_timestamp")]
    pub finish_timestamp: f64,
    #[serde(rename = "Send_delay")]
    pub send_delay: f64,
    #[serde(rename = "Queue_delay")]
    pub queue_delay: f64,
    #[serde(rename = "Propagation_delay")]
    pub propagation_delay: f64,
    #[serde(rename = "Split_nums")]
    pub split_nums: usize,
    #[serde(rename = "Finished_bytes")]
    pub finished_bytes: u64,
    #[serde(rename = "Miss_ddl")]
    pub miss_ddl: u8,
}

impl From<&Block> for BlockRecord {
    fn from(block: &Block) -> Self {
        Self {
            priority: block.priority().to_string(),
            block_id: block.block_id(),
            size: block.size(),
            deadline: block.deadline(),
            timestamp: block.timestamp(),
            finish_timestamp: block.finish_timestamp(),
            send_delay: block.send_delay(),
            queue_delay: block.queue_delay(),
            propagation_delay: block.propagation_delay(),
            split_nums: block.split_nums(),
            finished_bytes: block.finished_bytes(),
            miss_ddl: u8::from(block.miss_ddl()),
        }
    }
}

/// Wire-level summary of one packet, as the network layer logs it and as
/// acknowledgments arrive back in. Not produced by the engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketRecord {
    #[serde(rename = "Type")]
    pub packet_type: PacketType,
    #[serde(rename = "Position")]
    pub position: u8,
    #[serde(rename = "Send_delay")]
    pub send_delay: f64,
    #[serde(rename = "Queue_delay")]
    pub queue_delay: f64,
    #[serde(rename = "Propagation_delay")]
    pub propagation_delay: f64,
    #[serde(rename = "Latency")]
    pub latency: f64,
    #[serde(rename = "Drop")]
    pub drop: u8,
    #[serde(rename = "Packet_id")]
    pub packet_id: u64,
    #[serde(rename = "Block_id")]
    pub block_id: u64,
    #[serde(rename = "Create_time")]
    pub create_time: f64,
    #[serde(rename = "Offset")]
    pub offset: usize,
    #[serde(rename = "Payload")]
    pub payload: u64,
    #[serde(rename = "Packet_size")]
    pub packet_size: u64,
}

impl From<&Packet> for PacketRecord {
    fn from(packet: &Packet) -> Self {
        Self {
            packet_type: packet.packet_type(),
            position: packet.next_hop(),
            send_delay: packet.send_delay(),
            queue_delay: packet.queue_delay(),
            propagation_delay: packet.propagation_delay(),
            latency: packet.latency(),
            drop: u8::from(packet.dropped()),
            packet_id: packet.packet_id(),
            block_id: packet.block_id(),
            create_time: packet.create_time(),
            offset: packet.offset(),
            payload: packet.payload(),
            packet_size: packet.packet_size(),
        }
    }
}

/// Append-only block log with once-per-run truncation.
#[derive(Debug)]
pub struct BlockLogger {
    path: PathBuf,
    truncated: bool,
}

impl BlockLogger {
    /// Create a logger targeting `path`. The file is not touched until the
    /// first write.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            truncated: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a JSON line.
    ///
    /// The first write of a run truncates the target (creating parent
    /// directories if needed); subsequent writes append.
    pub fn append(&mut self, record: &BlockRecord) -> Result<(), LogError> {
        if !self.truncated {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            File::create(&self.path)?;
            self.truncated = true;
        }

        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}
