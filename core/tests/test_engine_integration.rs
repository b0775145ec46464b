//! End-to-end engine scenarios: ingest → packetize → ack → log.

use std::fs;
use std::path::PathBuf;

use block_sim_core_rs::policy::BlockSelectionPolicy;
use block_sim_core_rs::{
    AckOutcome, AppLayer, Block, BlockRecord, BlockSource, EngineConfig, FifoPolicy, IngestConfig,
    Packet,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn temp_log(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "block_sim_integration_{}_{}.log",
        name,
        std::process::id()
    ))
}

fn engine_with_log(log_path: &PathBuf) -> AppLayer {
    let config = EngineConfig {
        log_path: log_path.clone(),
        ..Default::default()
    };
    AppLayer::new(config, Box::new(FifoPolicy::new())).unwrap()
}

fn read_records(path: &PathBuf) -> Vec<BlockRecord> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn ack_of(packet: &Packet) -> Packet {
    let mut delivered = packet.clone();
    delivered.set_delays(0.001, 0.0005, 0.0002);
    delivered.into_ack(2)
}

/// Policy scripted with a fixed sequence of answers.
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

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_single_block_lifecycle() {
    // One block (size=3000, deadline=0.2, timestamp=0) over 1500-byte
    // packets with 20-byte headers: capacity 1480, three packets with
    // payloads [1480, 1480, 40].
    let log = temp_log("lifecycle");
    let mut source = BlockSource::new(IngestConfig::default());
    let blocks = source.parse_csv("0.0,3000\n").unwrap();

    let mut engine = engine_with_log(&log);
    engine.admit_blocks(blocks);

    let mut packets = Vec::new();
    let mut now = 0.0;
    while let Some(packet) = engine.next_packet(now).unwrap() {
        packets.push(packet);
        now += 0.001;
    }
    assert_eq!(
        packets.iter().map(Packet::payload).collect::<Vec<_>>(),
        vec![1480, 1480, 40]
    );

    let mut last = AckOutcome::Recorded;
    for packet in &packets {
        last = engine.record_ack(&ack_of(packet)).unwrap();
    }
    assert_eq!(last, AckOutcome::Completed);

    let records = read_records(&log);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.block_id, 1);
    assert_eq!(record.size, 3000);
    assert_eq!(record.finished_bytes, 3000);
    assert_eq!(record.split_nums, 3);
    assert_eq!(record.miss_ddl, 0, "cost 0.0051 is within deadline 0.2");
    assert!((record.send_delay - 0.003).abs() < 1e-9);

    fs::remove_file(&log).ok();
}

#[test]
fn test_deadline_pruning_logs_eviction() {
    // The stale block (timestamp=0, deadline=0.2) is never selected; when
    // the fresh one is picked at t=0.5 the sweep evicts and logs it.
    let log = temp_log("pruning");
    let config = EngineConfig {
        log_path: log.clone(),
        ..Default::default()
    };
    let mut engine = AppLayer::new(
        config,
        Box::new(ScriptedPolicy {
            answers: vec![Some(1)],
        }),
    )
    .unwrap();
    engine.admit_block(Block::new(1, 3000, 0.2, 0.0));
    engine.admit_block(Block::new(2, 3000, 5.0, 0.4));

    let packet = engine.next_packet(0.5).unwrap().unwrap();
    assert_eq!(packet.block_id(), 2);
    assert_eq!(engine.pending_len(), 0);
    assert!(engine.block_status(1).is_none(), "evicted, never in flight");

    let records = read_records(&log);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].block_id, 1);
    assert_eq!(records[0].miss_ddl, 1);
    assert_eq!(records[0].finish_timestamp, 0.5);
    assert_eq!(records[0].split_nums, 0, "never packetized");

    fs::remove_file(&log).ok();
}

#[test]
fn test_late_completion_marks_missed_deadline() {
    let log = temp_log("late_completion");
    let mut engine = engine_with_log(&log);
    engine.admit_block(Block::new(1, 100, 0.2, 0.0));

    let packet = engine.next_packet(0.0).unwrap().unwrap();
    let mut delivered = packet.clone();
    // Accumulated cost 0.3 exceeds the 0.2 deadline.
    delivered.set_delays(0.1, 0.15, 0.05);
    engine.record_ack(&delivered.into_ack(2)).unwrap();

    let records = read_records(&log);
    assert_eq!(records[0].miss_ddl, 1);

    fs::remove_file(&log).ok();
}

#[test]
fn test_shutdown_force_flushes_unfinished_blocks() {
    let log = temp_log("shutdown");
    let mut engine = engine_with_log(&log);
    engine.admit_block(Block::new(1, 100, 5.0, 0.0));
    engine.admit_block(Block::new(2, 3000, 5.0, 0.0));

    // Complete block 1, partially ack block 2.
    let p1 = engine.next_packet(0.0).unwrap().unwrap();
    engine.record_ack(&ack_of(&p1)).unwrap();
    let p2a = engine.next_packet(0.01).unwrap().unwrap();
    let _p2b = engine.next_packet(0.02).unwrap().unwrap();
    let _p2c = engine.next_packet(0.03).unwrap().unwrap();
    engine.record_ack(&ack_of(&p2a)).unwrap();

    let tracked = engine.shutdown().unwrap();
    assert_eq!(tracked, 2);

    let records = read_records(&log);
    // Block 1 logged at completion, block 2 force-flushed at shutdown.
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].block_id, 2);
    assert_eq!(records[1].finished_bytes, 1480);
    assert_eq!(records[1].split_nums, 3);

    fs::remove_file(&log).ok();
}

#[test]
fn test_new_run_truncates_previous_log() {
    let log = temp_log("truncate");

    let mut first = engine_with_log(&log);
    first.admit_block(Block::new(1, 100, 5.0, 0.0));
    let packet = first.next_packet(0.0).unwrap().unwrap();
    first.record_ack(&ack_of(&packet)).unwrap();
    assert_eq!(read_records(&log).len(), 1);

    let mut second = engine_with_log(&log);
    second.admit_block(Block::new(1, 100, 5.0, 0.0));
    let packet = second.next_packet(0.0).unwrap().unwrap();
    second.record_ack(&ack_of(&packet)).unwrap();

    // Second run starts its log fresh rather than appending to the first.
    assert_eq!(read_records(&log).len(), 1);

    fs::remove_file(&log).ok();
}

#[test]
fn test_pattern_file_end_to_end() {
    let log = temp_log("pattern_e2e");
    let mut source = BlockSource::new(IngestConfig::default());
    let blocks = source.parse_pattern("4\nI,2960,5.0\nP,1000,5.0\n").unwrap();

    let mut engine = engine_with_log(&log);
    engine.admit_blocks(blocks);

    let mut completed = 0;
    let mut now = 0.0;
    for _ in 0..64 {
        match engine.next_packet(now).unwrap() {
            Some(packet) => {
                if engine.record_ack(&ack_of(&packet)).unwrap() == AckOutcome::Completed {
                    completed += 1;
                }
            }
            None => {
                if engine.pending_len() == 0 {
                    break;
                }
            }
        }
        now += 0.05;
    }

    assert_eq!(completed, 4);
    assert_eq!(engine.shutdown().unwrap(), 4);
    assert_eq!(read_records(&log).len(), 4, "no force-flush duplicates");

    fs::remove_file(&log).ok();
}
