//! Block ingestion: file-parsing adapters that produce the initial queue.
//!
//! Two formats are supported, dispatched on file extension:
//!
//! - **Tabular (`.csv`)**: headerless rows of `time,size[,key_frame]`; each
//!   row becomes one block with the configured fixed deadline.
//! - **Pattern (anything else)**: a header line with the total block count
//!   `N`, followed by a repeating cycle of `type,size,deadline` rows. Block
//!   `idx` uses cycle row `idx % period` and arrives at
//!   `base_time + idx * inter_arrival`.
//!
//! Malformed input is a fatal configuration error: the run must abort
//! before simulation starts.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::models::Block;

/// Errors raised while parsing block files.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("block file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected 2 or 3 columns, found {found}")]
    ColumnCount { line: usize, found: usize },

    #[error("line {line}: invalid {field} value {value:?}")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("pattern file is missing the block-count header")]
    MissingHeader,

    #[error("pattern file declares {declared} blocks but has no cycle rows")]
    EmptyPattern { declared: usize },
}

/// Ingestion parameters.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Fixed deadline assigned to every CSV row (seconds)
    pub csv_deadline: f64,

    /// Inter-arrival interval for pattern-generated blocks (seconds)
    pub inter_arrival: f64,

    /// Arrival time of the first pattern-generated block (seconds)
    pub base_time: f64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            csv_deadline: 0.2,
            inter_arrival: 0.1,
            base_time: 0.0,
        }
    }
}

/// Produces blocks from input files, assigning sequential block ids
/// starting at 1 across every file it loads.
#[derive(Debug)]
pub struct BlockSource {
    config: IngestConfig,
    next_block_id: u64,
}

impl BlockSource {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            next_block_id: 1,
        }
    }

    /// Load one block file, dispatching on the `.csv` extension.
    pub fn load(&mut self, path: &Path) -> Result<Vec<Block>, IngestError> {
        let contents = fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "csv") {
            self.parse_csv(&contents)
        } else {
            self.parse_pattern(&contents)
        }
    }

    /// Parse tabular rows of `time,size[,key_frame]`.
    pub fn parse_csv(&mut self, contents: &str) -> Result<Vec<Block>, IngestError> {
        let mut blocks = Vec::new();
        for (line_no, line) in nonempty_lines(contents) {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != 2 && fields.len() != 3 {
                return Err(IngestError::ColumnCount {
                    line: line_no,
                    found: fields.len(),
                });
            }

            let timestamp = parse_f64(fields[0], line_no, "time")?;
            let size = parse_size(fields[1], line_no)?;
            // The optional third column (key_frame) is carried as the
            // scheduling hint; the engine treats it as opaque.
            let mut block = Block::new(self.take_id(), size, self.config.csv_deadline, timestamp);
            if let Some(key_frame) = fields.get(2) {
                block = block.with_priority((*key_frame).to_string());
            }
            blocks.push(block);
        }
        Ok(blocks)
    }

    /// Parse a pattern file: `N` header plus a `type,size,deadline` cycle.
    pub fn parse_pattern(&mut self, contents: &str) -> Result<Vec<Block>, IngestError> {
        let mut lines = nonempty_lines(contents);
        let (header_line, header) = lines.next().ok_or(IngestError::MissingHeader)?;
        let block_nums: usize =
            header
                .trim()
                .parse()
                .map_err(|_| IngestError::InvalidField {
                    line: header_line,
                    field: "block count",
                    value: header.to_string(),
                })?;

        struct PatternRow {
            kind: String,
            size: u64,
            deadline: f64,
        }

        let mut pattern = Vec::new();
        for (line_no, line) in lines {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != 3 {
                return Err(IngestError::ColumnCount {
                    line: line_no,
                    found: fields.len(),
                });
            }
            pattern.push(PatternRow {
                kind: fields[0].to_string(),
                size: parse_size(fields[1], line_no)?,
                deadline: parse_f64(fields[2], line_no, "deadline")?,
            });
        }
        if pattern.is_empty() {
            if block_nums == 0 {
                return Ok(Vec::new());
            }
            return Err(IngestError::EmptyPattern {
                declared: block_nums,
            });
        }

        let period = pattern.len();
        let mut blocks = Vec::with_capacity(block_nums);
        for idx in 0..block_nums {
            let row = &pattern[idx % period];
            let timestamp = self.config.base_time + idx as f64 * self.config.inter_arrival;
            blocks.push(
                Block::new(self.take_id(), row.size, row.deadline, timestamp)
                    .with_priority(row.kind.clone()),
            );
        }
        Ok(blocks)
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_block_id;
        self.next_block_id += 1;
        id
    }
}

/// Lines with content, paired with their 1-based line numbers.
fn nonempty_lines(contents: &str) -> impl Iterator<Item = (usize, &str)> {
    contents
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

fn parse_f64(value: &str, line: usize, field: &'static str) -> Result<f64, IngestError> {
    let parsed: f64 = value.parse().map_err(|_| IngestError::InvalidField {
        line,
        field,
        value: value.to_string(),
    })?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(IngestError::InvalidField {
            line,
            field,
            value: value.to_string(),
        });
    }
    Ok(parsed)
}

/// Sizes may be written as floats in pattern files; they round to whole
/// bytes and must stay positive.
fn parse_size(value: &str, line: usize) -> Result<u64, IngestError> {
    let parsed: f64 = value.parse().map_err(|_| IngestError::InvalidField {
        line,
        field: "size",
        value: value.to_string(),
    })?;
    if !parsed.is_finite() || parsed < 1.0 {
        return Err(IngestError::InvalidField {
            line,
            field: "size",
            value: value.to_string(),
        });
    }
    Ok(parsed.round() as u64)
}
