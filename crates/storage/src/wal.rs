// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-table sequential log
//!
//! WAL-mode tables append inserts and change records here; the apply
//! pipeline folds them into the table's base data in sequence order.
//! Each line is one JSON [`LogEntry`] carrying a CRC32 of its record.

use crate::StorageError;
use quill_core::{ContextSnapshot, OperationKind, Row};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Durable form of a change statement
///
/// The statement text is recompiled on replay after the context is restored
/// from `context`, so the replayed operation matches the one first compiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub kind: OperationKind,
    pub sql: String,
    pub context: ContextSnapshot,
}

/// Payload of one log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogRecord {
    Insert { rows: Vec<Row> },
    Change(ChangeRecord),
}

/// A single entry in the table log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub seq: u64,
    pub record: LogRecord,
    /// CRC32 of the serialized record
    pub checksum: u32,
}

impl LogEntry {
    pub fn new(seq: u64, record: LogRecord) -> Self {
        let checksum = checksum(&record);
        Self {
            seq,
            record,
            checksum,
        }
    }

    pub fn verify(&self) -> bool {
        self.checksum == checksum(&self.record)
    }
}

fn checksum(record: &LogRecord) -> u32 {
    // LogRecord holds only strings, numbers and enums, so serialization cannot fail
    let json = serde_json::to_string(record).unwrap_or_default();
    crc32fast::hash(json.as_bytes())
}

/// Append-only table log
pub struct TableWal {
    path: PathBuf,
    file: File,
    next_seq: u64,
    len: usize,
}

impl TableWal {
    /// Open or create the log at `path`
    ///
    /// Sequences continue above `floor`, the highest sequence already folded
    /// into base data, so numbering stays monotonic across truncation. A
    /// corrupt or torn tail is cut off.
    pub fn open(path: &Path, floor: u64) -> Result<Self, StorageError> {
        let scan = scan(path)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if scan.valid_bytes < scan.total_bytes {
            warn!(
                path = %path.display(),
                dropped_bytes = scan.total_bytes - scan.valid_bytes,
                "truncating corrupt table log tail"
            );
            file.set_len(scan.valid_bytes)?;
            file.sync_all()?;
        }
        let last = scan.entries.last().map(|e| e.seq).unwrap_or(0);
        Ok(Self {
            path: path.to_path_buf(),
            file,
            next_seq: last.max(floor) + 1,
            len: scan.entries.len(),
        })
    }

    /// Append a record; it is fsync'd before the sequence is returned
    pub fn append(&mut self, record: LogRecord) -> Result<u64, StorageError> {
        let seq = self.next_seq;
        let mut line = serde_json::to_string(&LogEntry::new(seq, record))?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.sync_all()?;
        self.next_seq += 1;
        self.len += 1;
        Ok(seq)
    }

    /// Entries with a sequence above `seq`, in order
    pub fn entries_after(&self, seq: u64) -> Result<Vec<LogEntry>, StorageError> {
        Ok(scan(&self.path)?
            .entries
            .into_iter()
            .filter(|e| e.seq > seq)
            .collect())
    }

    /// Discard every entry
    pub fn truncate(&mut self) -> Result<(), StorageError> {
        self.file.set_len(0)?;
        self.file.sync_all()?;
        self.len = 0;
        Ok(())
    }

    /// Sequence the next append will receive
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Entries currently in the file
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

struct Scan {
    entries: Vec<LogEntry>,
    valid_bytes: u64,
    total_bytes: u64,
}

/// Read entries up to the first unreadable, unparseable or mismatched line
fn scan(path: &Path) -> Result<Scan, StorageError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Scan {
                entries: Vec::new(),
                valid_bytes: 0,
                total_bytes: 0,
            })
        }
        Err(e) => return Err(e.into()),
    };
    let total_bytes = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let mut entries = Vec::new();
    let mut valid_bytes = 0u64;
    let mut line = String::new();

    loop {
        line.clear();
        let read = match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(n) => n as u64,
        };
        // A line without its newline is a torn write
        if !line.ends_with('\n') {
            break;
        }
        let text = line.trim_end();
        if text.is_empty() {
            valid_bytes += read;
            continue;
        }
        match serde_json::from_str::<LogEntry>(text) {
            Ok(entry) if entry.verify() => {
                entries.push(entry);
                valid_bytes += read;
            }
            _ => break,
        }
    }

    Ok(Scan {
        entries,
        valid_bytes,
        total_bytes,
    })
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
