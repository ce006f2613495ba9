// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use quill_core::Value;
use std::fs;

fn insert(v: i32) -> LogRecord {
    LogRecord::Insert {
        rows: vec![vec![Value::Int(v)]],
    }
}

fn change(sql: &str) -> LogRecord {
    LogRecord::Change(ChangeRecord {
        kind: OperationKind::Update,
        sql: sql.to_string(),
        context: ContextSnapshot {
            binds: Vec::new(),
            seed0: 1,
            seed1: 2,
            now_micros: 3,
        },
    })
}

#[test]
fn append_assigns_increasing_sequences() {
    let dir = tempfile::tempdir().unwrap();
    let mut wal = TableWal::open(&dir.path().join("wal.jsonl"), 0).unwrap();

    assert_eq!(wal.append(insert(1)).unwrap(), 1);
    assert_eq!(wal.append(change("update t set x = 1")).unwrap(), 2);
    assert_eq!(wal.len(), 2);

    let entries = wal.entries_after(0).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].record, insert(1));
    assert_eq!(entries[1].record, change("update t set x = 1"));
}

#[test]
fn entries_after_skips_applied() {
    let dir = tempfile::tempdir().unwrap();
    let mut wal = TableWal::open(&dir.path().join("wal.jsonl"), 0).unwrap();
    for i in 0..4 {
        wal.append(insert(i)).unwrap();
    }

    let seqs: Vec<u64> = wal.entries_after(2).unwrap().iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![3, 4]);
}

#[test]
fn reopen_continues_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    {
        let mut wal = TableWal::open(&path, 0).unwrap();
        wal.append(insert(1)).unwrap();
        wal.append(insert(2)).unwrap();
    }

    let mut wal = TableWal::open(&path, 0).unwrap();
    assert_eq!(wal.len(), 2);
    assert_eq!(wal.append(insert(3)).unwrap(), 3);
}

#[test]
fn truncate_keeps_numbering_above_floor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    {
        let mut wal = TableWal::open(&path, 0).unwrap();
        wal.append(insert(1)).unwrap();
        wal.append(insert(2)).unwrap();
        wal.truncate().unwrap();
        assert!(wal.is_empty());
    }

    let mut wal = TableWal::open(&path, 2).unwrap();
    assert!(wal.entries_after(0).unwrap().is_empty());
    assert_eq!(wal.append(insert(3)).unwrap(), 3);
}

#[test]
fn torn_tail_is_cut_off() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    {
        let mut wal = TableWal::open(&path, 0).unwrap();
        wal.append(insert(1)).unwrap();
    }
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("{\"seq\":2,\"rec");
    fs::write(&path, content).unwrap();

    let mut wal = TableWal::open(&path, 0).unwrap();
    assert_eq!(wal.len(), 1);
    assert_eq!(wal.append(insert(2)).unwrap(), 2);

    let seqs: Vec<u64> = wal.entries_after(0).unwrap().iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![1, 2]);
}

#[test]
fn checksum_mismatch_stops_scan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    {
        let mut wal = TableWal::open(&path, 0).unwrap();
        wal.append(insert(1)).unwrap();
        wal.append(insert(2)).unwrap();
        wal.append(insert(3)).unwrap();
    }
    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    let tampered = lines[1].replace("\"Int\":2", "\"Int\":9");
    assert_ne!(tampered, lines[1]);
    fs::write(&path, format!("{}\n{}\n{}\n", lines[0], tampered, lines[2])).unwrap();

    let wal = TableWal::open(&path, 0).unwrap();
    assert_eq!(wal.len(), 1);
    assert_eq!(wal.next_seq(), 2);
}

#[test]
fn entry_verify_detects_tampering() {
    let mut entry = LogEntry::new(1, insert(1));
    assert!(entry.verify());
    entry.record = insert(2);
    assert!(!entry.verify());
}
