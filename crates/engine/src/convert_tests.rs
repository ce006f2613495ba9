// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use quill_core::{ColumnDef, ColumnType, PartitionBy, TableData, TableId, Value};
use quill_storage::TableMeta;
use std::path::Path;

fn create(root: &Path, partition_by: PartitionBy, mode: StorageMode) -> TableStore {
    let timestamp = partition_by.is_partitioned().then(|| "ts".to_string());
    TableStore::create(
        &root.join("t~1"),
        TableMeta {
            id: TableId(1),
            name: "t".to_string(),
            partition_by,
            mode,
        },
        TableData::new(
            vec![
                ColumnDef::new("ts", ColumnType::Timestamp),
                ColumnDef::new("x", ColumnType::Long),
            ],
            timestamp,
        ),
    )
    .unwrap()
}

fn reopen(root: &Path, compiler: &mut OperationCompiler) -> Lane {
    Lane::open(TableStore::open(&root.join("t~1")).unwrap(), compiler).unwrap()
}

#[test]
fn non_partitioned_to_wal_is_rejected_without_marker() {
    let root = tempfile::tempdir().unwrap();
    let store = create(root.path(), PartitionBy::None, StorageMode::BypassWal);

    let err = schedule_conversion(&store, StorageMode::Wal).unwrap_err();

    assert!(matches!(err, ConvertError::Precondition(_)));
    assert!(err.to_string().contains("non-partitioned"));
    assert!(!store.marker_path().exists());
}

#[test]
fn non_partitioned_to_bypass_is_allowed() {
    let root = tempfile::tempdir().unwrap();
    let store = create(root.path(), PartitionBy::None, StorageMode::BypassWal);

    schedule_conversion(&store, StorageMode::BypassWal).unwrap();
    assert_eq!(pending_conversion(&store), Some(StorageMode::BypassWal));
}

#[test]
fn no_marker_is_no_outcome() {
    let root = tempfile::tempdir().unwrap();
    let mut compiler = OperationCompiler::default();
    create(root.path(), PartitionBy::Day, StorageMode::Wal);

    let mut lane = reopen(root.path(), &mut compiler);
    let outcome = check_and_apply_on_open(&mut lane, &mut compiler).unwrap();
    assert_eq!(outcome, ConversionOutcome::None);
}

#[test]
fn same_mode_marker_is_removed_without_mutation() {
    let root = tempfile::tempdir().unwrap();
    let mut compiler = OperationCompiler::default();
    let store = create(root.path(), PartitionBy::Day, StorageMode::BypassWal);
    schedule_conversion(&store, StorageMode::BypassWal).unwrap();
    let before = std::fs::read(store.dir().join("_data.json")).unwrap();

    let mut lane = reopen(root.path(), &mut compiler);
    let outcome = check_and_apply_on_open(&mut lane, &mut compiler).unwrap();

    assert_eq!(outcome, ConversionOutcome::AlreadyInMode(StorageMode::BypassWal));
    assert!(!lane.store().marker_path().exists());
    assert_eq!(std::fs::read(store.dir().join("_data.json")).unwrap(), before);
}

#[test]
fn stale_marker_is_removed() {
    let root = tempfile::tempdir().unwrap();
    let mut compiler = OperationCompiler::default();
    let store = create(root.path(), PartitionBy::Day, StorageMode::BypassWal);
    ConversionMarker::new(StorageMode::Wal, TableId(99))
        .write(store.dir())
        .unwrap();

    let mut lane = reopen(root.path(), &mut compiler);
    let outcome = check_and_apply_on_open(&mut lane, &mut compiler).unwrap();

    assert_eq!(outcome, ConversionOutcome::Stale);
    assert_eq!(lane.store().mode(), StorageMode::BypassWal);
    assert!(!lane.store().marker_path().exists());
}

#[test]
fn unreadable_marker_is_discarded() {
    let root = tempfile::tempdir().unwrap();
    let mut compiler = OperationCompiler::default();
    let store = create(root.path(), PartitionBy::Day, StorageMode::BypassWal);
    std::fs::write(store.marker_path(), b"{").unwrap();

    let mut lane = reopen(root.path(), &mut compiler);
    let outcome = check_and_apply_on_open(&mut lane, &mut compiler).unwrap();
    assert_eq!(outcome, ConversionOutcome::Stale);
}

#[test]
fn wal_marker_on_non_partitioned_table_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let mut compiler = OperationCompiler::default();
    let store = create(root.path(), PartitionBy::None, StorageMode::BypassWal);
    ConversionMarker::new(StorageMode::Wal, TableId(1))
        .write(store.dir())
        .unwrap();

    let mut lane = reopen(root.path(), &mut compiler);
    let outcome = check_and_apply_on_open(&mut lane, &mut compiler).unwrap();

    assert_eq!(
        outcome,
        ConversionOutcome::Rejected {
            target: StorageMode::Wal
        }
    );
    assert_eq!(lane.store().mode(), StorageMode::BypassWal);
}

#[test]
fn wal_to_bypass_drains_backlog() {
    let root = tempfile::tempdir().unwrap();
    let mut compiler = OperationCompiler::default();
    create(root.path(), PartitionBy::Day, StorageMode::Wal);
    let mut lane = reopen(root.path(), &mut compiler);
    lane.insert(vec![vec![Value::Timestamp(1), Value::Long(1)]])
        .unwrap();
    lane.insert(vec![vec![Value::Timestamp(2), Value::Long(2)]])
        .unwrap();
    schedule_conversion(lane.store(), StorageMode::BypassWal).unwrap();
    drop(lane);

    let mut lane = reopen(root.path(), &mut compiler);
    let outcome = check_and_apply_on_open(&mut lane, &mut compiler).unwrap();

    assert_eq!(
        outcome,
        ConversionOutcome::Converted {
            from: StorageMode::Wal,
            to: StorageMode::BypassWal
        }
    );
    assert_eq!(lane.data().row_count(), 2);
    assert_eq!(lane.pending(), 0);
    assert!(!lane.token().is_wal());
    assert!(!lane.store().marker_path().exists());

    // Redo on a converted table is a no-op
    let mut lane = reopen(root.path(), &mut compiler);
    let outcome = check_and_apply_on_open(&mut lane, &mut compiler).unwrap();
    assert_eq!(outcome, ConversionOutcome::None);
    assert_eq!(lane.data().row_count(), 2);
}

#[test]
fn marker_write_failure_leaves_no_marker() {
    let root = tempfile::tempdir().unwrap();
    let store = create(root.path(), PartitionBy::Day, StorageMode::BypassWal);
    std::fs::create_dir(store.dir().join("_convert.tmp")).unwrap();

    let err = schedule_conversion(&store, StorageMode::Wal).unwrap_err();

    assert!(matches!(err, ConvertError::Durability { .. }));
    assert!(!store.marker_path().exists());
}
