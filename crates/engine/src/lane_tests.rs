// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use quill_core::{ColumnDef, ColumnType, PartitionBy, Value};
use quill_storage::TableMeta;

fn store(dir: &std::path::Path, mode: StorageMode) -> TableStore {
    TableStore::create(
        &dir.join("t~1"),
        TableMeta {
            id: TableId(1),
            name: "t".to_string(),
            partition_by: PartitionBy::Day,
            mode,
        },
        TableData::new(
            vec![
                ColumnDef::new("ts", ColumnType::Timestamp),
                ColumnDef::new("x", ColumnType::Long),
            ],
            Some("ts".to_string()),
        ),
    )
    .unwrap()
}

fn compiler() -> OperationCompiler {
    let mut compiler = OperationCompiler::default();
    compiler.fix_clock(0);
    compiler
}

fn row(ts: i64, x: i64) -> Row {
    vec![Value::Timestamp(ts), Value::Long(x)]
}

#[test]
fn direct_insert_applies_now() {
    let dir = tempfile::tempdir().unwrap();
    let mut compiler = compiler();
    let mut lane = Lane::open(store(dir.path(), StorageMode::BypassWal), &mut compiler).unwrap();

    let applied = lane.insert(vec![row(1, 1), row(2, 2)]).unwrap();

    assert_eq!(applied, Applied::Now { rows_affected: 2 });
    assert_eq!(lane.data().row_count(), 2);
    assert_eq!(lane.pending(), 0);
}

#[test]
fn wal_insert_waits_for_drain() {
    let dir = tempfile::tempdir().unwrap();
    let mut compiler = compiler();
    let mut lane = Lane::open(store(dir.path(), StorageMode::Wal), &mut compiler).unwrap();

    assert_eq!(lane.insert(vec![row(1, 1)]).unwrap(), Applied::Logged { seq: 1 });
    assert_eq!(lane.data().row_count(), 0);
    assert_eq!(lane.pending(), 1);

    assert_eq!(lane.drain(&mut compiler).unwrap(), 1);
    assert_eq!(lane.data().row_count(), 1);
    assert_eq!(lane.data().applied_seq, 1);
    assert_eq!(lane.pending(), 0);
    assert_eq!(lane.drain(&mut compiler).unwrap(), 0);
}

#[test]
fn wal_alter_updates_schema_before_drain() {
    let dir = tempfile::tempdir().unwrap();
    let mut compiler = compiler();
    let mut lane = Lane::open(store(dir.path(), StorageMode::Wal), &mut compiler).unwrap();
    let token = lane.token().clone();

    let sql = "alter table t add column y int";
    let op = compiler.compile_alter(sql, &token, &NoTables).unwrap();
    lane.change(&op, sql).unwrap();

    assert_eq!(lane.schema().columns.len(), 3);
    assert_eq!(lane.data().columns.len(), 2);

    // Projection survives reopen
    drop(lane);
    let store = TableStore::open(&dir.path().join("t~1")).unwrap();
    let lane = Lane::open(store, &mut compiler).unwrap();
    assert_eq!(lane.schema().columns.len(), 3);
}

#[test]
fn wal_change_rejects_unknown_column_synchronously() {
    let dir = tempfile::tempdir().unwrap();
    let mut compiler = compiler();
    let mut lane = Lane::open(store(dir.path(), StorageMode::Wal), &mut compiler).unwrap();
    let token = lane.token().clone();

    let sql = "update t set nope = 1";
    let op = compiler.compile_update(sql, &token, &NoTables).unwrap();
    let err = lane.change(&op, sql).unwrap_err();

    assert!(matches!(err, EngineError::Apply(ApplyError::UnknownColumn(_))));
    assert_eq!(lane.pending(), 0);
}

#[test]
fn drain_applies_in_log_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut compiler = compiler();
    let mut lane = Lane::open(store(dir.path(), StorageMode::Wal), &mut compiler).unwrap();
    let token = lane.token().clone();

    lane.insert(vec![row(1, 1)]).unwrap();
    let sql = "update t set x = 10";
    let op = compiler.compile_update(sql, &token, &NoTables).unwrap();
    lane.change(&op, sql).unwrap();
    lane.insert(vec![row(2, 2)]).unwrap();

    lane.drain(&mut compiler).unwrap();

    assert_eq!(lane.data().rows, vec![row(1, 10), row(2, 2)]);
}

#[test]
fn failing_record_is_skipped_not_stalled() {
    let dir = tempfile::tempdir().unwrap();
    let mut compiler = compiler();
    let mut lane = Lane::open(store(dir.path(), StorageMode::Wal), &mut compiler).unwrap();
    let token = lane.token().clone();

    lane.insert(vec![row(1, 1)]).unwrap();
    // Passes the row-less schema check, fails on the row
    let sql = "update t set x = 'text'";
    let op = compiler.compile_update(sql, &token, &NoTables).unwrap();
    lane.change(&op, sql).unwrap();
    lane.insert(vec![row(2, 2)]).unwrap();

    assert_eq!(lane.drain(&mut compiler).unwrap(), 3);
    assert_eq!(lane.data().rows, vec![row(1, 1), row(2, 2)]);
    assert_eq!(lane.data().applied_seq, 3);
}

#[test]
fn direct_alter_refreshes_schema() {
    let dir = tempfile::tempdir().unwrap();
    let mut compiler = compiler();
    let mut lane = Lane::open(store(dir.path(), StorageMode::BypassWal), &mut compiler).unwrap();
    let token = lane.token().clone();

    let sql = "alter table t rename column x to y";
    let op = compiler.compile_alter(sql, &token, &NoTables).unwrap();
    lane.change(&op, sql).unwrap();

    assert_eq!(lane.schema().columns[1].name, "y");
    assert_eq!(lane.data().columns[1].name, "y");
}
