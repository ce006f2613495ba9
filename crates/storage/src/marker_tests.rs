// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn write_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let marker = ConversionMarker::new(StorageMode::Wal, TableId(7));

    marker.write(dir.path()).unwrap();

    assert!(ConversionMarker::exists(dir.path()));
    assert_eq!(ConversionMarker::read(dir.path()).unwrap(), Some(marker));
}

#[test]
fn read_missing_is_none() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(ConversionMarker::read(dir.path()).unwrap(), None);
    assert!(!ConversionMarker::remove(dir.path()).unwrap());
}

#[test]
fn rewrite_replaces_target() {
    let dir = tempfile::tempdir().unwrap();
    ConversionMarker::new(StorageMode::Wal, TableId(1))
        .write(dir.path())
        .unwrap();
    ConversionMarker::new(StorageMode::BypassWal, TableId(1))
        .write(dir.path())
        .unwrap();

    let marker = ConversionMarker::read(dir.path()).unwrap().unwrap();
    assert_eq!(marker.target_mode, StorageMode::BypassWal);
}

#[test]
fn remove_deletes_file() {
    let dir = tempfile::tempdir().unwrap();
    ConversionMarker::new(StorageMode::Wal, TableId(1))
        .write(dir.path())
        .unwrap();

    assert!(ConversionMarker::remove(dir.path()).unwrap());
    assert!(!ConversionMarker::exists(dir.path()));
}

#[test]
fn garbage_marker_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(ConversionMarker::path(dir.path()), b"not json").unwrap();

    let err = ConversionMarker::read(dir.path()).unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { .. }));
}

#[test]
fn on_disk_format_names_mode() {
    let dir = tempfile::tempdir().unwrap();
    ConversionMarker::new(StorageMode::BypassWal, TableId(3))
        .write(dir.path())
        .unwrap();

    let text = std::fs::read_to_string(ConversionMarker::path(dir.path())).unwrap();
    assert_eq!(text, r#"{"target_mode":"BYPASS_WAL","table_id":3}"#);
}
