// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table directory: metadata and base data

use crate::fs::{sync_dir, write_atomic};
use crate::marker::ConversionMarker;
use crate::wal::TableWal;
use crate::StorageError;
use quill_core::{PartitionBy, Row, StorageMode, TableData, TableId, TableToken};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const META_FILE: &str = "_meta.json";
pub const DATA_FILE: &str = "_data.json";
pub const WAL_FILE: &str = "wal.jsonl";

/// Persisted table identity and storage mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    pub id: TableId,
    pub name: String,
    pub partition_by: PartitionBy,
    pub mode: StorageMode,
}

/// One table's directory
///
/// Base data always reflects every log entry up to `data().applied_seq`.
#[derive(Debug)]
pub struct TableStore {
    dir: PathBuf,
    meta: TableMeta,
    data: TableData,
}

impl TableStore {
    /// Create the directory and its files
    ///
    /// Metadata is written last; a directory without it was never created.
    pub fn create(dir: &Path, meta: TableMeta, data: TableData) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir)?;
        write_json(&dir.join(DATA_FILE), &data)?;
        write_json(&dir.join(META_FILE), &meta)?;
        if let Some(parent) = dir.parent() {
            sync_dir(parent)?;
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            meta,
            data,
        })
    }

    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        let meta: TableMeta = read_json(&dir.join(META_FILE))?;
        let data: TableData = read_json(&dir.join(DATA_FILE))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            meta,
            data,
        })
    }

    /// Open this table's log, numbering above the applied sequence
    pub fn open_wal(&self) -> Result<TableWal, StorageError> {
        TableWal::open(&self.dir.join(WAL_FILE), self.data.applied_seq)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn dir_name(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn meta(&self) -> &TableMeta {
        &self.meta
    }

    pub fn data(&self) -> &TableData {
        &self.data
    }

    pub fn id(&self) -> TableId {
        self.meta.id
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn mode(&self) -> StorageMode {
        self.meta.mode
    }

    pub fn is_partitioned(&self) -> bool {
        self.meta.partition_by.is_partitioned()
    }

    pub fn token(&self) -> TableToken {
        TableToken::new(
            self.meta.name.clone(),
            self.dir_name(),
            self.meta.id,
            self.meta.mode,
        )
    }

    pub fn marker_path(&self) -> PathBuf {
        ConversionMarker::path(&self.dir)
    }

    /// Append rows directly to base data
    pub fn append_rows(&mut self, rows: Vec<Row>) -> Result<(), StorageError> {
        let mut next = self.data.clone();
        next.rows.extend(rows);
        self.commit(next)
    }

    /// Durably replace base data; memory changes only after the write lands
    pub fn commit(&mut self, data: TableData) -> Result<(), StorageError> {
        write_json(&self.dir.join(DATA_FILE), &data)?;
        self.data = data;
        Ok(())
    }

    /// Durably record a new storage mode
    pub fn set_mode(&mut self, mode: StorageMode) -> Result<(), StorageError> {
        let meta = TableMeta {
            mode,
            ..self.meta.clone()
        };
        write_json(&self.dir.join(META_FILE), &meta)?;
        self.meta = meta;
        Ok(())
    }
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &bytes)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

pub(crate) fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    match std::fs::metadata(path) {
        Ok(_) => read_json(path).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
