// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending storage-mode conversion marker
//!
//! The marker's presence on disk is the only record that a conversion was
//! requested. It is written with [`write_atomic`] and removed only once the
//! conversion has been committed.

use crate::fs::{remove_durable, write_atomic};
use crate::StorageError;
use quill_core::{StorageMode, TableId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MARKER_FILE: &str = "_convert";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionMarker {
    pub target_mode: StorageMode,
    /// Identity of the table that requested the conversion; a marker left in
    /// a directory now owned by another table is stale
    pub table_id: TableId,
}

impl ConversionMarker {
    pub fn new(target_mode: StorageMode, table_id: TableId) -> Self {
        Self {
            target_mode,
            table_id,
        }
    }

    pub fn path(table_dir: &Path) -> PathBuf {
        table_dir.join(MARKER_FILE)
    }

    /// Durably write the marker into `table_dir`, replacing any previous one
    pub fn write(&self, table_dir: &Path) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(self)?;
        write_atomic(&Self::path(table_dir), &bytes)?;
        Ok(())
    }

    /// Read the marker, if one is present
    pub fn read(table_dir: &Path) -> Result<Option<Self>, StorageError> {
        let path = Self::path(table_dir);
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                path,
                reason: e.to_string(),
            })
    }

    /// Durably remove the marker; returns whether one existed
    pub fn remove(table_dir: &Path) -> Result<bool, StorageError> {
        Ok(remove_durable(&Self::path(table_dir))?)
    }

    pub fn exists(table_dir: &Path) -> bool {
        Self::path(table_dir).exists()
    }
}

#[cfg(test)]
#[path = "marker_tests.rs"]
mod tests;
