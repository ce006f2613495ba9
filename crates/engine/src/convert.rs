// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage-mode conversion
//!
//! A conversion is requested by durably writing a marker into the table
//! directory and performed the next time the table is opened. The marker is
//! deleted last, so a crash at any point leaves either the marker (the whole
//! conversion is redone) or a fully converted table. Every step is
//! idempotent: draining an empty backlog and re-setting the same mode are
//! no-ops.

use crate::compiler::OperationCompiler;
use crate::lane::Lane;
use quill_core::StorageMode;
use quill_storage::{ConversionMarker, StorageError, TableStore};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{0}")]
    Precondition(String),
    #[error("conversion marker I/O failed [path={}]: {source}", path.display())]
    Durability {
        path: PathBuf,
        #[source]
        source: StorageError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What opening a table did about its marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// No marker present
    None,
    /// Marker belonged to another table id (or was unreadable) and was removed
    Stale,
    /// Marker asked for a mode the table cannot take and was removed
    Rejected { target: StorageMode },
    /// Table was already in the target mode; marker removed
    AlreadyInMode(StorageMode),
    Converted { from: StorageMode, to: StorageMode },
}

/// Validate the request and durably record it
///
/// Nothing is written when the table is not eligible. Requesting the
/// current mode is accepted and cleaned up by the next open.
pub fn schedule_conversion(store: &TableStore, target: StorageMode) -> Result<(), ConvertError> {
    if target.is_wal() && !store.is_partitioned() {
        return Err(ConvertError::Precondition(format!(
            "cannot convert non-partitioned table to WAL [table={}]",
            store.name()
        )));
    }
    ConversionMarker::new(target, store.id())
        .write(store.dir())
        .map_err(|source| ConvertError::Durability {
            path: store.marker_path(),
            source,
        })?;
    info!(
        table = %store.name(),
        from = %store.mode(),
        to = %target,
        "storage mode conversion scheduled for next open"
    );
    Ok(())
}

/// Apply a pending conversion, if any; caller holds the table's lane
pub fn check_and_apply_on_open(
    lane: &mut Lane,
    compiler: &mut OperationCompiler,
) -> Result<ConversionOutcome, ConvertError> {
    let dir = lane.store().dir().to_path_buf();
    let marker = match ConversionMarker::read(&dir) {
        Ok(Some(marker)) => marker,
        Ok(None) => return Ok(ConversionOutcome::None),
        Err(StorageError::Corrupt { reason, .. }) => {
            warn!(table = %lane.token(), %reason, "discarding unreadable conversion marker");
            remove_marker(lane)?;
            return Ok(ConversionOutcome::Stale);
        }
        Err(e) => {
            return Err(ConvertError::Durability {
                path: lane.store().marker_path(),
                source: e,
            })
        }
    };

    if marker.table_id != lane.id() {
        warn!(
            table = %lane.token(),
            marker_table_id = marker.table_id.0,
            "removing conversion marker left by another table"
        );
        remove_marker(lane)?;
        return Ok(ConversionOutcome::Stale);
    }

    let from = lane.store().mode();
    let to = marker.target_mode;
    if from == to {
        remove_marker(lane)?;
        info!(table = %lane.token(), mode = %to, "table already in requested mode");
        return Ok(ConversionOutcome::AlreadyInMode(to));
    }

    if to.is_wal() && !lane.store().is_partitioned() {
        warn!(table = %lane.token(), "removing WAL conversion marker on non-partitioned table");
        remove_marker(lane)?;
        return Ok(ConversionOutcome::Rejected { target: to });
    }

    info!(table = %lane.token(), %from, %to, "converting table storage mode");
    let drained = lane.drain(compiler)?;
    lane.truncate_log()?;
    lane.set_mode(to)?;
    remove_marker(lane)?;
    info!(table = %lane.token(), drained, %from, %to, "table storage mode converted");
    Ok(ConversionOutcome::Converted { from, to })
}

/// Target of a marker written for this table, if one is pending
pub fn pending_conversion(store: &TableStore) -> Option<StorageMode> {
    match ConversionMarker::read(store.dir()) {
        Ok(Some(marker)) if marker.table_id == store.id() => Some(marker.target_mode),
        _ => None,
    }
}

fn remove_marker(lane: &Lane) -> Result<(), ConvertError> {
    ConversionMarker::remove(lane.store().dir())
        .map(|_| ())
        .map_err(|source| ConvertError::Durability {
            path: lane.store().marker_path(),
            source,
        })
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
