// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-table apply lane
//!
//! A lane owns a table's base data and its log. The engine keeps each lane
//! behind its own mutex; holding that mutex is the table's barrier, so
//! appends, applies and conversion for one table never interleave while
//! other tables proceed.

use crate::compiler::OperationCompiler;
use crate::EngineError;
use quill_core::{
    ApplyError, NoTables, Operation, OperationKind, Row, StorageMode, TableData, TableId,
    TableToken,
};
use quill_storage::{ChangeRecord, LogRecord, StorageError, TableStore, TableWal};
use tracing::{debug, error};

/// Result of handing a change to a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Applied to base data
    Now { rows_affected: usize },
    /// Appended to the table log at `seq`
    Logged { seq: u64 },
}

pub struct Lane {
    store: TableStore,
    wal: TableWal,
    token: TableToken,
    /// Base structure with every pending ALTER applied; no rows
    schema: TableData,
    dropped: bool,
}

impl Lane {
    /// Open the table's log and project pending structure changes
    pub fn open(store: TableStore, compiler: &mut OperationCompiler) -> Result<Self, StorageError> {
        let wal = store.open_wal()?;
        let token = store.token();
        let schema = schema_of(store.data());
        let mut lane = Self {
            store,
            wal,
            token,
            schema,
            dropped: false,
        };
        lane.project_pending(compiler)?;
        Ok(lane)
    }

    pub fn token(&self) -> &TableToken {
        &self.token
    }

    pub fn id(&self) -> TableId {
        self.token.id()
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn data(&self) -> &TableData {
        self.store.data()
    }

    /// Structure new statements are checked against
    pub fn schema(&self) -> &TableData {
        &self.schema
    }

    /// Log entries not yet folded into base data
    pub fn pending(&self) -> u64 {
        self.wal
            .next_seq()
            .saturating_sub(1)
            .saturating_sub(self.store.data().applied_seq)
    }

    /// Insert rows shaped to [`Lane::schema`]
    pub fn insert(&mut self, rows: Vec<Row>) -> Result<Applied, StorageError> {
        if self.token.is_wal() {
            let seq = self.wal.append(LogRecord::Insert { rows })?;
            return Ok(Applied::Logged { seq });
        }
        let rows_affected = rows.len();
        self.store.append_rows(rows)?;
        Ok(Applied::Now { rows_affected })
    }

    /// Apply or log a bound operation
    ///
    /// Structure and bind errors are reported here for both modes. Row-level
    /// failures of a logged UPDATE surface only when it is applied.
    pub fn change(&mut self, operation: &Operation, sql: &str) -> Result<Applied, EngineError> {
        let context = operation.context().cloned().ok_or(ApplyError::Unbound)?;
        if !self.token.is_wal() {
            let mut next = self.store.data().clone();
            let outcome = operation.apply(&mut next)?;
            self.store.commit(next)?;
            if outcome.structure_changed {
                self.schema = schema_of(self.store.data());
            }
            return Ok(Applied::Now {
                rows_affected: outcome.rows_affected,
            });
        }

        let mut schema = self.schema.clone();
        operation.apply(&mut schema)?;
        let seq = self.wal.append(LogRecord::Change(ChangeRecord {
            kind: operation.kind(),
            sql: sql.to_string(),
            context,
        }))?;
        self.schema = schema;
        Ok(Applied::Logged { seq })
    }

    /// Fold every pending log entry into base data, in sequence order
    ///
    /// Entries that no longer apply are skipped with an error log; their
    /// sequence still counts as applied so the table does not stall. Base
    /// data and the applied sequence are committed together.
    pub fn drain(&mut self, compiler: &mut OperationCompiler) -> Result<usize, StorageError> {
        let entries = self.wal.entries_after(self.store.data().applied_seq)?;
        if entries.is_empty() {
            return Ok(0);
        }

        let mut next = self.store.data().clone();
        for entry in &entries {
            match &entry.record {
                LogRecord::Insert { rows } => {
                    let width = next.columns.len();
                    if rows.iter().all(|row| row.len() == width) {
                        next.rows.extend(rows.iter().cloned());
                    } else {
                        error!(
                            table = %self.token,
                            seq = entry.seq,
                            "skipping insert with mismatched row width"
                        );
                    }
                }
                LogRecord::Change(record) => {
                    let result = compiler
                        .compile_change(record, &self.token, &NoTables)
                        .map_err(EngineError::from)
                        .and_then(|op| op.apply(&mut next).map_err(EngineError::from));
                    if let Err(e) = result {
                        error!(
                            table = %self.token,
                            seq = entry.seq,
                            error = %e,
                            "skipping change record"
                        );
                    }
                }
            }
            next.applied_seq = entry.seq;
        }

        self.store.commit(next)?;
        self.schema = schema_of(self.store.data());
        debug!(table = %self.token, applied = entries.len(), "drained table log");
        Ok(entries.len())
    }

    /// Set once the table is dropped; holders of a stale handle must not write
    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    pub(crate) fn mark_dropped(&mut self) {
        self.dropped = true;
    }

    /// Drop log entries; only valid once they are all applied
    pub(crate) fn truncate_log(&mut self) -> Result<(), StorageError> {
        self.wal.truncate()
    }

    pub(crate) fn set_mode(&mut self, mode: StorageMode) -> Result<(), StorageError> {
        self.store.set_mode(mode)?;
        self.token = self.token.with_mode(mode);
        Ok(())
    }

    fn project_pending(&mut self, compiler: &mut OperationCompiler) -> Result<(), StorageError> {
        for entry in self.wal.entries_after(self.store.data().applied_seq)? {
            let LogRecord::Change(record) = &entry.record else {
                continue;
            };
            if record.kind != OperationKind::Alter {
                continue;
            }
            if let Ok(op) = compiler.compile_change(record, &self.token, &NoTables) {
                // A failing ALTER fails the same way when drained
                op.apply(&mut self.schema).ok();
            }
        }
        Ok(())
    }
}

fn schema_of(data: &TableData) -> TableData {
    TableData {
        columns: data.columns.clone(),
        timestamp: data.timestamp.clone(),
        rows: Vec::new(),
        applied_seq: data.applied_seq,
        structure_version: data.structure_version,
    }
}

#[cfg(test)]
#[path = "lane_tests.rs"]
mod tests;
