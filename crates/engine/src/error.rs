// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use crate::config::ConfigError;
use crate::convert::ConvertError;
use quill_core::ApplyError;
use quill_sql::CompileError;
use quill_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("data directory is locked by another process: {0}")]
    Locked(#[source] std::io::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("table does not exist [table={0}]")]
    TableNotFound(String),
    #[error("table does not exist [id={0}]")]
    UnknownTableId(u32),
    #[error("table is unavailable until the next open [table={table}]: {reason}")]
    TableUnavailable { table: String, reason: String },
    #[error("{0} is not a query")]
    NotAQuery(&'static str),
    #[error("column count does not match [expected={expected}, actual={actual}]")]
    ColumnCount { expected: usize, actual: usize },
}

impl EngineError {
    /// Target table no longer exists
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::TableNotFound(_)
                | EngineError::UnknownTableId(_)
                | EngineError::Storage(StorageError::TableNotFound(_))
        )
    }
}
