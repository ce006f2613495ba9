// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! quill-storage: table storage for the quill engine
//!
//! ## Layout
//!
//! ```text
//! <root>/_tables.json          catalog registry (name -> id, directory)
//! <root>/<name>~<id>/
//!     _meta.json               identity, partitioning, storage mode
//!     _data.json               columns, rows, applied log sequence
//!     wal.jsonl                table log (WAL mode backlog)
//!     _convert                 pending storage-mode conversion marker
//! ```
//!
//! Every file except the table log is replaced with the durable-write
//! sequence in [`fs::write_atomic`]. The table log is append-only and fsync'd
//! per record.

pub mod catalog;
pub mod fs;
pub mod marker;
pub mod table;
pub mod wal;

pub use catalog::{Catalog, CatalogEntry};
pub use marker::ConversionMarker;
pub use table::{TableMeta, TableStore};
pub use wal::{ChangeRecord, LogEntry, LogRecord, TableWal};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("table does not exist [table={0}]")]
    TableNotFound(String),
    #[error("table already exists [table={0}]")]
    TableExists(String),
    #[error("corrupt table file {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}
