// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! quill-core: shared data model for the quill change-application core
//!
//! This crate provides:
//! - Table identity (`TableToken`) and storage modes
//! - The per-worker `ExecutionContext` (bind variables, reseedable random
//!   source, fixable clock, table-name remapping)
//! - Immutable, replayable `Operation`s and their application to table data

pub mod bind;
pub mod clock;
pub mod context;
pub mod data;
pub mod expr;
pub mod operation;
pub mod rnd;
pub mod table;
pub mod value;

pub use bind::{BindKey, BindVariables};
pub use clock::{Clock, FakeClock, SystemClock};
pub use context::{ContextSnapshot, ExecutionContext, NoTables, TableResolver};
pub use data::TableData;
pub use expr::{Expr, Predicate};
pub use operation::{
    AlterAction, AlterOperation, ApplyError, ApplyOutcome, Operation, OperationKind,
    UpdateOperation,
};
pub use rnd::Rnd;
pub use table::{PartitionBy, StorageMode, TableId, TableToken};
pub use value::{ColumnDef, ColumnType, Row, Value};
