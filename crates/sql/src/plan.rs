// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bound plans produced by the compiler

use quill_core::{ColumnDef, Expr, PartitionBy, Predicate, StorageMode, TableToken};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTablePlan {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub timestamp: Option<String>,
    pub partition_by: PartitionBy,
    pub mode: StorageMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertPlan {
    pub table: TableToken,
    /// Explicit column list; `None` means all columns in table order
    pub columns: Option<Vec<String>>,
    pub rows: Vec<Vec<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Count,
    Columns(Vec<String>),
}

/// Reusable read plan, the value held by the query plan cache
#[derive(Debug, Clone, PartialEq)]
pub struct SelectPlan {
    pub table: TableToken,
    pub projection: Projection,
    pub filter: Option<Predicate>,
}
