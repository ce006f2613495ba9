// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed, unbound statements

use quill_core::{AlterAction, ColumnDef, Expr, PartitionBy, Predicate, StorageMode};

/// A table name with its position in the statement text
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub name: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable {
        table: TableRef,
        columns: Vec<ColumnDef>,
        timestamp: Option<(String, usize)>,
        partition_by: PartitionBy,
        mode: Option<StorageMode>,
    },
    DropTable {
        table: TableRef,
    },
    Insert {
        table: TableRef,
        columns: Option<Vec<String>>,
        rows: Vec<Vec<Expr>>,
    },
    Alter {
        table: TableRef,
        action: AlterAction,
    },
    SetType {
        table: TableRef,
        mode: StorageMode,
    },
    Update {
        table: TableRef,
        assignments: Vec<(String, Expr)>,
        filter: Option<Predicate>,
    },
    Select {
        table: TableRef,
        projection: crate::plan::Projection,
        filter: Option<Predicate>,
    },
}
