// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory image of a table's durable base state

use crate::value::{ColumnDef, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub columns: Vec<ColumnDef>,
    /// Name of the designated timestamp column, if any
    pub timestamp: Option<String>,
    pub rows: Vec<Row>,
    /// Highest table-log sequence folded into this state
    #[serde(default)]
    pub applied_seq: u64,
    /// Bumped on every structural change
    #[serde(default)]
    pub structure_version: u64,
}

impl TableData {
    pub fn new(columns: Vec<ColumnDef>, timestamp: Option<String>) -> Self {
        Self {
            columns,
            timestamp,
            rows: Vec::new(),
            applied_seq: 0,
            structure_version: 0,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn is_designated_timestamp(&self, name: &str) -> bool {
        self.timestamp
            .as_deref()
            .is_some_and(|ts| ts.eq_ignore_ascii_case(name))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
