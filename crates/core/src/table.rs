// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table identity and storage modes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Durability model of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageMode {
    /// Changes are appended to the table log and applied to base storage later
    #[serde(rename = "WAL")]
    Wal,
    /// Changes are written straight to base storage
    #[serde(rename = "BYPASS_WAL")]
    BypassWal,
}

impl StorageMode {
    pub fn is_wal(self) -> bool {
        matches!(self, StorageMode::Wal)
    }

    /// Statement spelling (`WAL` / `BYPASS WAL`)
    pub fn sql_name(self) -> &'static str {
        match self {
            StorageMode::Wal => "WAL",
            StorageMode::BypassWal => "BYPASS WAL",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::Wal => write!(f, "WAL"),
            StorageMode::BypassWal => write!(f, "BYPASS_WAL"),
        }
    }
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: Vec<String> = s.split_whitespace().map(str::to_ascii_uppercase).collect();
        match normalized.join(" ").as_str() {
            "WAL" => Ok(StorageMode::Wal),
            "BYPASS WAL" | "BYPASS_WAL" => Ok(StorageMode::BypassWal),
            other => Err(format!("unknown storage mode: {other}")),
        }
    }
}

/// Numeric table identifier, allocated once by the catalog and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub u32);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time partitioning of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartitionBy {
    #[default]
    None,
    Hour,
    Day,
    Month,
    Year,
}

impl PartitionBy {
    pub fn is_partitioned(self) -> bool {
        !matches!(self, PartitionBy::None)
    }
}

impl FromStr for PartitionBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(PartitionBy::None),
            "HOUR" => Ok(PartitionBy::Hour),
            "DAY" => Ok(PartitionBy::Day),
            "MONTH" => Ok(PartitionBy::Month),
            "YEAR" => Ok(PartitionBy::Year),
            other => Err(format!("unknown partition unit: {other}")),
        }
    }
}

/// Identifies a table
///
/// Everything except `mode` is fixed when the table is created. The mode is
/// only ever changed by the storage-mode converter, which hands out a new
/// token through [`TableToken::with_mode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableToken {
    name: String,
    dir_name: String,
    id: TableId,
    mode: StorageMode,
}

impl TableToken {
    pub fn new(
        name: impl Into<String>,
        dir_name: impl Into<String>,
        id: TableId,
        mode: StorageMode,
    ) -> Self {
        Self {
            name: name.into(),
            dir_name: dir_name.into(),
            id,
            mode,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    pub fn is_wal(&self) -> bool {
        self.mode.is_wal()
    }

    pub fn with_mode(&self, mode: StorageMode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }
}

impl fmt::Display for TableToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [id={}, dir={}]", self.name, self.id, self.dir_name)
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
