// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `quill tables`

use crate::output::{print_list, OutputFormat};
use clap::Args;
use quill_engine::{Engine, TableInfo};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct TablesArgs {
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct TableRow {
    name: String,
    id: u32,
    mode: String,
    rows: usize,
    pending_records: u64,
    pending_conversion: Option<String>,
}

impl From<&TableInfo> for TableRow {
    fn from(info: &TableInfo) -> Self {
        Self {
            name: info.token.name().to_string(),
            id: info.token.id().0,
            mode: info.token.mode().to_string(),
            rows: info.rows,
            pending_records: info.pending_records,
            pending_conversion: info.pending_conversion.map(|m| m.to_string()),
        }
    }
}

impl fmt::Display for TableRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<20} {:<10} rows={:<6} pending={}",
            self.name, self.mode, self.rows, self.pending_records
        )?;
        if let Some(target) = &self.pending_conversion {
            write!(f, " [-> {target}]")?;
        }
        Ok(())
    }
}

pub fn handle(engine: &Engine, args: TablesArgs) -> anyhow::Result<()> {
    print(engine, args.format);
    Ok(())
}

/// Print the table listing as of `engine`'s current state
pub fn print(engine: &Engine, format: OutputFormat) {
    let rows: Vec<TableRow> = engine.tables().iter().map(TableRow::from).collect();
    if rows.is_empty() && matches!(format, OutputFormat::Text) {
        println!("No tables");
        return;
    }
    print_list(&rows, format);
}
