// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binds parsed statements to tables

use crate::ast::{Statement, TableRef};
use crate::error::CompileError;
use crate::parser::parse;
use crate::plan::{CreateTablePlan, InsertPlan, SelectPlan};
use quill_core::{
    AlterOperation, ColumnType, ExecutionContext, Operation, StorageMode, TableResolver,
    TableToken, UpdateOperation,
};
use std::collections::HashSet;

/// Result of compiling one statement
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledQuery {
    CreateTable(CreateTablePlan),
    DropTable(TableToken),
    Insert(InsertPlan),
    /// Unbound: the operation compiler attaches the context snapshot
    Alter(Operation),
    Update(Operation),
    SetType { table: TableToken, mode: StorageMode },
    Select(SelectPlan),
}

impl CompiledQuery {
    pub fn kind_name(&self) -> &'static str {
        match self {
            CompiledQuery::CreateTable(_) => "CREATE TABLE",
            CompiledQuery::DropTable(_) => "DROP TABLE",
            CompiledQuery::Insert(_) => "INSERT",
            CompiledQuery::Alter(_) => "ALTER",
            CompiledQuery::Update(_) => "UPDATE",
            CompiledQuery::SetType { .. } => "ALTER SET TYPE",
            CompiledQuery::Select(_) => "SELECT",
        }
    }
}

/// Turns statement text into a compiled query
///
/// Implementations may keep parse buffers between calls and are therefore
/// used by one thread at a time.
pub trait SqlCompiler {
    fn compile(
        &mut self,
        sql: &str,
        ctx: &ExecutionContext,
        tables: &dyn TableResolver,
    ) -> Result<CompiledQuery, CompileError>;
}

/// Compiler for the quill statement dialect
#[derive(Debug, Default)]
pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Self
    }
}

impl SqlCompiler for Compiler {
    fn compile(
        &mut self,
        sql: &str,
        ctx: &ExecutionContext,
        tables: &dyn TableResolver,
    ) -> Result<CompiledQuery, CompileError> {
        match parse(sql)? {
            Statement::CreateTable {
                table,
                columns,
                timestamp,
                partition_by,
                mode,
            } => {
                check_table_name(&table.name, table.position)?;
                if tables.resolve_table(&table.name).is_some() {
                    return Err(CompileError::new(
                        table.position,
                        format!("table already exists [table={}]", table.name),
                    ));
                }
                let mut seen = HashSet::new();
                for column in &columns {
                    if !seen.insert(column.name.to_ascii_lowercase()) {
                        return Err(CompileError::new(
                            table.position,
                            format!("duplicate column [name={}]", column.name),
                        ));
                    }
                }
                let timestamp = match timestamp {
                    Some((name, position)) => {
                        let column = columns
                            .iter()
                            .find(|c| c.name.eq_ignore_ascii_case(&name))
                            .ok_or_else(|| {
                                CompileError::new(position, "invalid designated timestamp column")
                            })?;
                        if column.ty != ColumnType::Timestamp {
                            return Err(CompileError::new(
                                position,
                                "designated timestamp column must be of TIMESTAMP type",
                            ));
                        }
                        Some(column.name.clone())
                    }
                    None => None,
                };
                if partition_by.is_partitioned() && timestamp.is_none() {
                    return Err(CompileError::new(
                        table.position,
                        "partitioning is possible only on tables with designated timestamps",
                    ));
                }
                let mode = match mode {
                    Some(StorageMode::Wal) if !partition_by.is_partitioned() => {
                        return Err(CompileError::new(
                            table.position,
                            "WAL mode requires a partitioned table",
                        ));
                    }
                    Some(mode) => mode,
                    None if partition_by.is_partitioned() => StorageMode::Wal,
                    None => StorageMode::BypassWal,
                };
                Ok(CompiledQuery::CreateTable(CreateTablePlan {
                    name: table.name,
                    columns,
                    timestamp,
                    partition_by,
                    mode,
                }))
            }
            Statement::DropTable { table } => {
                Ok(CompiledQuery::DropTable(resolve(ctx, tables, &table)?))
            }
            Statement::Insert {
                table,
                columns,
                rows,
            } => {
                let token = resolve(ctx, tables, &table)?;
                if let Some(columns) = &columns {
                    if let Some(row) = rows.iter().find(|r| r.len() != columns.len()) {
                        return Err(CompileError::new(
                            table.position,
                            format!(
                                "row value count does not match column count \
                                 [expected={}, actual={}]",
                                columns.len(),
                                row.len()
                            ),
                        ));
                    }
                }
                Ok(CompiledQuery::Insert(InsertPlan {
                    table: token,
                    columns,
                    rows,
                }))
            }
            Statement::Alter { table, action } => {
                let token = resolve(ctx, tables, &table)?;
                Ok(CompiledQuery::Alter(Operation::Alter(AlterOperation {
                    table_id: token.id(),
                    table_name: token.name().to_string(),
                    action,
                    context: None,
                })))
            }
            Statement::SetType { table, mode } => Ok(CompiledQuery::SetType {
                table: resolve(ctx, tables, &table)?,
                mode,
            }),
            Statement::Update {
                table,
                assignments,
                filter,
            } => {
                let token = resolve(ctx, tables, &table)?;
                Ok(CompiledQuery::Update(Operation::Update(UpdateOperation {
                    table_id: token.id(),
                    table_name: token.name().to_string(),
                    assignments,
                    filter,
                    context: None,
                })))
            }
            Statement::Select {
                table,
                projection,
                filter,
            } => Ok(CompiledQuery::Select(SelectPlan {
                table: resolve(ctx, tables, &table)?,
                projection,
                filter,
            })),
        }
    }
}

fn resolve(
    ctx: &ExecutionContext,
    tables: &dyn TableResolver,
    table: &TableRef,
) -> Result<TableToken, CompileError> {
    ctx.resolve_table(&table.name, tables).ok_or_else(|| {
        CompileError::new(
            table.position,
            format!("table does not exist [table={}]", table.name),
        )
    })
}

/// Table names become directory names, so they must stay a single path segment
fn check_table_name(name: &str, position: usize) -> Result<(), CompileError> {
    let invalid = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.chars().any(|c| matches!(c, '/' | '\\' | '~' | ':') || c.is_control());
    if invalid {
        return Err(CompileError::new(
            position,
            format!("invalid table name [table={name}]"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
