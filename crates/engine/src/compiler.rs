// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation compiler
//!
//! Turns ALTER and UPDATE text into self-contained [`Operation`]s for one
//! known table. The compiled operation carries a snapshot of the execution
//! context, so applying it is deterministic no matter when or how often it
//! runs. One compiler belongs to one worker.

use quill_core::{ExecutionContext, Operation, OperationKind, TableResolver, TableToken};
use quill_sql::{CompileError, CompiledQuery, Compiler, SqlCompiler};
use quill_storage::ChangeRecord;
use std::ops::{Deref, DerefMut};
use tracing::debug;

pub struct OperationCompiler {
    sql: Box<dyn SqlCompiler + Send>,
    context: ExecutionContext,
}

impl OperationCompiler {
    pub fn new(sql: Box<dyn SqlCompiler + Send>, context: ExecutionContext) -> Self {
        Self { sql, context }
    }

    pub fn compile_alter(
        &mut self,
        sql: &str,
        table: &TableToken,
        tables: &dyn TableResolver,
    ) -> Result<Operation, CompileError> {
        self.compile_operation(OperationKind::Alter, sql, table, tables)
    }

    pub fn compile_update(
        &mut self,
        sql: &str,
        table: &TableToken,
        tables: &dyn TableResolver,
    ) -> Result<Operation, CompileError> {
        self.compile_operation(OperationKind::Update, sql, table, tables)
    }

    /// Recompile a logged change exactly as it was first compiled
    ///
    /// The context is restored from the record for the duration of the call
    /// and put back afterwards, so replay does not disturb the worker's own
    /// binds, seeds or clock.
    pub fn compile_change(
        &mut self,
        record: &ChangeRecord,
        table: &TableToken,
        tables: &dyn TableResolver,
    ) -> Result<Operation, CompileError> {
        let saved_binds = self.context.binds().clone();
        let (seed0, seed1) = self.context.random_seeds();
        let saved_clock = self.context.fixed_clock();

        self.context.restore(&record.context);
        let result = self.compile_operation(record.kind, &record.sql, table, tables);

        *self.context.binds_mut() = saved_binds;
        self.context.reset_random(seed0, seed1);
        match saved_clock {
            Some(micros) => self.context.fix_clock(micros),
            None => self.context.unfix_clock(),
        }
        result
    }

    /// Compile any statement against the worker's context
    pub fn compile(
        &mut self,
        sql: &str,
        tables: &dyn TableResolver,
    ) -> Result<CompiledQuery, CompileError> {
        self.sql.compile(sql, &self.context, tables)
    }

    pub fn reset_random(&mut self, seed0: i64, seed1: i64) {
        self.context.reset_random(seed0, seed1);
    }

    pub fn fix_clock(&mut self, micros: i64) {
        self.context.fix_clock(micros);
    }

    pub fn binds_mut(&mut self) -> &mut quill_core::BindVariables {
        self.context.binds_mut()
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ExecutionContext {
        &mut self.context
    }

    /// Release the compiler and its context
    pub fn close(self) {}

    fn compile_operation(
        &mut self,
        kind: OperationKind,
        sql: &str,
        table: &TableToken,
        tables: &dyn TableResolver,
    ) -> Result<Operation, CompileError> {
        let mut context = RemapGuard::new(&mut self.context, table.clone());
        let compiled = self.sql.compile(sql, &context, tables)?;
        let operation = match (kind, compiled) {
            (OperationKind::Alter, CompiledQuery::Alter(op))
            | (OperationKind::Update, CompiledQuery::Update(op)) => op,
            (kind, other) => {
                return Err(CompileError::new(
                    0,
                    format!(
                        "{} statement expected, got {}",
                        kind_name(kind),
                        other.kind_name()
                    ),
                ))
            }
        };
        debug!(table = %table, kind = kind_name(kind), "compiled operation");
        Ok(operation.with_context(context.snapshot()))
    }
}

impl Default for OperationCompiler {
    fn default() -> Self {
        Self::new(Box::new(Compiler::new()), ExecutionContext::default())
    }
}

impl Drop for OperationCompiler {
    fn drop(&mut self) {
        self.context.clear_table_remap();
        self.context.binds_mut().clear();
    }
}

fn kind_name(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Alter => "ALTER",
        OperationKind::Update => "UPDATE",
    }
}

/// Table-name remap that is cleared on every exit path
struct RemapGuard<'a> {
    context: &'a mut ExecutionContext,
}

impl<'a> RemapGuard<'a> {
    fn new(context: &'a mut ExecutionContext, table: TableToken) -> Self {
        context.remap_table_name_resolution_to(table);
        Self { context }
    }
}

impl Deref for RemapGuard<'_> {
    type Target = ExecutionContext;

    fn deref(&self) -> &ExecutionContext {
        self.context
    }
}

impl DerefMut for RemapGuard<'_> {
    fn deref_mut(&mut self) -> &mut ExecutionContext {
        self.context
    }
}

impl Drop for RemapGuard<'_> {
    fn drop(&mut self) {
        self.context.clear_table_remap();
    }
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
