// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compiled, replayable change operations
//!
//! An [`Operation`] is produced once by the compiler and never re-parsed.
//! It names its target table by id, carries the fully bound change and the
//! [`ContextSnapshot`] needed to reproduce random values and `now()`.

use crate::context::ContextSnapshot;
use crate::data::TableData;
use crate::expr::{Expr, Predicate};
use crate::table::TableId;
use crate::value::{ColumnDef, ColumnType, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while applying an operation to table data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApplyError {
    #[error("invalid column: {0}")]
    UnknownColumn(String),
    #[error("duplicate column: {0}")]
    ColumnExists(String),
    #[error("designated timestamp column cannot be changed: {0}")]
    ProtectedColumn(String),
    #[error("inconvertible value {value} for column {column} of type {ty}")]
    TypeMismatch {
        column: String,
        ty: ColumnType,
        value: String,
    },
    #[error("bind variable is not set: {0}")]
    MissingBind(String),
    #[error("operation has no execution context bound")]
    Unbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Alter,
    Update,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlterAction {
    AddColumn { name: String, ty: ColumnType },
    DropColumn { name: String },
    RenameColumn { from: String, to: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterOperation {
    pub table_id: TableId,
    pub table_name: String,
    pub action: AlterAction,
    pub context: Option<ContextSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOperation {
    pub table_id: TableId,
    pub table_name: String,
    pub assignments: Vec<(String, Expr)>,
    pub filter: Option<Predicate>,
    pub context: Option<ContextSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Alter(AlterOperation),
    Update(UpdateOperation),
}

/// What an applied operation changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub rows_affected: usize,
    pub structure_changed: bool,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Alter(_) => OperationKind::Alter,
            Operation::Update(_) => OperationKind::Update,
        }
    }

    pub fn table_id(&self) -> TableId {
        match self {
            Operation::Alter(op) => op.table_id,
            Operation::Update(op) => op.table_id,
        }
    }

    pub fn table_name(&self) -> &str {
        match self {
            Operation::Alter(op) => &op.table_name,
            Operation::Update(op) => &op.table_name,
        }
    }

    pub fn context(&self) -> Option<&ContextSnapshot> {
        match self {
            Operation::Alter(op) => op.context.as_ref(),
            Operation::Update(op) => op.context.as_ref(),
        }
    }

    /// Bind the execution context captured at compile time
    pub fn with_context(self, snapshot: ContextSnapshot) -> Self {
        match self {
            Operation::Alter(op) => Operation::Alter(AlterOperation {
                context: Some(snapshot),
                ..op
            }),
            Operation::Update(op) => Operation::Update(UpdateOperation {
                context: Some(snapshot),
                ..op
            }),
        }
    }

    /// Apply to `data`; on error `data` is left untouched
    pub fn apply(&self, data: &mut TableData) -> Result<ApplyOutcome, ApplyError> {
        match self {
            Operation::Alter(op) => op.apply(data),
            Operation::Update(op) => op.apply(data),
        }
    }
}

impl AlterOperation {
    fn apply(&self, data: &mut TableData) -> Result<ApplyOutcome, ApplyError> {
        match &self.action {
            AlterAction::AddColumn { name, ty } => {
                if data.column_index(name).is_some() {
                    return Err(ApplyError::ColumnExists(name.clone()));
                }
                data.columns.push(ColumnDef::new(name.clone(), *ty));
                for row in &mut data.rows {
                    row.push(Value::Null);
                }
            }
            AlterAction::DropColumn { name } => {
                let index = data
                    .column_index(name)
                    .ok_or_else(|| ApplyError::UnknownColumn(name.clone()))?;
                if data.is_designated_timestamp(name) {
                    return Err(ApplyError::ProtectedColumn(name.clone()));
                }
                data.columns.remove(index);
                for row in &mut data.rows {
                    if index < row.len() {
                        row.remove(index);
                    }
                }
            }
            AlterAction::RenameColumn { from, to } => {
                let index = data
                    .column_index(from)
                    .ok_or_else(|| ApplyError::UnknownColumn(from.clone()))?;
                if data.column_index(to).is_some() {
                    return Err(ApplyError::ColumnExists(to.clone()));
                }
                if data.is_designated_timestamp(from) {
                    data.timestamp = Some(to.clone());
                }
                data.columns[index].name = to.clone();
            }
        }
        data.structure_version += 1;
        Ok(ApplyOutcome {
            rows_affected: 0,
            structure_changed: true,
        })
    }
}

impl UpdateOperation {
    fn apply(&self, data: &mut TableData) -> Result<ApplyOutcome, ApplyError> {
        let snapshot = self.context.as_ref().ok_or(ApplyError::Unbound)?;
        let mut rnd = snapshot.rnd();

        let mut targets = Vec::with_capacity(self.assignments.len());
        for (name, expr) in &self.assignments {
            let index = data
                .column_index(name)
                .ok_or_else(|| ApplyError::UnknownColumn(name.clone()))?;
            if data.is_designated_timestamp(name) {
                return Err(ApplyError::ProtectedColumn(name.clone()));
            }
            targets.push((index, expr));
        }

        let filter = match &self.filter {
            Some(predicate) => {
                let index = data
                    .column_index(&predicate.column)
                    .ok_or_else(|| ApplyError::UnknownColumn(predicate.column.clone()))?;
                Some((index, predicate.value.eval_const(snapshot, &mut rnd)?))
            }
            None => None,
        };

        // Evaluate into a copy so a failure half way leaves `data` unchanged
        let mut rows = data.rows.clone();
        let mut affected = 0;
        for row in &mut rows {
            if let Some((index, expected)) = &filter {
                if !row.get(*index).is_some_and(|v| v.sql_eq(expected)) {
                    continue;
                }
            }
            let mut updates = Vec::with_capacity(targets.len());
            for (index, expr) in &targets {
                let column = &data.columns[*index];
                let value = expr.eval(Some(row.as_slice()), &data.columns, snapshot, &mut rnd)?;
                let coerced = value
                    .coerce_to(column.ty)
                    .ok_or_else(|| ApplyError::TypeMismatch {
                        column: column.name.clone(),
                        ty: column.ty,
                        value: value.to_string(),
                    })?;
                updates.push((*index, coerced));
            }
            for (index, value) in updates {
                row[index] = value;
            }
            affected += 1;
        }

        data.rows = rows;
        Ok(ApplyOutcome {
            rows_affected: affected,
            structure_changed: false,
        })
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
