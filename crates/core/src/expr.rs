// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bound scalar expressions used by compiled operations

use crate::bind::BindKey;
use crate::context::ContextSnapshot;
use crate::operation::ApplyError;
use crate::rnd::Rnd;
use crate::value::{ColumnDef, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Value),
    Bind(BindKey),
    Column(String),
    RndLong,
    RndInt,
    RndDouble,
    RndBoolean,
    /// `now()` / `systimestamp()`: the compile-time clock
    Now,
}

/// Equality filter `column = value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: String,
    pub value: Expr,
}

impl Expr {
    /// Evaluate without a current row (INSERT values, filter constants)
    pub fn eval_const(
        &self,
        snapshot: &ContextSnapshot,
        rnd: &mut Rnd,
    ) -> Result<Value, ApplyError> {
        self.eval(None, &[], snapshot, rnd)
    }

    pub fn eval(
        &self,
        row: Option<&[Value]>,
        columns: &[ColumnDef],
        snapshot: &ContextSnapshot,
        rnd: &mut Rnd,
    ) -> Result<Value, ApplyError> {
        match self {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Bind(key) => snapshot
                .bind(key)
                .cloned()
                .ok_or_else(|| ApplyError::MissingBind(key.to_string())),
            Expr::Column(name) => {
                let index = columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(name))
                    .ok_or_else(|| ApplyError::UnknownColumn(name.clone()))?;
                row.and_then(|r| r.get(index))
                    .cloned()
                    .ok_or_else(|| ApplyError::UnknownColumn(name.clone()))
            }
            Expr::RndLong => Ok(Value::Long(rnd.next_long())),
            Expr::RndInt => Ok(Value::Int(rnd.next_int())),
            Expr::RndDouble => Ok(Value::Double(rnd.next_double())),
            Expr::RndBoolean => Ok(Value::Boolean(rnd.next_bool())),
            Expr::Now => Ok(Value::Timestamp(snapshot.now_micros)),
        }
    }

    pub fn is_deterministic(&self) -> bool {
        !matches!(
            self,
            Expr::RndLong | Expr::RndInt | Expr::RndDouble | Expr::RndBoolean | Expr::Now
        )
    }
}
