// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-compiler execution context
//!
//! Holds everything that can make a compiled statement non-deterministic:
//! bind variable values, the random source and the wall clock. A snapshot of
//! this state travels with every compiled [`Operation`](crate::Operation) so
//! that applying it later (or again, after a crash) yields identical results.

use crate::bind::{BindKey, BindVariables};
use crate::clock::{Clock, SystemClock};
use crate::rnd::Rnd;
use crate::table::TableToken;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Resolves unqualified table names to table tokens
pub trait TableResolver {
    fn resolve_table(&self, name: &str) -> Option<TableToken>;
}

/// No tables at all; useful for statements that never reference one
pub struct NoTables;

impl TableResolver for NoTables {
    fn resolve_table(&self, _name: &str) -> Option<TableToken> {
        None
    }
}

/// Frozen copy of the execution context taken at compile time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub binds: Vec<(BindKey, Value)>,
    pub seed0: i64,
    pub seed1: i64,
    pub now_micros: i64,
}

impl ContextSnapshot {
    pub fn bind(&self, key: &BindKey) -> Option<&Value> {
        self.binds.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// A random source positioned where the compiling context was
    pub fn rnd(&self) -> Rnd {
        Rnd::new(self.seed0, self.seed1)
    }
}

pub struct ExecutionContext {
    binds: BindVariables,
    rnd: Rnd,
    clock: Box<dyn Clock>,
    fixed_now: Option<i64>,
    remap: Option<TableToken>,
}

impl ExecutionContext {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            binds: BindVariables::new(),
            rnd: Rnd::default(),
            clock,
            fixed_now: None,
            remap: None,
        }
    }

    pub fn binds(&self) -> &BindVariables {
        &self.binds
    }

    pub fn binds_mut(&mut self) -> &mut BindVariables {
        &mut self.binds
    }

    pub fn reset_random(&mut self, seed0: i64, seed1: i64) {
        self.rnd.reset(seed0, seed1);
    }

    pub fn random_seeds(&self) -> (i64, i64) {
        self.rnd.seeds()
    }

    /// Pin `now()` to a fixed value until `unfix_clock`
    pub fn fix_clock(&mut self, micros: i64) {
        self.fixed_now = Some(micros);
    }

    pub fn unfix_clock(&mut self) {
        self.fixed_now = None;
    }

    pub fn fixed_clock(&self) -> Option<i64> {
        self.fixed_now
    }

    pub fn now_micros(&self) -> i64 {
        self.fixed_now.unwrap_or_else(|| self.clock.now_micros())
    }

    /// Make every unqualified table name resolve to `token`
    ///
    /// Used when compiling for a table that ordinary lookup may not find,
    /// e.g. replaying a change after the table was renamed or while a drop is
    /// pending.
    pub fn remap_table_name_resolution_to(&mut self, token: TableToken) {
        self.remap = Some(token);
    }

    pub fn clear_table_remap(&mut self) {
        self.remap = None;
    }

    pub fn table_remap(&self) -> Option<&TableToken> {
        self.remap.as_ref()
    }

    pub fn resolve_table(&self, name: &str, resolver: &dyn TableResolver) -> Option<TableToken> {
        match &self.remap {
            Some(token) => Some(token.clone()),
            None => resolver.resolve_table(name),
        }
    }

    /// Capture binds, seeds and the current time
    ///
    /// The random source then steps forward so consecutive statements on the
    /// same context draw different values.
    pub fn snapshot(&mut self) -> ContextSnapshot {
        let (seed0, seed1) = self.rnd.seeds();
        let snapshot = ContextSnapshot {
            binds: self.binds.to_entries(),
            seed0,
            seed1,
            now_micros: self.now_micros(),
        };
        let next0 = self.rnd.next_long();
        let next1 = self.rnd.next_long();
        self.rnd.reset(next0, next1);
        snapshot
    }

    /// Reset binds, seeds and clock from a durably logged snapshot
    pub fn restore(&mut self, snapshot: &ContextSnapshot) {
        self.binds = BindVariables::from_entries(&snapshot.binds);
        self.rnd.reset(snapshot.seed0, snapshot.seed1);
        self.fixed_now = Some(snapshot.now_micros);
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(Box::new(SystemClock))
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
