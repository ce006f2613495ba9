// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-worker query plan cache
//!
//! Plans are moved out on `poll` and handed back with `push` once the caller
//! has finished executing them, so a plan is never in use by two callers.

use crate::assoc::AssociativeCache;
use crate::config::QueryCacheConfig;
use crate::metrics::Gauge;
use tracing::debug;

pub struct QueryCache<P> {
    worker: String,
    cache: AssociativeCache<P>,
    closed: bool,
}

impl<P> QueryCache<P> {
    pub fn new(worker: impl Into<String>, config: &QueryCacheConfig, gauge: Gauge) -> Self {
        let (blocks, rows) = config.dimensions();
        Self {
            worker: worker.into(),
            cache: AssociativeCache::new(blocks, rows, gauge),
            closed: false,
        }
    }

    /// Take the cached plan for `sql`, if any
    pub fn poll(&mut self, sql: &str) -> Option<P> {
        let plan = self.cache.poll(sql);
        if plan.is_some() {
            debug!(worker = %self.worker, sql, "query cache hit");
        } else {
            debug!(worker = %self.worker, sql, "query cache miss");
        }
        plan
    }

    /// Hand a plan back; `None` is ignored
    ///
    /// May evict another plan from the same block. After `close` the plan is
    /// dropped instead of cached.
    pub fn push(&mut self, sql: &str, plan: Option<P>) {
        let Some(plan) = plan else {
            return;
        };
        if self.closed {
            return;
        }
        debug!(worker = %self.worker, sql, "query cache push");
        if self.cache.push(sql.to_string(), plan).is_some() {
            debug!(worker = %self.worker, "query cache displaced a plan");
        }
    }

    /// Release every cached plan now
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Release every cached plan and stop caching; safe to call repeatedly
    pub fn close(&mut self) {
        if !self.closed {
            debug!(worker = %self.worker, cached = self.cache.len(), "closing query cache");
        }
        self.cache.clear();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }
}

impl<P> Drop for QueryCache<P> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[path = "query_cache_tests.rs"]
mod tests;
