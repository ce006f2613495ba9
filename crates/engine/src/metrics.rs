// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine gauges

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Shared integer gauge
#[derive(Debug, Clone, Default)]
pub struct Gauge(Arc<AtomicI64>);

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.add(1);
    }

    pub fn dec(&self) {
        self.add(-1);
    }

    pub fn add(&self, delta: i64) {
        self.0.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Gauges owned by one worker
#[derive(Debug, Clone, Default)]
pub struct EngineMetrics {
    /// Plans resident in the worker's query cache
    pub cached_queries: Gauge,
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
