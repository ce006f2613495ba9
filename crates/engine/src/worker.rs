// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-worker state
//!
//! Each worker constructs one context at startup and passes it to every
//! engine call it makes. Nothing in here is shared between workers.

use crate::compiler::OperationCompiler;
use crate::config::EngineConfig;
use crate::metrics::EngineMetrics;
use crate::query_cache::QueryCache;
use quill_core::{Clock, ExecutionContext};
use quill_sql::{Compiler, SelectPlan};

pub struct WorkerContext {
    name: String,
    compiler: OperationCompiler,
    query_cache: QueryCache<SelectPlan>,
    metrics: EngineMetrics,
}

impl WorkerContext {
    pub fn new(name: impl Into<String>, config: &EngineConfig) -> Self {
        Self::with_compiler(name, config, OperationCompiler::default())
    }

    /// Worker whose `now()` reads `clock`
    pub fn with_clock(
        name: impl Into<String>,
        config: &EngineConfig,
        clock: Box<dyn Clock>,
    ) -> Self {
        let compiler =
            OperationCompiler::new(Box::new(Compiler::new()), ExecutionContext::new(clock));
        Self::with_compiler(name, config, compiler)
    }

    pub fn with_compiler(
        name: impl Into<String>,
        config: &EngineConfig,
        compiler: OperationCompiler,
    ) -> Self {
        let name = name.into();
        let metrics = EngineMetrics::default();
        let query_cache = QueryCache::new(
            name.clone(),
            &config.query_cache,
            metrics.cached_queries.clone(),
        );
        Self {
            name,
            compiler,
            query_cache,
            metrics,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compiler(&self) -> &OperationCompiler {
        &self.compiler
    }

    pub fn compiler_mut(&mut self) -> &mut OperationCompiler {
        &mut self.compiler
    }

    pub fn query_cache(&self) -> &QueryCache<SelectPlan> {
        &self.query_cache
    }

    pub fn query_cache_mut(&mut self) -> &mut QueryCache<SelectPlan> {
        &mut self.query_cache
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Release cached plans and the compiler
    pub fn close(mut self) {
        self.query_cache.close();
    }
}
