// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! quill engine: storage-mode conversion, operation compilation, plan caching
//! and the apply pipeline

mod apply;
mod assoc;
mod compiler;
mod config;
mod convert;
mod engine;
mod error;
mod lane;
mod metrics;
mod query_cache;
mod worker;

pub use apply::ApplyScheduler;
pub use assoc::AssociativeCache;
pub use compiler::OperationCompiler;
pub use config::{ApplyConfig, ConfigError, EngineConfig, QueryCacheConfig};
pub use convert::{
    check_and_apply_on_open, pending_conversion, schedule_conversion, ConversionOutcome,
    ConvertError,
};
pub use engine::{Engine, ExecuteResult, OpenFailure, QueryResult, TableInfo, LOCK_FILE};
pub use error::EngineError;
pub use lane::{Applied, Lane};
pub use metrics::{EngineMetrics, Gauge};
pub use query_cache::QueryCache;
pub use worker::WorkerContext;
