// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for engine integration tests.

#![allow(dead_code)]

use quill_core::FakeClock;
use quill_engine::{Engine, EngineConfig, ExecuteResult, WorkerContext};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub fn open(root: &Path) -> Engine {
    Engine::open(root, Arc::new(EngineConfig::default())).expect("open engine")
}

pub fn worker(engine: &Engine) -> WorkerContext {
    let clock = FakeClock::new(1_700_000_000_000_000);
    WorkerContext::with_clock("test", engine.config(), Box::new(clock))
}

pub fn exec(engine: &Engine, worker: &mut WorkerContext, sql: &str) -> ExecuteResult {
    engine
        .execute(worker, sql)
        .unwrap_or_else(|e| panic!("{sql}: {e}"))
}

/// Directory of a table, found through the catalog naming scheme
pub fn table_dir(engine: &Engine, name: &str) -> std::path::PathBuf {
    let token = engine.table_token(name).expect("table exists");
    engine.root().join(token.dir_name())
}

/// Recursive copy; stands in for a crash image of a data directory
pub fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).expect("create copy dir");
    for entry in fs::read_dir(from).expect("read dir") {
        let entry = entry.expect("dir entry");
        let target = to.join(entry.file_name());
        if entry.file_type().expect("file type").is_dir() {
            copy_dir(&entry.path(), &target);
        } else if entry.file_name() != quill_engine::LOCK_FILE {
            fs::copy(entry.path(), &target).expect("copy file");
        }
    }
}
