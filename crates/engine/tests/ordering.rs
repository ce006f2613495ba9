// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-table ordering under the background apply scheduler.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use common::{exec, worker};
use quill_core::Value;
use quill_engine::{ApplyConfig, ApplyScheduler, Engine, EngineConfig};
use std::sync::Arc;

fn open_with_workers(root: &std::path::Path, workers: usize) -> Arc<Engine> {
    let config = EngineConfig {
        apply: ApplyConfig { workers },
        ..EngineConfig::default()
    };
    Arc::new(Engine::open(root, Arc::new(config)).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn changes_apply_in_log_order_per_table() {
    let dir = tempfile::tempdir().unwrap();
    let engine = open_with_workers(dir.path(), 3);
    let mut w = worker(&engine);
    let scheduler = ApplyScheduler::start(Arc::clone(&engine));

    let names = ["a", "b", "c", "d"];
    for name in names {
        exec(
            &engine,
            &mut w,
            &format!(
                "create table {name} (ts timestamp, k long, v long) \
                 timestamp(ts) partition by day wal"
            ),
        );
        exec(&engine, &mut w, &format!("insert into {name} values (1, 1, 0)"));
    }
    for round in 1..=20 {
        for name in names {
            exec(&engine, &mut w, &format!("update {name} set v = {round} where k = 1"));
            let id = engine.table_token(name).unwrap().id();
            scheduler.notify(id);
        }
    }
    scheduler.shutdown().await;

    for name in names {
        assert_eq!(engine.pending_records(name).unwrap(), 0, "{name}");
        let result = engine.query(&mut w, &format!("select v from {name}")).unwrap();
        assert_eq!(result.rows, vec![vec![Value::Long(20)]], "{name}");
    }
}

#[test]
fn structure_change_is_visible_to_later_statements_before_apply() {
    let dir = tempfile::tempdir().unwrap();
    let engine = open_with_workers(dir.path(), 1);
    let mut w = worker(&engine);
    exec(
        &engine,
        &mut w,
        "create table t (ts timestamp, k long) timestamp(ts) partition by day wal",
    );
    exec(&engine, &mut w, "alter table t add column v long");
    exec(&engine, &mut w, "insert into t values (1, 1, 5)");
    exec(&engine, &mut w, "update t set v = 6 where k = 1");
    exec(&engine, &mut w, "alter table t rename column v to w");

    let err = engine.execute(&mut w, "update t set v = 7").unwrap_err();
    assert!(err.to_string().contains("v"), "{err}");

    engine.apply_all(&mut w).unwrap();
    let result = engine.query(&mut w, "select w from t").unwrap();
    assert_eq!(result.rows, vec![vec![Value::Long(6)]]);
}
