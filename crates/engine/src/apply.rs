// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Apply scheduler
//!
//! A fixed pool of workers folds WAL tables' logs into base data. A table is
//! always routed to the same worker, so its entries are applied by one
//! worker in log order; different tables progress in parallel.

use crate::engine::Engine;
use crate::worker::WorkerContext;
use quill_core::TableId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub struct ApplyScheduler {
    senders: Vec<mpsc::UnboundedSender<TableId>>,
    handles: Vec<JoinHandle<()>>,
}

impl ApplyScheduler {
    /// Spawn `engine.config().apply.workers` workers on the current runtime
    pub fn start(engine: Arc<Engine>) -> Self {
        let workers = engine.config().apply.workers.max(1);
        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);
        for index in 0..workers {
            let (tx, rx) = mpsc::unbounded_channel();
            let worker = WorkerContext::new(format!("apply-{index}"), engine.config());
            handles.push(tokio::spawn(run_worker(Arc::clone(&engine), worker, rx)));
            senders.push(tx);
        }
        info!(workers, "apply scheduler started");
        Self { senders, handles }
    }

    /// Queue a pass over `table`'s pending log entries
    pub fn notify(&self, table: TableId) {
        let index = table.0 as usize % self.senders.len();
        if self.senders[index].send(table).is_err() {
            warn!(table = table.0, "apply worker has stopped");
        }
    }

    pub fn workers(&self) -> usize {
        self.senders.len()
    }

    /// Finish queued work and stop every worker
    pub async fn shutdown(self) {
        drop(self.senders);
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "apply worker panicked");
            }
        }
        info!("apply scheduler stopped");
    }
}

async fn run_worker(
    engine: Arc<Engine>,
    worker: WorkerContext,
    mut rx: mpsc::UnboundedReceiver<TableId>,
) {
    let mut worker = Some(worker);
    while let Some(table) = rx.recv().await {
        let Some(mut ctx) = worker.take() else {
            break;
        };
        let engine = Arc::clone(&engine);
        let joined = tokio::task::spawn_blocking(move || {
            let result = engine.apply_pending(&mut ctx, table);
            (ctx, result)
        })
        .await;

        let (ctx, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                error!(table = table.0, error = %e, "apply task failed; worker exiting");
                break;
            }
        };
        match result {
            Ok(applied) => {
                debug!(worker = ctx.name(), table = table.0, applied, "applied pending entries")
            }
            Err(e) if e.is_not_found() => {
                debug!(table = table.0, "skipping apply for dropped table")
            }
            Err(e) => {
                error!(worker = ctx.name(), table = table.0, error = %e, "apply failed")
            }
        }
        worker = Some(ctx);
    }
    if let Some(ctx) = worker {
        ctx.close();
    }
}

#[cfg(test)]
#[path = "apply_tests.rs"]
mod tests;
