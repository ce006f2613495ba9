// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `quill apply`

use quill_engine::{ApplyScheduler, Engine};
use std::sync::Arc;

pub async fn handle(engine: Arc<Engine>) -> anyhow::Result<()> {
    let pending: Vec<_> = engine
        .tables()
        .into_iter()
        .filter(|t| t.pending_records > 0)
        .collect();
    if pending.is_empty() {
        println!("Nothing to apply");
        return Ok(());
    }

    let scheduler = ApplyScheduler::start(Arc::clone(&engine));
    for table in &pending {
        scheduler.notify(table.token.id());
    }
    scheduler.shutdown().await;

    for table in &pending {
        let left = engine.pending_records(table.token.name())?;
        println!(
            "{}: applied {} ({} pending)",
            table.token.name(),
            table.pending_records.saturating_sub(left),
            left
        );
    }
    Ok(())
}
