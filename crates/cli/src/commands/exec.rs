// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `quill exec`

use super::tables;
use crate::output::OutputFormat;
use anyhow::Context;
use clap::Args;
use quill_core::Value;
use quill_engine::{Engine, WorkerContext};

#[derive(Args)]
pub struct ExecArgs {
    /// Statements, run in order
    #[arg(required = true)]
    pub sql: Vec<String>,

    /// Named bind variable, referenced as `:name`
    #[arg(long = "bind", value_parser = parse_key_value)]
    pub binds: Vec<(String, String)>,

    /// Apply pending log entries before exiting
    #[arg(long)]
    pub drain: bool,

    /// List tables after the statements; pending conversions show until the next open
    #[arg(long)]
    pub tables: bool,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid name=value: no '=' found in '{s}'"))?;
    Ok((key.to_string(), value.to_string()))
}

/// Integers bind as LONG, `true`/`false` as BOOLEAN, anything else as text
fn bind_value(text: &str) -> Value {
    if let Ok(v) = text.parse::<i64>() {
        return Value::Long(v);
    }
    match text {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => Value::String(text.to_string()),
    }
}

pub fn handle(engine: &Engine, args: ExecArgs) -> anyhow::Result<()> {
    let mut worker = WorkerContext::new("cli", engine.config());
    for (name, value) in &args.binds {
        worker
            .compiler_mut()
            .binds_mut()
            .set_named(name.clone(), bind_value(value));
    }

    for sql in &args.sql {
        let result = engine
            .execute(&mut worker, sql)
            .with_context(|| sql.clone())?;
        print!("{result}");
    }

    if args.drain {
        let applied = engine.apply_all(&mut worker)?;
        println!("applied {applied} log entries");
    }
    if args.tables {
        tables::print(engine, OutputFormat::Text);
    }
    worker.close();
    Ok(())
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
