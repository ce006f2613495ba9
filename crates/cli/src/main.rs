// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! quill - table storage engine CLI

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{apply, exec, tables};
use quill_engine::{Engine, EngineConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Config file picked up from the data directory when `--config` is absent
const DEFAULT_CONFIG: &str = "quill.toml";

#[derive(Parser)]
#[command(name = "quill", version, about = "quill - WAL and direct table storage")]
struct Cli {
    /// Data directory
    #[arg(long, global = true, default_value = "quill-data")]
    data_dir: PathBuf,

    /// Engine config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute statements in order
    Exec(exec::ExecArgs),
    /// List tables with storage mode and pending work
    Tables(tables::TablesArgs),
    /// Apply pending log entries on background workers
    Apply,
}

#[tokio::main]
async fn main() {
    setup_logging();
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.data_dir, cli.config.as_deref())?;
    let engine = Engine::open(&cli.data_dir, Arc::new(config))
        .with_context(|| format!("cannot open {}", cli.data_dir.display()))?;
    for (table, outcome) in engine.open_outcomes() {
        tracing::info!(table = %table, ?outcome, "conversion marker handled");
    }

    match cli.command {
        Commands::Exec(args) => exec::handle(&engine, args),
        Commands::Tables(args) => tables::handle(&engine, args),
        Commands::Apply => apply::handle(Arc::new(engine)).await,
    }
}

fn load_config(data_dir: &Path, explicit: Option<&Path>) -> Result<EngineConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = data_dir.join(DEFAULT_CONFIG);
            if !path.exists() {
                return Ok(EngineConfig::default());
            }
            path
        }
    };
    Ok(EngineConfig::load(&path)?)
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("QUILL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
