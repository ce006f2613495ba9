// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print a list of items, one per line or as a JSON array
pub fn print_list<T: Serialize + std::fmt::Display>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for item in items {
                println!("{item}");
            }
        }
        OutputFormat::Json => match serde_json::to_string_pretty(items) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "cannot render JSON"),
        },
    }
}
