// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Malformed statement text or unresolved identifiers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{position}] {message}")]
pub struct CompileError {
    /// Byte offset into the statement text
    pub position: usize,
    pub message: String,
}

impl CompileError {
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}
