// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! quill-sql: statement compiler for the quill change dialect
//!
//! Turns statement text into a [`CompiledQuery`]: bound change operations,
//! read plans, and DDL plans. This is deliberately small: no optimizer and no
//! general function library, only what change application and replay need.

mod ast;
mod compiler;
mod error;
mod lexer;
mod parser;
mod plan;

pub use ast::{Statement, TableRef};
pub use compiler::{Compiler, CompiledQuery, SqlCompiler};
pub use error::CompileError;
pub use parser::parse;
pub use plan::{CreateTablePlan, InsertPlan, Projection, SelectPlan};
