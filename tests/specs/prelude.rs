//! Shared fixtures for CLI specs

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

/// A partitioned table; WAL unless a mode follows
pub const PARTITIONED: &str =
    "create table x (ts timestamp, v long) timestamp(ts) partition by day";

/// Scratch data directory
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the data directory
    pub fn file(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(path, content).expect("write file");
    }

    /// `quill --data-dir <project>`
    pub fn quill(&self) -> Cli {
        let mut cmd = Command::cargo_bin("quill").expect("quill binary");
        cmd.arg("--data-dir").arg(self.dir.path());
        cmd.env_remove("QUILL_LOG");
        Cli { cmd }
    }

    /// Run statements and require success
    pub fn exec(&self, statements: &[&str]) -> Output {
        let mut args = vec!["exec"];
        args.extend_from_slice(statements);
        self.quill().args(&args).passes()
    }
}

pub fn cli() -> Cli {
    let mut cmd = Command::cargo_bin("quill").expect("quill binary");
    cmd.env_remove("QUILL_LOG");
    Cli { cmd }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> Output {
        let output = self.cmd.output().expect("run quill");
        let out = Output::from(output);
        assert!(out.success, "expected success\nstdout:\n{}\nstderr:\n{}", out.stdout, out.stderr);
        out
    }

    pub fn fails(mut self) -> Output {
        let output = self.cmd.output().expect("run quill");
        let out = Output::from(output);
        assert!(!out.success, "expected failure\nstdout:\n{}", out.stdout);
        out
    }
}

pub struct Output {
    success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for Output {
    fn from(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Output {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout lacks {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout.contains(needle), "stdout has {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr lacks {needle:?}:\n{}", self.stderr);
        self
    }
}
