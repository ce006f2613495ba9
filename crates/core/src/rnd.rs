// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reseedable pseudo-random source
//!
//! A 128-bit xorshift generator. The sequence produced for a given seed pair
//! is part of the durable log format: compiled change statements record their
//! seeds and replay must reproduce every value, so the algorithm never changes.

use serde::{Deserialize, Serialize};

const DEFAULT_SEED0: i64 = 0xdead_beef;
const DEFAULT_SEED1: i64 = 0xdee4_c0ed;
const DOUBLE_UNIT: f64 = 1.0 / (1u64 << 53) as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rnd {
    s0: i64,
    s1: i64,
}

impl Rnd {
    pub fn new(seed0: i64, seed1: i64) -> Self {
        Self { s0: seed0, s1: seed1 }
    }

    pub fn reset(&mut self, seed0: i64, seed1: i64) {
        self.s0 = seed0;
        self.s1 = seed1;
    }

    /// Current internal state; feeding it back to `new` resumes the sequence
    pub fn seeds(&self) -> (i64, i64) {
        (self.s0, self.s1)
    }

    pub fn next_long(&mut self) -> i64 {
        let mut l1 = self.s0;
        let l0 = self.s1;
        self.s0 = l0;
        l1 ^= l1.wrapping_shl(23);
        self.s1 = l1 ^ l0 ^ (l1 >> 17) ^ (l0 >> 26);
        self.s1.wrapping_add(l0)
    }

    pub fn next_int(&mut self) -> i32 {
        self.next_long() as i32
    }

    /// Uniform in `[0, 1)`
    pub fn next_double(&mut self) -> f64 {
        ((self.next_long() as u64) >> 11) as f64 * DOUBLE_UNIT
    }

    pub fn next_bool(&mut self) -> bool {
        self.next_long() & 1 == 1
    }
}

impl Default for Rnd {
    fn default() -> Self {
        Self::new(DEFAULT_SEED0, DEFAULT_SEED1)
    }
}

#[cfg(test)]
#[path = "rnd_tests.rs"]
mod tests;
