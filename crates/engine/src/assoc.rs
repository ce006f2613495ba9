// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-capacity associative cache
//!
//! Keys hash (CRC32) to one block; a block is a row of slots kept packed to
//! the left, newest first. Inserting into a full row evicts its last slot, so
//! every operation costs at most one row scan.

use crate::metrics::Gauge;

pub struct AssociativeCache<V> {
    rows: usize,
    mask: u32,
    slots: Vec<Option<(String, V)>>,
    len: usize,
    gauge: Gauge,
}

impl<V> AssociativeCache<V> {
    /// Both dimensions are rounded up to the next power of two
    pub fn new(blocks: usize, rows: usize, gauge: Gauge) -> Self {
        let blocks = blocks.max(1).next_power_of_two();
        let rows = rows.max(1).next_power_of_two();
        let mut slots = Vec::with_capacity(blocks * rows);
        slots.resize_with(blocks * rows, || None);
        Self {
            rows,
            mask: (blocks - 1) as u32,
            slots,
            len: 0,
            gauge,
        }
    }

    pub fn blocks(&self) -> usize {
        self.mask as usize + 1
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Block a key lands in
    pub fn block_of(&self, key: &str) -> usize {
        (crc32fast::hash(key.as_bytes()) & self.mask) as usize
    }

    /// Remove and return the value for `key`
    pub fn poll(&mut self, key: &str) -> Option<V> {
        let row = self.row_mut(key);
        let index = row
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|(k, _)| k == key))?;
        let (_, value) = row[index].take()?;
        row[index..].rotate_left(1);
        self.len -= 1;
        self.gauge.dec();
        Some(value)
    }

    pub fn peek(&self, key: &str) -> Option<&V> {
        let start = self.block_of(key) * self.rows;
        self.slots[start..start + self.rows]
            .iter()
            .flatten()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert at the front of the key's block
    ///
    /// Returns the displaced value: the previous value for the same key, or
    /// the entry evicted from the end of a full row.
    pub fn push(&mut self, key: String, value: V) -> Option<V> {
        let row = self.row_mut(&key);
        if let Some(slot) = row
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|(k, _)| *k == key))
        {
            return slot.replace((key, value)).map(|(_, v)| v);
        }

        let evicted = row.last_mut().and_then(Option::take);
        row.rotate_right(1);
        row[0] = Some((key, value));
        if evicted.is_none() {
            self.len += 1;
            self.gauge.inc();
        }
        evicted.map(|(_, v)| v)
    }

    /// Drop every entry now
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.gauge.add(-(self.len as i64));
        self.len = 0;
    }

    fn row_mut(&mut self, key: &str) -> &mut [Option<(String, V)>] {
        let start = self.block_of(key) * self.rows;
        &mut self.slots[start..start + self.rows]
    }
}

#[cfg(test)]
#[path = "assoc_tests.rs"]
mod tests;
