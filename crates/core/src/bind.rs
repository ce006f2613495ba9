// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bind variables

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder reference: `$1` (1-based index) or `:name`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BindKey {
    Index(u32),
    Name(String),
}

impl fmt::Display for BindKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindKey::Index(i) => write!(f, "${i}"),
            BindKey::Name(n) => write!(f, ":{n}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindVariables {
    values: BTreeMap<BindKey, Value>,
}

impl BindVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_indexed(&mut self, index: u32, value: Value) {
        self.values.insert(BindKey::Index(index), value);
    }

    pub fn set_named(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(BindKey::Name(name.into()), value);
    }

    pub fn get(&self, key: &BindKey) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in key order, the form carried by context snapshots
    pub fn to_entries(&self) -> Vec<(BindKey, Value)> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn from_entries(entries: &[(BindKey, Value)]) -> Self {
        Self {
            values: entries.iter().cloned().collect(),
        }
    }
}
