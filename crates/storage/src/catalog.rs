// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog registry
//!
//! `_tables.json` maps table names to ids and directories. A table exists
//! exactly when it is registered here; directories the registry does not
//! name are leftovers from an interrupted create or drop and are ignored.

use crate::table::{read_json_opt, write_json, TableMeta, TableStore};
use crate::StorageError;
use quill_core::{TableData, TableId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::info;

pub const REGISTRY_FILE: &str = "_tables.json";

/// One registered table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: TableId,
    pub name: String,
    pub dir_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Registry {
    next_id: u32,
    /// Keyed by lowercased name
    tables: BTreeMap<String, CatalogEntry>,
}

pub struct Catalog {
    root: PathBuf,
    registry: Registry,
}

impl Catalog {
    /// Load the registry under `root`, creating the root if needed
    pub fn open(root: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(root)?;
        let registry = read_json_opt(&root.join(REGISTRY_FILE))?.unwrap_or_default();
        Ok(Self {
            root: root.to_path_buf(),
            registry,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.registry.tables.get(&name.to_ascii_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered tables in name order
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.registry.tables.values()
    }

    pub fn table_dir(&self, entry: &CatalogEntry) -> PathBuf {
        self.root.join(&entry.dir_name)
    }

    /// Allocate an id, create the table directory, then register it
    ///
    /// `meta.id` is overwritten with the allocated id.
    pub fn create_table(
        &mut self,
        mut meta: TableMeta,
        data: TableData,
    ) -> Result<TableStore, StorageError> {
        if self.contains(&meta.name) {
            return Err(StorageError::TableExists(meta.name));
        }
        let id = TableId(self.registry.next_id + 1);
        meta.id = id;
        let dir_name = format!("{}~{}", meta.name, id.0);
        let dir = self.root.join(&dir_name);
        if dir.exists() {
            // Leftover from an interrupted create; the registry never saw it
            std::fs::remove_dir_all(&dir)?;
        }
        let store = TableStore::create(&dir, meta.clone(), data)?;

        let mut registry = self.registry.clone();
        registry.next_id = id.0;
        registry.tables.insert(
            meta.name.to_ascii_lowercase(),
            CatalogEntry {
                id,
                name: meta.name.clone(),
                dir_name,
            },
        );
        self.save(registry)?;
        info!(table = %meta.name, id = id.0, mode = %meta.mode, "table created");
        Ok(store)
    }

    /// Unregister the table, then delete its directory
    pub fn drop_table(&mut self, name: &str) -> Result<CatalogEntry, StorageError> {
        let key = name.to_ascii_lowercase();
        let mut registry = self.registry.clone();
        let entry = registry
            .tables
            .remove(&key)
            .ok_or_else(|| StorageError::TableNotFound(name.to_string()))?;
        self.save(registry)?;

        let dir = self.table_dir(&entry);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        info!(table = %entry.name, id = entry.id.0, "table dropped");
        Ok(entry)
    }

    /// Directories under the root that no registered table owns
    pub fn orphan_dirs(&self) -> Result<Vec<PathBuf>, StorageError> {
        let owned: BTreeSet<&str> = self
            .registry
            .tables
            .values()
            .map(|e| e.dir_name.as_str())
            .collect();
        let mut orphans = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            if !owned.contains(name.to_string_lossy().as_ref()) {
                orphans.push(entry.path());
            }
        }
        orphans.sort();
        Ok(orphans)
    }

    fn save(&mut self, registry: Registry) -> Result<(), StorageError> {
        write_json(&self.root.join(REGISTRY_FILE), &registry)?;
        self.registry = registry;
        Ok(())
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
