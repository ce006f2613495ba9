// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine: table registry and statement dispatch
//!
//! Lock order is catalog, then the table map, then a table's lane. The table
//! map is never held while waiting on a lane.

use crate::compiler::OperationCompiler;
use crate::config::EngineConfig;
use crate::convert::{
    check_and_apply_on_open, pending_conversion, schedule_conversion, ConversionOutcome,
};
use crate::lane::{Applied, Lane};
use crate::worker::WorkerContext;
use crate::EngineError;
use fs2::FileExt;
use quill_core::{
    ApplyError, ContextSnapshot, Operation, Row, StorageMode, TableData, TableId, TableResolver,
    TableToken, Value,
};
use quill_sql::{CompiledQuery, CreateTablePlan, InsertPlan, Projection, SelectPlan};
use quill_storage::{Catalog, TableMeta, TableStore};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info, warn};

pub const LOCK_FILE: &str = ".lock";

/// Rows returned by a SELECT
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteResult {
    TableCreated(TableToken),
    TableDropped(TableToken),
    /// `logged` is the table-log sequence when the rows await apply
    Inserted { rows: usize, logged: Option<u64> },
    Changed { rows_affected: usize, logged: Option<u64> },
    ConversionScheduled { table: TableToken, target: StorageMode },
    Rows(QueryResult),
}

/// A registered table that failed to open; its files are left untouched
#[derive(Debug, Clone, PartialEq)]
pub struct OpenFailure {
    pub name: String,
    pub dir: PathBuf,
    pub error: String,
}

/// Snapshot of one table for listings
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub token: TableToken,
    pub rows: usize,
    pub pending_records: u64,
    pub pending_conversion: Option<StorageMode>,
}

#[derive(Default)]
struct Tables {
    /// Keyed by lowercased name
    by_name: HashMap<String, TableToken>,
    lanes: BTreeMap<TableId, Arc<Mutex<Lane>>>,
}

impl Tables {
    fn insert(&mut self, lane: Lane) {
        let token = lane.token().clone();
        self.by_name
            .insert(token.name().to_ascii_lowercase(), token.clone());
        self.lanes.insert(token.id(), Arc::new(Mutex::new(lane)));
    }

    fn remove(&mut self, token: &TableToken) {
        self.by_name.remove(&token.name().to_ascii_lowercase());
        self.lanes.remove(&token.id());
    }
}

pub struct Engine {
    root: PathBuf,
    config: Arc<EngineConfig>,
    catalog: Mutex<Catalog>,
    tables: RwLock<Tables>,
    opened: Vec<(TableToken, ConversionOutcome)>,
    failed: Vec<OpenFailure>,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
}

impl Engine {
    /// Open the data directory and bring every table up to date
    ///
    /// Pending conversions run here, one table at a time. A table that fails
    /// to open or convert is skipped with its marker intact, so the next open
    /// retries it; the others open normally. Directories the catalog does not
    /// list are left alone.
    pub fn open(root: &Path, config: Arc<EngineConfig>) -> Result<Self, EngineError> {
        std::fs::create_dir_all(root)?;
        let lock_file = File::create(root.join(LOCK_FILE))?;
        lock_file.try_lock_exclusive().map_err(EngineError::Locked)?;

        let catalog = Catalog::open(root)?;
        for dir in catalog.orphan_dirs()? {
            warn!(dir = %dir.display(), "ignoring table directory not in catalog");
        }

        let mut compiler = OperationCompiler::default();
        let mut tables = Tables::default();
        let mut opened = Vec::new();
        let mut failed = Vec::new();
        for entry in catalog.entries() {
            let dir = catalog.table_dir(entry);
            match open_table(&dir, &mut compiler) {
                Ok((lane, outcome)) => {
                    if outcome != ConversionOutcome::None {
                        opened.push((lane.token().clone(), outcome));
                    }
                    tables.insert(lane);
                }
                Err(e) => {
                    error!(
                        table = %entry.name,
                        dir = %dir.display(),
                        error = %e,
                        "skipping table that failed to open"
                    );
                    failed.push(OpenFailure {
                        name: entry.name.clone(),
                        dir,
                        error: e.to_string(),
                    });
                }
            }
        }
        compiler.close();

        info!(
            root = %root.display(),
            tables = tables.lanes.len(),
            failed = failed.len(),
            "engine opened"
        );
        Ok(Self {
            root: root.to_path_buf(),
            config,
            catalog: Mutex::new(catalog),
            tables: RwLock::new(tables),
            opened,
            failed,
            lock_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Arc<EngineConfig> {
        &self.config
    }

    /// Marker outcomes from [`Engine::open`], excluding tables without one
    pub fn open_outcomes(&self) -> &[(TableToken, ConversionOutcome)] {
        &self.opened
    }

    /// Run one statement
    pub fn execute(
        &self,
        worker: &mut WorkerContext,
        sql: &str,
    ) -> Result<ExecuteResult, EngineError> {
        match worker.compiler_mut().compile(sql, self)? {
            CompiledQuery::CreateTable(plan) => self.create_table(worker, plan),
            CompiledQuery::DropTable(token) => self.drop_table(&token),
            CompiledQuery::Insert(plan) => self.insert(worker, &plan),
            CompiledQuery::Alter(op) => {
                let token = self.token_by_id(op.table_id())?;
                let op = worker.compiler_mut().compile_alter(sql, &token, self)?;
                self.change(&token, &op, sql)
            }
            CompiledQuery::Update(op) => {
                let token = self.token_by_id(op.table_id())?;
                let op = worker.compiler_mut().compile_update(sql, &token, self)?;
                self.change(&token, &op, sql)
            }
            CompiledQuery::SetType { table, mode } => {
                let lane = self.lane(&table)?;
                let lane = lock_live(&lane, &table)?;
                schedule_conversion(lane.store(), mode)?;
                Ok(ExecuteResult::ConversionScheduled {
                    table: lane.token().clone(),
                    target: mode,
                })
            }
            CompiledQuery::Select(plan) => {
                self.run_cached(worker, sql, plan).map(ExecuteResult::Rows)
            }
        }
    }

    /// Run a SELECT, reusing the worker's cached plan when it still matches
    pub fn query(&self, worker: &mut WorkerContext, sql: &str) -> Result<QueryResult, EngineError> {
        let plan = match worker.query_cache_mut().poll(sql) {
            Some(plan) if self.is_current(&plan) => plan,
            _ => match worker.compiler_mut().compile(sql, self)? {
                CompiledQuery::Select(plan) => plan,
                other => return Err(EngineError::NotAQuery(other.kind_name())),
            },
        };
        self.run_cached(worker, sql, plan)
    }

    /// Fold a table's pending log entries into its base data
    pub fn apply_pending(
        &self,
        worker: &mut WorkerContext,
        table: TableId,
    ) -> Result<usize, EngineError> {
        let lane = self.lane_by_id(table)?;
        let mut lane = lock(&lane);
        if lane.is_dropped() {
            return Err(EngineError::UnknownTableId(table.0));
        }
        Ok(lane.drain(worker.compiler_mut())?)
    }

    /// [`Engine::apply_pending`] for every table
    pub fn apply_all(&self, worker: &mut WorkerContext) -> Result<usize, EngineError> {
        let ids: Vec<TableId> = self.read_tables().lanes.keys().copied().collect();
        let mut applied = 0;
        for id in ids {
            match self.apply_pending(worker, id) {
                Ok(n) => applied += n,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(applied)
    }

    /// Tables skipped by [`Engine::open`]
    pub fn open_failures(&self) -> &[OpenFailure] {
        &self.failed
    }

    pub fn table_token(&self, name: &str) -> Result<TableToken, EngineError> {
        if let Some(token) = self.resolve_table(name) {
            return Ok(token);
        }
        match self.failed.iter().find(|f| f.name.eq_ignore_ascii_case(name)) {
            Some(failure) => Err(EngineError::TableUnavailable {
                table: failure.name.clone(),
                reason: failure.error.clone(),
            }),
            None => Err(EngineError::TableNotFound(name.to_string())),
        }
    }

    /// Every table, in name order
    pub fn tables(&self) -> Vec<TableInfo> {
        let lanes: Vec<Arc<Mutex<Lane>>> = self.read_tables().lanes.values().cloned().collect();
        let mut infos: Vec<TableInfo> = lanes
            .iter()
            .map(|lane| {
                let lane = lock(lane);
                TableInfo {
                    token: lane.token().clone(),
                    rows: lane.data().row_count(),
                    pending_records: lane.pending(),
                    pending_conversion: pending_conversion(lane.store()),
                }
            })
            .collect();
        infos.sort_by(|a, b| a.token.name().cmp(b.token.name()));
        infos
    }

    /// Rows in base data; WAL rows count once applied
    pub fn row_count(&self, name: &str) -> Result<usize, EngineError> {
        self.with_lane(name, |lane| lane.data().row_count())
    }

    pub fn pending_records(&self, name: &str) -> Result<u64, EngineError> {
        self.with_lane(name, |lane| lane.pending())
    }

    pub fn pending_conversion(&self, name: &str) -> Result<Option<StorageMode>, EngineError> {
        self.with_lane(name, |lane| pending_conversion(lane.store()))
    }

    pub fn has_pending_conversion(&self, name: &str) -> Result<bool, EngineError> {
        Ok(self.pending_conversion(name)?.is_some())
    }

    pub fn marker_path(&self, name: &str) -> Result<PathBuf, EngineError> {
        self.with_lane(name, |lane| lane.store().marker_path())
    }

    fn create_table(
        &self,
        worker: &mut WorkerContext,
        plan: CreateTablePlan,
    ) -> Result<ExecuteResult, EngineError> {
        let mut catalog = lock(&self.catalog);
        let store = catalog.create_table(
            TableMeta {
                id: TableId(0),
                name: plan.name,
                partition_by: plan.partition_by,
                mode: plan.mode,
            },
            TableData::new(plan.columns, plan.timestamp),
        )?;
        let lane = Lane::open(store, worker.compiler_mut())?;
        let token = lane.token().clone();
        self.write_tables().insert(lane);
        Ok(ExecuteResult::TableCreated(token))
    }

    fn drop_table(&self, token: &TableToken) -> Result<ExecuteResult, EngineError> {
        let mut catalog = lock(&self.catalog);
        let lane = self.lane(token)?;
        {
            // Waits for any in-flight apply on this table
            let mut lane = lock_live(&lane, token)?;
            catalog.drop_table(token.name())?;
            lane.mark_dropped();
        }
        self.write_tables().remove(token);
        Ok(ExecuteResult::TableDropped(token.clone()))
    }

    fn insert(
        &self,
        worker: &mut WorkerContext,
        plan: &InsertPlan,
    ) -> Result<ExecuteResult, EngineError> {
        let lane = self.lane(&plan.table)?;
        let mut lane = lock_live(&lane, &plan.table)?;
        let snapshot = worker.compiler_mut().context_mut().snapshot();
        let rows = build_rows(lane.schema(), plan, &snapshot)?;
        let count = rows.len();
        Ok(match lane.insert(rows)? {
            Applied::Now { rows_affected } => ExecuteResult::Inserted {
                rows: rows_affected,
                logged: None,
            },
            Applied::Logged { seq } => ExecuteResult::Inserted {
                rows: count,
                logged: Some(seq),
            },
        })
    }

    fn change(
        &self,
        token: &TableToken,
        op: &Operation,
        sql: &str,
    ) -> Result<ExecuteResult, EngineError> {
        let lane = self.lane(token)?;
        let mut lane = lock_live(&lane, token)?;
        Ok(match lane.change(op, sql)? {
            Applied::Now { rows_affected } => ExecuteResult::Changed {
                rows_affected,
                logged: None,
            },
            Applied::Logged { seq } => ExecuteResult::Changed {
                rows_affected: 0,
                logged: Some(seq),
            },
        })
    }

    /// Execute `plan`; on success hand it back to the cache
    fn run_cached(
        &self,
        worker: &mut WorkerContext,
        sql: &str,
        plan: SelectPlan,
    ) -> Result<QueryResult, EngineError> {
        let result = self.select(worker, &plan);
        if result.is_ok() {
            worker.query_cache_mut().push(sql, Some(plan));
        }
        result
    }

    fn select(
        &self,
        worker: &mut WorkerContext,
        plan: &SelectPlan,
    ) -> Result<QueryResult, EngineError> {
        let lane = self.lane(&plan.table)?;
        let lane = lock_live(&lane, &plan.table)?;
        let data = lane.data();

        let filter = match &plan.filter {
            Some(predicate) => {
                let index = data
                    .column_index(&predicate.column)
                    .ok_or_else(|| ApplyError::UnknownColumn(predicate.column.clone()))?;
                let snapshot = worker.compiler_mut().context_mut().snapshot();
                let mut rnd = snapshot.rnd();
                Some((index, predicate.value.eval_const(&snapshot, &mut rnd)?))
            }
            None => None,
        };
        let matching = data.rows.iter().filter(|row| match &filter {
            Some((index, expected)) => row.get(*index).is_some_and(|v| v.sql_eq(expected)),
            None => true,
        });

        Ok(match &plan.projection {
            Projection::All => QueryResult {
                columns: data.columns.iter().map(|c| c.name.clone()).collect(),
                rows: matching.cloned().collect(),
            },
            Projection::Count => QueryResult {
                columns: vec!["count".to_string()],
                rows: vec![vec![Value::Long(matching.count() as i64)]],
            },
            Projection::Columns(names) => {
                let indexes = names
                    .iter()
                    .map(|name| {
                        data.column_index(name)
                            .ok_or_else(|| ApplyError::UnknownColumn(name.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                QueryResult {
                    columns: indexes.iter().map(|i| data.columns[*i].name.clone()).collect(),
                    rows: matching
                        .map(|row| indexes.iter().map(|i| row[*i].clone()).collect())
                        .collect(),
                }
            }
        })
    }

    /// A cached plan is reusable while its name still resolves to the same table
    fn is_current(&self, plan: &SelectPlan) -> bool {
        self.resolve_table(plan.table.name())
            .is_some_and(|token| token.id() == plan.table.id())
    }

    fn with_lane<T>(&self, name: &str, f: impl FnOnce(&Lane) -> T) -> Result<T, EngineError> {
        let token = self.table_token(name)?;
        let lane = self.lane(&token)?;
        let lane = lock(&lane);
        Ok(f(&lane))
    }

    fn lane(&self, token: &TableToken) -> Result<Arc<Mutex<Lane>>, EngineError> {
        self.read_tables()
            .lanes
            .get(&token.id())
            .cloned()
            .ok_or_else(|| EngineError::TableNotFound(token.name().to_string()))
    }

    fn lane_by_id(&self, id: TableId) -> Result<Arc<Mutex<Lane>>, EngineError> {
        self.read_tables()
            .lanes
            .get(&id)
            .cloned()
            .ok_or(EngineError::UnknownTableId(id.0))
    }

    fn token_by_id(&self, id: TableId) -> Result<TableToken, EngineError> {
        let lane = self.lane_by_id(id)?;
        let token = lock(&lane).token().clone();
        Ok(token)
    }

    fn read_tables(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_tables(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl TableResolver for Engine {
    fn resolve_table(&self, name: &str) -> Option<TableToken> {
        self.read_tables()
            .by_name
            .get(&name.to_ascii_lowercase())
            .cloned()
    }
}

fn open_table(
    dir: &Path,
    compiler: &mut OperationCompiler,
) -> Result<(Lane, ConversionOutcome), EngineError> {
    let store = TableStore::open(dir)?;
    let mut lane = Lane::open(store, compiler)?;
    let outcome = check_and_apply_on_open(&mut lane, compiler)?;
    Ok((lane, outcome))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Lock a lane that is still registered
fn lock_live<'a>(
    lane: &'a Mutex<Lane>,
    token: &TableToken,
) -> Result<MutexGuard<'a, Lane>, EngineError> {
    let guard = lock(lane);
    if guard.is_dropped() {
        return Err(EngineError::TableNotFound(token.name().to_string()));
    }
    Ok(guard)
}

/// Evaluate INSERT values into full-width rows
///
/// Columns not listed are NULL. Random values and `now()` come from
/// `snapshot`, so logged rows are already fixed values.
fn build_rows(
    schema: &TableData,
    plan: &InsertPlan,
    snapshot: &ContextSnapshot,
) -> Result<Vec<Row>, EngineError> {
    let targets: Vec<usize> = match &plan.columns {
        Some(names) => names
            .iter()
            .map(|name| {
                schema
                    .column_index(name)
                    .ok_or_else(|| ApplyError::UnknownColumn(name.clone()))
            })
            .collect::<Result<_, _>>()?,
        None => (0..schema.columns.len()).collect(),
    };

    let mut rnd = snapshot.rnd();
    let mut rows = Vec::with_capacity(plan.rows.len());
    for exprs in &plan.rows {
        if exprs.len() != targets.len() {
            return Err(EngineError::ColumnCount {
                expected: targets.len(),
                actual: exprs.len(),
            });
        }
        let mut row = vec![Value::Null; schema.columns.len()];
        for (index, expr) in targets.iter().zip(exprs) {
            let column = &schema.columns[*index];
            let value = expr.eval_const(snapshot, &mut rnd)?;
            row[*index] = value.coerce_to(column.ty).ok_or_else(|| ApplyError::TypeMismatch {
                column: column.name.clone(),
                ty: column.ty,
                value: value.to_string(),
            })?;
        }
        rows.push(row);
    }
    Ok(rows)
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.columns.join("\t"))?;
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(Value::to_string).collect();
            writeln!(f, "{}", cells.join("\t"))?;
        }
        Ok(())
    }
}

impl fmt::Display for ExecuteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteResult::TableCreated(t) => writeln!(f, "created {} ({})", t.name(), t.mode()),
            ExecuteResult::TableDropped(t) => writeln!(f, "dropped {}", t.name()),
            ExecuteResult::Inserted { rows, logged: None } => writeln!(f, "inserted {rows}"),
            ExecuteResult::Inserted {
                rows,
                logged: Some(seq),
            } => writeln!(f, "logged {rows} [seq={seq}]"),
            ExecuteResult::Changed {
                rows_affected,
                logged: None,
            } => writeln!(f, "applied {rows_affected}"),
            ExecuteResult::Changed {
                logged: Some(seq), ..
            } => writeln!(f, "logged change [seq={seq}]"),
            ExecuteResult::ConversionScheduled { table, target } => {
                writeln!(f, "{} converts to {} on next open", table.name(), target)
            }
            ExecuteResult::Rows(result) => write!(f, "{result}"),
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
