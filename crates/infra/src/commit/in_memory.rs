use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

use super::operation::{Columns, Key, Operation, Precondition, Table, Value};
use super::plan::CommitPlan;
use super::{CommitError, Committer};

/// A stored row: column name to value.
pub type StoredRow = BTreeMap<&'static str, Value>;

#[derive(Debug, Clone, Default)]
struct Tables {
    rows: BTreeMap<Table, BTreeMap<String, StoredRow>>,
}

impl Tables {
    fn apply(&mut self, operation: Operation) -> Result<(), CommitError> {
        match operation {
            Operation::Insert { table, row } => self.insert(table, row),
            Operation::Update {
                table,
                key,
                set,
                precondition,
            } => self.update(table, key, set, precondition),
        }
    }

    fn insert(&mut self, table: Table, row: Columns) -> Result<(), CommitError> {
        let pk = table.primary_key();
        let key = row
            .iter()
            .find(|(column, _)| *column == pk)
            .map(|(_, value)| value.to_string())
            .ok_or_else(|| CommitError::Storage(format!("insert into {table} without {pk}")))?;

        let rows = self.rows.entry(table).or_default();
        if rows.contains_key(&key) {
            return Err(CommitError::DuplicateKey { table, key });
        }
        rows.insert(key, row.into_iter().collect());
        Ok(())
    }

    fn update(
        &mut self,
        table: Table,
        key: Key,
        set: Columns,
        precondition: Option<Precondition>,
    ) -> Result<(), CommitError> {
        let key = key.value.to_string();
        let stored = self
            .rows
            .get_mut(&table)
            .and_then(|rows| rows.get_mut(&key))
            .ok_or_else(|| CommitError::MissingRow {
                table,
                key: key.clone(),
            })?;

        if let Some(precondition) = precondition {
            if stored.get(precondition.column()) != Some(&precondition.expected()) {
                return Err(CommitError::Conflict { table, key });
            }
        }

        for (column, value) in set {
            stored.insert(column, value);
        }
        Ok(())
    }
}

/// In-memory store with all-or-nothing commits.
///
/// Each commit stages every operation on a copy of the tables and swaps it in
/// only when all of them succeed. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    fail_at: Mutex<Option<usize>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next commit fail when it reaches the operation at `index`.
    pub fn fail_on_operation(&self, index: usize) {
        match self.fail_at.lock() {
            Ok(mut guard) => *guard = Some(index),
            Err(poisoned) => *poisoned.into_inner() = Some(index),
        }
    }

    pub fn row(&self, table: Table, key: &str) -> Result<Option<StoredRow>, CommitError> {
        let tables = self.read()?;
        Ok(tables.rows.get(&table).and_then(|rows| rows.get(key)).cloned())
    }

    pub fn rows(&self, table: Table) -> Result<Vec<StoredRow>, CommitError> {
        let tables = self.read()?;
        Ok(tables
            .rows
            .get(&table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    pub fn count(&self, table: Table) -> Result<usize, CommitError> {
        let tables = self.read()?;
        Ok(tables.rows.get(&table).map_or(0, BTreeMap::len))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, CommitError> {
        self.tables
            .read()
            .map_err(|_| CommitError::Storage("lock poisoned".to_string()))
    }

    fn apply_plan(&self, plan: CommitPlan) -> Result<(), CommitError> {
        let injected = match self.fail_at.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        let mut tables = self
            .tables
            .write()
            .map_err(|_| CommitError::Storage("lock poisoned".to_string()))?;

        let mut staged = tables.clone();
        for (index, operation) in plan.into_operations().into_iter().enumerate() {
            if injected == Some(index) {
                return Err(CommitError::Storage(format!(
                    "injected failure at operation {index}"
                )));
            }
            staged.apply(operation)?;
        }

        *tables = staged;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Committer for InMemoryStore {
    async fn apply(&self, plan: CommitPlan) -> Result<(), CommitError> {
        self.apply_plan(plan)
    }
}
