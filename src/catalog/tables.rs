//! The `_tables` relation and the open-relation cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::columns::Columns;
use super::schema;
use super::SharedTable;
use crate::heap::{Handle, HeapTable, RelationError};
use crate::storage::StorageEnv;
use crate::value::Row;

/// The table of tables: one row per user and system table, augmented with a
/// name-to-relation cache so each relation is opened once per process.
pub struct Tables<E: StorageEnv> {
    env: E,
    relation: SharedTable<E>,
    cache: HashMap<String, SharedTable<E>>,
}

impl<E: StorageEnv> Tables<E> {
    /// Creates the `_tables` handle (not yet opened).
    pub fn new(env: E) -> Self {
        let (column_names, column_attributes) = schema::tables_schema();
        let relation = Arc::new(Mutex::new(HeapTable::new(
            env.clone(),
            schema::TABLES_TABLE,
            column_names,
            column_attributes,
        )));
        Self {
            env,
            relation,
            cache: HashMap::new(),
        }
    }

    /// Shared handle to the underlying `_tables` relation.
    pub(super) fn relation(&self) -> SharedTable<E> {
        self.relation.clone()
    }

    /// Registers a relation handle in the cache under `name`.
    pub(super) fn seed(&mut self, name: &str, table: SharedTable<E>) {
        self.cache.insert(name.to_string(), table);
    }

    /// Resolves a table name to a live relation handle.
    ///
    /// On a cache miss the table's columns are read from `_columns`, a
    /// `HeapTable` is constructed (its backing file opens lazily on first
    /// use), and the handle is cached.
    ///
    /// # Errors
    ///
    /// Returns `RelationError::UnknownTable` if `_columns` has no rows for
    /// `name`.
    pub fn get_table(
        &mut self,
        columns: &Columns<E>,
        name: &str,
    ) -> Result<SharedTable<E>, RelationError> {
        if let Some(table) = self.cache.get(name) {
            return Ok(table.clone());
        }
        let (column_names, column_attributes) = columns.schema_of(name)?;
        if column_names.is_empty() {
            return Err(RelationError::UnknownTable(name.to_string()));
        }
        let table = Arc::new(Mutex::new(HeapTable::new(
            self.env.clone(),
            name,
            column_names,
            column_attributes,
        )));
        self.cache.insert(name.to_string(), table.clone());
        Ok(table)
    }

    /// Drops a cached relation handle (after DROP TABLE or a rolled-back
    /// CREATE TABLE).
    pub fn evict(&mut self, name: &str) {
        self.cache.remove(name);
    }

    /// Closes every cached relation and the `_tables` relation itself.
    pub fn close_all(&mut self) -> Result<(), RelationError> {
        for table in self.cache.values() {
            table.lock().close()?;
        }
        self.cache.clear();
        self.relation.lock().close()
    }

    /// Inserts a `_tables` row.
    pub fn insert(&mut self, row: &Row) -> Result<Handle, RelationError> {
        self.relation.lock().insert(row)
    }

    /// Deletes a `_tables` row.
    pub fn del(&mut self, handle: Handle) -> Result<(), RelationError> {
        self.relation.lock().del(handle)
    }

    /// Handles of all `_tables` rows.
    pub fn select(&self) -> Result<Vec<Handle>, RelationError> {
        self.relation.lock().select()
    }

    /// Handles of `_tables` rows matching the predicate.
    pub fn select_where(&self, where_clause: &Row) -> Result<Vec<Handle>, RelationError> {
        self.relation.lock().select_where(Some(where_clause))
    }

    /// Projects a `_tables` row onto `columns`.
    pub fn project_columns(&self, handle: Handle, columns: &[String]) -> Result<Row, RelationError> {
        self.relation.lock().project_columns(handle, columns)
    }
}
