//! The `_indices` relation and the index body.
//!
//! The executor treats the index body as a collaborator with a
//! create/drop/insert surface; [`Index`] backs it with a handle-list heap
//! file named `<table>.<index>` inside the same environment.

use std::sync::Arc;

use bytes::BufMut;
use parking_lot::Mutex;

use super::schema;
use super::SharedTable;
use crate::heap::{Handle, HeapFile, HeapTable, RelationError};
use crate::storage::StorageEnv;
use crate::value::{Row, Value};

/// Definition of one index, reassembled from its `_indices` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    /// Indexed columns, ordered by `seq_in_index`.
    pub columns: Vec<String>,
    /// Index type tag (`BTREE` or `HASH`).
    pub index_type: String,
    /// Whether the index is unique.
    pub is_unique: bool,
}

/// The table of indices: one row per (index, column) pair.
pub struct Indices<E: StorageEnv> {
    env: E,
    relation: SharedTable<E>,
}

impl<E: StorageEnv> Indices<E> {
    /// Creates the `_indices` handle (not yet opened).
    pub fn new(env: E) -> Self {
        let (column_names, column_attributes) = schema::indices_schema();
        Self {
            env: env.clone(),
            relation: Arc::new(Mutex::new(HeapTable::new(
                env,
                schema::INDICES_TABLE,
                column_names,
                column_attributes,
            ))),
        }
    }

    /// Shared handle to the underlying `_indices` relation.
    pub(super) fn relation(&self) -> SharedTable<E> {
        self.relation.clone()
    }

    /// Names of the indices on `table`, first-seen order, deduplicated
    /// (multi-column indices have one `_indices` row per column).
    pub fn index_names(&self, table: &str) -> Result<Vec<String>, RelationError> {
        let mut relation = self.relation.lock();
        let where_clause = Row::from([(schema::TABLE_NAME.to_string(), Value::from(table))]);
        let mut names: Vec<String> = Vec::new();
        for handle in relation.select_where(Some(&where_clause))? {
            let row = relation.project_columns(handle, &[schema::INDEX_NAME.to_string()])?;
            if let Some(Value::Text(name)) = row.get(schema::INDEX_NAME) {
                if !names.iter().any(|n| n == name) {
                    names.push(name.clone());
                }
            }
        }
        Ok(names)
    }

    /// Resolves an index body for `(table, index)`.
    ///
    /// # Errors
    ///
    /// Returns `RelationError::UnknownIndex` if `_indices` has no row for
    /// the pair.
    pub fn get_index(&self, table: &str, index: &str) -> Result<Index<E>, RelationError> {
        if self.rows_of(table, index)?.is_empty() {
            return Err(RelationError::UnknownIndex {
                table: table.to_string(),
                index: index.to_string(),
            });
        }
        Ok(Index::new(self.env.clone(), table, index))
    }

    /// Reassembles the definition of `(table, index)` from its rows.
    pub fn index_definition(&self, table: &str, index: &str) -> Result<IndexDef, RelationError> {
        let handles = self.rows_of(table, index)?;
        if handles.is_empty() {
            return Err(RelationError::UnknownIndex {
                table: table.to_string(),
                index: index.to_string(),
            });
        }
        let mut relation = self.relation.lock();
        let mut columns: Vec<(i32, String)> = Vec::new();
        let mut index_type = String::new();
        let mut is_unique = false;
        for handle in handles {
            let row = relation.project(handle)?;
            let (Some(Value::Int(seq)), Some(Value::Text(column))) =
                (row.get(schema::SEQ_IN_INDEX), row.get(schema::COLUMN_NAME))
            else {
                return Err(RelationError::Corrupt(format!(
                    "_indices row for '{}.{}' is malformed",
                    table, index
                )));
            };
            columns.push((*seq, column.clone()));
            if let Some(Value::Text(tag)) = row.get(schema::INDEX_TYPE) {
                index_type = tag.clone();
            }
            if let Some(Value::Boolean(unique)) = row.get(schema::IS_UNIQUE) {
                is_unique = *unique;
            }
        }
        columns.sort_by_key(|(seq, _)| *seq);
        Ok(IndexDef {
            columns: columns.into_iter().map(|(_, column)| column).collect(),
            index_type,
            is_unique,
        })
    }

    fn rows_of(&self, table: &str, index: &str) -> Result<Vec<Handle>, RelationError> {
        let where_clause = Row::from([
            (schema::TABLE_NAME.to_string(), Value::from(table)),
            (schema::INDEX_NAME.to_string(), Value::from(index)),
        ]);
        self.relation.lock().select_where(Some(&where_clause))
    }

    /// Inserts an `_indices` row.
    pub fn insert(&mut self, row: &Row) -> Result<Handle, RelationError> {
        self.relation.lock().insert(row)
    }

    /// Deletes an `_indices` row.
    pub fn del(&mut self, handle: Handle) -> Result<(), RelationError> {
        self.relation.lock().del(handle)
    }

    /// Handles of `_indices` rows matching the predicate.
    pub fn select_where(&self, where_clause: &Row) -> Result<Vec<Handle>, RelationError> {
        self.relation.lock().select_where(Some(where_clause))
    }

    /// Projects an `_indices` row onto `columns`.
    pub fn project_columns(&self, handle: Handle, columns: &[String]) -> Result<Row, RelationError> {
        self.relation.lock().project_columns(handle, columns)
    }
}

/// An index body: a heap file of row handles named `<table>.<index>`.
///
/// The executor only drives the lifecycle (create, drop) and feeds it
/// handles on insert; lookup structure is outside this engine's scope.
pub struct Index<E: StorageEnv> {
    file: HeapFile<E>,
}

impl<E: StorageEnv> Index<E> {
    fn new(env: E, table: &str, index: &str) -> Self {
        Self {
            file: HeapFile::new(env, format!("{}.{}", table, index)),
        }
    }

    /// Creates the index's backing file.
    pub fn create(&mut self) -> Result<(), RelationError> {
        self.file.create()?;
        Ok(())
    }

    /// Drops the index, deleting its backing file.
    pub fn destroy(&mut self) -> Result<(), RelationError> {
        self.file.destroy()?;
        Ok(())
    }

    /// Records a row handle in the index.
    pub fn insert(&mut self, handle: Handle) -> Result<(), RelationError> {
        self.file.open()?;
        let mut data = Vec::with_capacity(6);
        data.put_u32_le(handle.block_id);
        data.put_u16_le(handle.record_id);

        let mut page = self.file.get(self.file.last_block_id())?;
        if page.add(&data).is_err() {
            page = self.file.get_new()?;
            page.add(&data)?;
        }
        self.file.put(&page)?;
        Ok(())
    }

    /// Flushes and closes the backing file.
    pub fn close(&mut self) -> Result<(), RelationError> {
        self.file.close()?;
        Ok(())
    }
}
