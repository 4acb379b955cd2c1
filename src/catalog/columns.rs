//! The `_columns` relation.

use std::sync::Arc;

use parking_lot::Mutex;

use super::schema;
use super::SharedTable;
use crate::heap::{Handle, HeapTable, RelationError};
use crate::storage::StorageEnv;
use crate::value::{DataType, Row, Value};

/// The table of columns: one row per column of every table, in declaration
/// order.
pub struct Columns<E: StorageEnv> {
    relation: SharedTable<E>,
}

impl<E: StorageEnv> Columns<E> {
    /// Creates the `_columns` handle (not yet opened).
    pub fn new(env: E) -> Self {
        let (column_names, column_attributes) = schema::columns_schema();
        Self {
            relation: Arc::new(Mutex::new(HeapTable::new(
                env,
                schema::COLUMNS_TABLE,
                column_names,
                column_attributes,
            ))),
        }
    }

    /// Shared handle to the underlying `_columns` relation.
    pub(super) fn relation(&self) -> SharedTable<E> {
        self.relation.clone()
    }

    /// Reads a table's schema from its `_columns` rows.
    ///
    /// The row scan order is the column declaration order. An unregistered
    /// table yields empty vectors.
    pub fn schema_of(&self, table: &str) -> Result<(Vec<String>, Vec<DataType>), RelationError> {
        let mut relation = self.relation.lock();
        let where_clause = Row::from([(schema::TABLE_NAME.to_string(), Value::from(table))]);
        let mut column_names = Vec::new();
        let mut column_attributes = Vec::new();
        for handle in relation.select_where(Some(&where_clause))? {
            let row = relation.project(handle)?;
            let Some(Value::Text(name)) = row.get(schema::COLUMN_NAME) else {
                return Err(RelationError::Corrupt(format!(
                    "_columns row for '{}' has no column name",
                    table
                )));
            };
            let attribute = match row.get(schema::DATA_TYPE) {
                Some(Value::Text(tag)) => DataType::from_catalog_name(tag).ok_or_else(|| {
                    RelationError::Corrupt(format!("unknown data type '{}' in _columns", tag))
                })?,
                _ => {
                    return Err(RelationError::Corrupt(format!(
                        "_columns row for '{}' has no data type",
                        table
                    )))
                }
            };
            column_names.push(name.clone());
            column_attributes.push(attribute);
        }
        Ok((column_names, column_attributes))
    }

    /// Inserts a `_columns` row.
    pub fn insert(&mut self, row: &Row) -> Result<Handle, RelationError> {
        self.relation.lock().insert(row)
    }

    /// Deletes a `_columns` row.
    pub fn del(&mut self, handle: Handle) -> Result<(), RelationError> {
        self.relation.lock().del(handle)
    }

    /// Handles of `_columns` rows matching the predicate.
    pub fn select_where(&self, where_clause: &Row) -> Result<Vec<Handle>, RelationError> {
        self.relation.lock().select_where(Some(where_clause))
    }

    /// Projects a `_columns` row onto `columns`.
    pub fn project_columns(&self, handle: Handle, columns: &[String]) -> Result<Row, RelationError> {
        self.relation.lock().project_columns(handle, columns)
    }
}
