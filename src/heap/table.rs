//! Row-oriented table over a heap file.
//!
//! A heap table marshals typed rows into record bytes and back, walking the
//! schema columns in declared order: INT as 4 bytes little-endian, TEXT as a
//! 2-byte length followed by the raw bytes, BOOLEAN as one byte. Rows are
//! appended to the last block, spilling into a fresh block when the page
//! reports no room.

use bytes::{Buf, BufMut};

use super::error::RelationError;
use super::file::HeapFile;
use super::Handle;
use crate::storage::{StorageEnv, StoreError, BLOCK_SZ};
use crate::value::{DataType, Row, Value};

/// A relation stored as marshaled rows in a heap file.
pub struct HeapTable<E: StorageEnv> {
    column_names: Vec<String>,
    column_attributes: Vec<DataType>,
    file: HeapFile<E>,
}

impl<E: StorageEnv> HeapTable<E> {
    /// Creates an unopened table handle with the given schema.
    pub fn new(
        env: E,
        name: impl Into<String>,
        column_names: Vec<String>,
        column_attributes: Vec<DataType>,
    ) -> Self {
        Self {
            column_names,
            column_attributes,
            file: HeapFile::new(env, name),
        }
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        self.file.name()
    }

    /// Returns the schema column names in declared order.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Returns the schema column types, parallel to [`column_names`](Self::column_names).
    pub fn column_attributes(&self) -> &[DataType] {
        &self.column_attributes
    }

    /// Returns the declared type of `column`, if it exists.
    pub fn attribute_of(&self, column: &str) -> Option<DataType> {
        self.column_names
            .iter()
            .position(|name| name == column)
            .map(|i| self.column_attributes[i])
    }

    /// Creates the backing file.
    pub fn create(&mut self) -> Result<(), RelationError> {
        self.file.create()?;
        Ok(())
    }

    /// Opens the backing file, creating it if it does not exist.
    pub fn create_if_not_exists(&mut self) -> Result<(), RelationError> {
        match self.file.open() {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound(_)) => self.create(),
            Err(e) => Err(e.into()),
        }
    }

    /// Drops the relation, deleting the backing file.
    pub fn destroy(&mut self) -> Result<(), RelationError> {
        self.file.destroy()?;
        Ok(())
    }

    /// Opens the backing file. A no-op when already open.
    pub fn open(&mut self) -> Result<(), RelationError> {
        self.file.open()?;
        Ok(())
    }

    /// Flushes and closes the backing file.
    pub fn close(&mut self) -> Result<(), RelationError> {
        self.file.close()?;
        Ok(())
    }

    /// Inserts a row and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`RelationError`] if a schema column is missing from the row
    /// (NULLs are not supported), a value has the wrong type, or the
    /// marshaled row cannot fit in a block.
    pub fn insert(&mut self, row: &Row) -> Result<Handle, RelationError> {
        self.open()?;
        let full_row = self.validate(row)?;
        let data = self.marshal(&full_row)?;
        self.append(&data)
    }

    /// Appends marshaled row bytes, spilling to a fresh block on `NoRoom`.
    fn append(&mut self, data: &[u8]) -> Result<Handle, RelationError> {
        let mut page = self.file.get(self.file.last_block_id())?;
        let record_id = match page.add(data) {
            Ok(id) => id,
            Err(_) => {
                page = self.file.get_new()?;
                page.add(data)?
            }
        };
        self.file.put(&page)?;
        Ok(Handle::new(page.block_id(), record_id))
    }

    /// Replaces the columns in `new_values` within the row at `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`RelationError`] for an unknown column, and surfaces
    /// [`NoRoom`](super::NoRoom) when the enlarged record no longer fits in
    /// its page.
    pub fn update(&mut self, handle: Handle, new_values: &Row) -> Result<(), RelationError> {
        self.open()?;
        let mut row = self.project(handle)?;
        for (column, value) in new_values {
            if !row.contains_key(column) {
                return Err(RelationError::UnknownColumn(column.clone()));
            }
            row.insert(column.clone(), value.clone());
        }
        let data = self.marshal(&row)?;
        let mut page = self.file.get(handle.block_id)?;
        page.put(handle.record_id, &data)?;
        self.file.put(&page)?;
        Ok(())
    }

    /// Deletes the row at `handle`. Its record id is tombstoned, never reused.
    pub fn del(&mut self, handle: Handle) -> Result<(), RelationError> {
        self.open()?;
        let mut page = self.file.get(handle.block_id)?;
        page.del(handle.record_id);
        self.file.put(&page)?;
        Ok(())
    }

    /// Returns handles for every row, in scan order.
    pub fn select(&mut self) -> Result<Vec<Handle>, RelationError> {
        self.select_where(None)
    }

    /// Full scan with an optional equality predicate.
    ///
    /// A row qualifies when its projection onto the predicate's columns
    /// equals the predicate. Handles are returned in ascending block id,
    /// ascending record id order.
    pub fn select_where(&mut self, where_clause: Option<&Row>) -> Result<Vec<Handle>, RelationError> {
        self.open()?;
        let mut handles = Vec::new();
        for block_id in self.file.block_ids() {
            let page = self.file.get(block_id)?;
            for record_id in page.ids() {
                let handle = Handle::new(block_id, record_id);
                if self.selected(handle, where_clause)? {
                    handles.push(handle);
                }
            }
        }
        Ok(handles)
    }

    fn selected(&mut self, handle: Handle, where_clause: Option<&Row>) -> Result<bool, RelationError> {
        let Some(where_clause) = where_clause else {
            return Ok(true);
        };
        let columns: Vec<String> = where_clause.keys().cloned().collect();
        let row = self.project_columns(handle, &columns)?;
        Ok(&row == where_clause)
    }

    /// Reads back the full row at `handle`.
    pub fn project(&mut self, handle: Handle) -> Result<Row, RelationError> {
        self.open()?;
        let page = self.file.get(handle.block_id)?;
        let data = page
            .get(handle.record_id)
            .ok_or(RelationError::RecordNotFound(handle))?;
        self.unmarshal(data)
    }

    /// Reads back the row at `handle` restricted to `columns`.
    ///
    /// An empty column list projects the full row.
    pub fn project_columns(&mut self, handle: Handle, columns: &[String]) -> Result<Row, RelationError> {
        let row = self.project(handle)?;
        if columns.is_empty() {
            return Ok(row);
        }
        let mut result = Row::new();
        for column in columns {
            let value = row
                .get(column)
                .ok_or_else(|| RelationError::UnknownColumn(column.clone()))?;
            result.insert(column.clone(), value.clone());
        }
        Ok(result)
    }

    /// Checks a row against the schema, returning the full row to store.
    ///
    /// Every schema column must be present; NULLs and defaults are not
    /// supported. Extra columns in the input are ignored.
    pub fn validate(&self, row: &Row) -> Result<Row, RelationError> {
        let mut full_row = Row::new();
        for column in &self.column_names {
            let value = row
                .get(column)
                .ok_or_else(|| RelationError::MissingColumn(column.clone()))?;
            full_row.insert(column.clone(), value.clone());
        }
        Ok(full_row)
    }

    /// Marshals a full row into record bytes, schema columns in order.
    pub fn marshal(&self, row: &Row) -> Result<Vec<u8>, RelationError> {
        let mut bytes = Vec::new();
        for (column, attribute) in self.column_names.iter().zip(&self.column_attributes) {
            let value = row
                .get(column)
                .ok_or_else(|| RelationError::MissingColumn(column.clone()))?;
            match (attribute, value) {
                (DataType::Int, Value::Int(n)) => {
                    if bytes.len() + 4 > BLOCK_SZ {
                        return Err(RelationError::RowTooBig);
                    }
                    bytes.put_i32_le(*n);
                }
                (DataType::Text, Value::Text(s)) => {
                    if s.len() > u16::MAX as usize {
                        return Err(RelationError::TextTooLong(s.len()));
                    }
                    if bytes.len() + 2 + s.len() > BLOCK_SZ {
                        return Err(RelationError::RowTooBig);
                    }
                    bytes.put_u16_le(s.len() as u16);
                    bytes.put_slice(s.as_bytes());
                }
                (DataType::Boolean, Value::Boolean(b)) => {
                    if bytes.len() + 1 > BLOCK_SZ {
                        return Err(RelationError::RowTooBig);
                    }
                    bytes.put_u8(*b as u8);
                }
                _ => {
                    return Err(RelationError::TypeMismatch {
                        column: column.clone(),
                        expected: *attribute,
                    })
                }
            }
        }
        Ok(bytes)
    }

    /// Unmarshals record bytes back into a row, schema columns in order.
    pub fn unmarshal(&self, mut data: &[u8]) -> Result<Row, RelationError> {
        let mut row = Row::new();
        for (column, attribute) in self.column_names.iter().zip(&self.column_attributes) {
            let value = match attribute {
                DataType::Int => {
                    if data.remaining() < 4 {
                        return Err(short_record(column));
                    }
                    Value::Int(data.get_i32_le())
                }
                DataType::Text => {
                    if data.remaining() < 2 {
                        return Err(short_record(column));
                    }
                    let len = data.get_u16_le() as usize;
                    if data.remaining() < len {
                        return Err(short_record(column));
                    }
                    let text = String::from_utf8(data.copy_to_bytes(len).to_vec())
                        .map_err(|_| RelationError::Corrupt(format!(
                            "column '{}' holds invalid text",
                            column
                        )))?;
                    Value::Text(text)
                }
                DataType::Boolean => {
                    if data.remaining() < 1 {
                        return Err(short_record(column));
                    }
                    Value::Boolean(data.get_u8() != 0)
                }
            };
            row.insert(column.clone(), value);
        }
        Ok(row)
    }
}

fn short_record(column: &str) -> RelationError {
    RelationError::Corrupt(format!("record too short for column '{}'", column))
}
