//! Heap-layer errors.

use std::fmt;

use super::Handle;
use crate::storage::StoreError;
use crate::value::DataType;

/// A page cannot fit a record of the requested size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoRoom {
    /// Bytes required for the record and its slot.
    pub required: usize,
    /// Bytes available between the slot directory and the record area.
    pub available: usize,
}

impl fmt::Display for NoRoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "not enough room for record: need {} bytes, have {}",
            self.required, self.available
        )
    }
}

impl std::error::Error for NoRoom {}

/// Schema, marshaling, or projection violation at the relation level.
#[derive(Debug)]
pub enum RelationError {
    /// No such table in the catalog.
    UnknownTable(String),
    /// No such index on the table.
    UnknownIndex {
        /// Table the index was looked up on.
        table: String,
        /// Index name.
        index: String,
    },
    /// A requested column does not exist in the row.
    UnknownColumn(String),
    /// A schema column has no value in the row to insert.
    MissingColumn(String),
    /// The value's type does not match the column's declared type.
    TypeMismatch {
        /// Column with the mismatched value.
        column: String,
        /// Declared column type.
        expected: DataType,
    },
    /// Marshaled row would exceed the block size.
    RowTooBig,
    /// Text value longer than the 2-byte length prefix allows.
    TextTooLong(usize),
    /// The handle's record slot is a tombstone or out of range.
    RecordNotFound(Handle),
    /// Stored bytes do not unmarshal against the schema.
    Corrupt(String),
    /// Page-level out-of-room condition surfaced to the caller.
    NoRoom(NoRoom),
    /// Block-store failure.
    Store(StoreError),
}

impl fmt::Display for RelationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationError::UnknownTable(name) => write!(f, "table '{}' does not exist", name),
            RelationError::UnknownIndex { table, index } => {
                write!(f, "index '{}' does not exist on table '{}'", index, table)
            }
            RelationError::UnknownColumn(name) => {
                write!(f, "table does not have column named '{}'", name)
            }
            RelationError::MissingColumn(name) => {
                write!(f, "missing value for column '{}'", name)
            }
            RelationError::TypeMismatch { column, expected } => {
                write!(f, "value for column '{}' is not of type {}", column, expected)
            }
            RelationError::RowTooBig => write!(f, "row too big to marshal"),
            RelationError::TextTooLong(len) => {
                write!(f, "text field of {} bytes too long to marshal", len)
            }
            RelationError::RecordNotFound(handle) => {
                write!(
                    f,
                    "no record at block {}, slot {}",
                    handle.block_id, handle.record_id
                )
            }
            RelationError::Corrupt(msg) => write!(f, "corrupt record: {}", msg),
            RelationError::NoRoom(e) => write!(f, "{}", e),
            RelationError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RelationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelationError::NoRoom(e) => Some(e),
            RelationError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NoRoom> for RelationError {
    fn from(e: NoRoom) -> Self {
        RelationError::NoRoom(e)
    }
}

impl From<StoreError> for RelationError {
    fn from(e: StoreError) -> Self {
        RelationError::Store(e)
    }
}
