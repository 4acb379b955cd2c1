//! SQL-level execution errors.

use std::fmt;

use crate::heap::RelationError;
use crate::storage::StoreError;

/// Errors raised while executing a statement.
#[derive(Debug)]
pub enum ExecError {
    /// Relation-level failure, reported uniformly with its source prefix.
    Relation(RelationError),
    /// Column type other than INT or TEXT in CREATE TABLE.
    UnrecognizedDataType,
    /// WHERE clause operator other than `=` joined by AND.
    NotSupportedOperation,
    /// Literal kind other than integer or string.
    NotSupportedLiteral,
    /// Attempt to drop one of the schema tables.
    SchemaTable(String),
    /// Index column that is not a column of the table.
    ColumnNotInTable {
        /// Missing column.
        column: String,
        /// Table it was looked up on.
        table: String,
    },
    /// INSERT with more values than the table has columns.
    TooManyValues {
        /// Target table.
        table: String,
    },
    /// INSERT column list and value list of different lengths.
    ValueCountMismatch {
        /// Columns named in the statement.
        columns: usize,
        /// Values supplied.
        values: usize,
    },
    /// Integer literal outside the 32-bit column range.
    IntegerOutOfRange(i64),
    /// The plan shape does not support the requested output.
    InvalidPlan(&'static str),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Relation(e) => write!(f, "RelationError: {}", e),
            ExecError::UnrecognizedDataType => write!(f, "unrecognized data type"),
            ExecError::NotSupportedOperation => write!(f, "Not supported operation type"),
            ExecError::NotSupportedLiteral => write!(f, "Not supported literal type"),
            ExecError::SchemaTable(name) => {
                write!(f, "cannot drop a schema table: '{}'", name)
            }
            ExecError::ColumnNotInTable { column, table } => {
                write!(f, "column '{}' does not exist in {}", column, table)
            }
            ExecError::TooManyValues { table } => {
                write!(f, "too many values for columns of {}", table)
            }
            ExecError::ValueCountMismatch { columns, values } => {
                write!(f, "{} columns named but {} values given", columns, values)
            }
            ExecError::IntegerOutOfRange(n) => {
                write!(f, "integer literal {} out of range", n)
            }
            ExecError::InvalidPlan(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Relation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RelationError> for ExecError {
    fn from(e: RelationError) -> Self {
        ExecError::Relation(e)
    }
}

impl From<StoreError> for ExecError {
    fn from(e: StoreError) -> Self {
        ExecError::Relation(RelationError::Store(e))
    }
}
