//! Heap storage: slotted pages, heap files, and heap tables.

mod error;
mod file;
mod page;
mod table;

pub use error::{NoRoom, RelationError};
pub use file::HeapFile;
pub use page::{RecordId, SlottedPage};
pub use table::HeapTable;

use crate::storage::{BlockId, StorageEnv};
use crate::value::{DataType, Row, Value};

/// Stable address of one row: a block plus a record slot within it.
///
/// Handles stay valid for the lifetime of the row: record ids survive
/// intra-page compaction and pages are never deallocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    /// Block holding the record.
    pub block_id: BlockId,
    /// Record slot within the block.
    pub record_id: RecordId,
}

impl Handle {
    /// Creates a handle from its parts.
    pub fn new(block_id: BlockId, record_id: RecordId) -> Self {
        Self {
            block_id,
            record_id,
        }
    }
}

/// Exercises the heap layer end to end against a live environment.
///
/// This is the storage smoke test behind the shell's `test` command: it
/// creates and drops a scratch table, inserts a row, scans it back, and
/// verifies the projected values.
pub fn smoke_test<E: StorageEnv>(env: &E) -> Result<(), RelationError> {
    let columns = vec!["a".to_string(), "b".to_string()];
    let attributes = vec![DataType::Int, DataType::Text];

    let mut scratch = HeapTable::new(env.clone(), "_test_create_drop", columns.clone(), attributes.clone());
    scratch.create()?;
    scratch.destroy()?;

    let mut table = HeapTable::new(env.clone(), "_test_data", columns, attributes);
    table.create_if_not_exists()?;

    let row = Row::from([
        ("a".to_string(), Value::Int(12)),
        ("b".to_string(), Value::from("Hello!")),
    ]);
    table.insert(&row)?;

    let handles = table.select()?;
    let Some(&handle) = handles.first() else {
        table.destroy()?;
        return Err(RelationError::Corrupt("select returned no rows".to_string()));
    };
    let result = table.project(handle)?;
    if result != row {
        table.destroy()?;
        return Err(RelationError::Corrupt(
            "projected row does not match the inserted row".to_string(),
        ));
    }
    table.destroy()?;
    Ok(())
}
