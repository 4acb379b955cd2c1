//! The self-describing catalog.
//!
//! The schema lives in three heap tables — `_tables`, `_columns`,
//! `_indices` — managed by the same engine they describe. On first open the
//! catalog bootstraps itself: it creates the three backing files and
//! inserts the rows describing the schema tables, so every later load goes
//! through the uniform path.

pub mod schema;

mod columns;
mod indices;
mod tables;

pub use columns::Columns;
pub use indices::{Index, IndexDef, Indices};
pub use tables::Tables;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::heap::{HeapTable, RelationError};
use crate::storage::StorageEnv;
use crate::value::{Row, Value};

/// A relation shared between the catalog cache and plan nodes.
pub type SharedTable<E> = Arc<Mutex<HeapTable<E>>>;

/// The catalog: schema tables plus the open-relation cache.
///
/// Process-wide state in the original design; here an explicit context
/// owned by the [`Database`](crate::db::Database) and threaded through the
/// executor.
pub struct Catalog<E: StorageEnv> {
    /// The `_tables` relation and relation cache.
    pub tables: Tables<E>,
    /// The `_columns` relation.
    pub columns: Columns<E>,
    /// The `_indices` relation.
    pub indices: Indices<E>,
}

impl<E: StorageEnv> Catalog<E> {
    /// Opens the catalog, bootstrapping the schema tables on first use.
    pub fn open(env: E) -> Result<Self, RelationError> {
        let mut tables = Tables::new(env.clone());
        let columns = Columns::new(env.clone());
        let indices = Indices::new(env);

        tables.relation().lock().create_if_not_exists()?;
        columns.relation().lock().create_if_not_exists()?;
        indices.relation().lock().create_if_not_exists()?;

        // the schema relations resolve through the same cache as user tables
        tables.seed(schema::COLUMNS_TABLE, columns.relation());
        tables.seed(schema::INDICES_TABLE, indices.relation());
        let tables_relation = tables.relation();
        tables.seed(schema::TABLES_TABLE, tables_relation);

        let mut catalog = Self {
            tables,
            columns,
            indices,
        };
        if catalog.tables.select()?.is_empty() {
            catalog.bootstrap()?;
        }
        Ok(catalog)
    }

    /// Inserts the rows describing the schema tables themselves.
    fn bootstrap(&mut self) -> Result<(), RelationError> {
        for table in [
            schema::TABLES_TABLE,
            schema::COLUMNS_TABLE,
            schema::INDICES_TABLE,
        ] {
            let row = Row::from([(schema::TABLE_NAME.to_string(), Value::from(table))]);
            self.tables.insert(&row)?;
        }
        for (table, (column_names, column_attributes)) in [
            (schema::TABLES_TABLE, schema::tables_schema()),
            (schema::COLUMNS_TABLE, schema::columns_schema()),
            (schema::INDICES_TABLE, schema::indices_schema()),
        ] {
            for (name, attribute) in column_names.iter().zip(&column_attributes) {
                let row = Row::from([
                    (schema::TABLE_NAME.to_string(), Value::from(table)),
                    (schema::COLUMN_NAME.to_string(), Value::from(name.as_str())),
                    (
                        schema::DATA_TYPE.to_string(),
                        Value::from(attribute.catalog_name()),
                    ),
                ]);
                self.columns.insert(&row)?;
            }
        }
        Ok(())
    }

    /// Resolves a table name to a live relation handle (see
    /// [`Tables::get_table`]).
    pub fn get_table(&mut self, name: &str) -> Result<SharedTable<E>, RelationError> {
        self.tables.get_table(&self.columns, name)
    }

    /// Drops a cached relation handle.
    pub fn evict(&mut self, name: &str) {
        self.tables.evict(name);
    }

    /// Closes every open relation, flushing the backing store.
    pub fn close(&mut self) -> Result<(), RelationError> {
        self.tables.close_all()?;
        self.columns.relation().lock().close()?;
        self.indices.relation().lock().close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryEnv;
    use crate::value::DataType;

    #[test]
    fn test_bootstrap_registers_schema_tables() {
        let env = MemoryEnv::new();
        let catalog = Catalog::open(env).unwrap();

        assert_eq!(catalog.tables.select().unwrap().len(), 3);
        let (names, attributes) = catalog.columns.schema_of("_indices").unwrap();
        assert_eq!(
            names,
            vec![
                "table_name",
                "index_name",
                "column_name",
                "seq_in_index",
                "index_type",
                "is_unique"
            ]
        );
        assert_eq!(attributes[3], DataType::Int);
        assert_eq!(attributes[5], DataType::Boolean);
    }

    #[test]
    fn test_bootstrap_is_idempotent_across_reopens() {
        let env = MemoryEnv::new();
        {
            let mut catalog = Catalog::open(env.clone()).unwrap();
            catalog.close().unwrap();
        }
        let catalog = Catalog::open(env).unwrap();
        assert_eq!(catalog.tables.select().unwrap().len(), 3);
    }

    #[test]
    fn test_get_table_unknown() {
        let env = MemoryEnv::new();
        let mut catalog = Catalog::open(env).unwrap();
        assert!(matches!(
            catalog.get_table("missing"),
            Err(RelationError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_get_table_resolves_schema_tables() {
        let env = MemoryEnv::new();
        let mut catalog = Catalog::open(env).unwrap();

        let tables = catalog.get_table("_tables").unwrap();
        assert_eq!(tables.lock().column_names(), ["table_name"]);
        let columns = catalog.get_table("_columns").unwrap();
        assert_eq!(columns.lock().column_names().len(), 3);
    }

    #[test]
    fn test_get_table_caches_user_tables() {
        let env = MemoryEnv::new();
        let mut catalog = Catalog::open(env).unwrap();

        // register a user table by hand
        let row = Row::from([(schema::TABLE_NAME.to_string(), Value::from("t"))]);
        catalog.tables.insert(&row).unwrap();
        let col = Row::from([
            (schema::TABLE_NAME.to_string(), Value::from("t")),
            (schema::COLUMN_NAME.to_string(), Value::from("a")),
            (schema::DATA_TYPE.to_string(), Value::from("INT")),
        ]);
        catalog.columns.insert(&col).unwrap();

        let first = catalog.get_table("t").unwrap();
        let second = catalog.get_table("t").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.lock().column_names(), ["a"]);

        catalog.evict("t");
        let third = catalog.get_table("t").unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }
}
