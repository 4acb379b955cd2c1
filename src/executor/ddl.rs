//! CREATE, DROP, and SHOW statements.
//!
//! DDL mutates the catalog rows first and touches backing files last, so a
//! failure after the first insert is compensated by deleting the rows that
//! were added.

use super::error::ExecError;
use super::QueryResult;
use crate::catalog::{schema, Catalog};
use crate::sql::ast::{
    ColumnType, CreateIndexStmt, CreateTableStmt, DropIndexStmt, DropTableStmt,
};
use crate::storage::StorageEnv;
use crate::value::{DataType, Row, Value};

pub(super) fn create_table<E: StorageEnv>(
    catalog: &mut Catalog<E>,
    stmt: &CreateTableStmt,
) -> Result<QueryResult, ExecError> {
    let mut column_names = Vec::new();
    let mut column_attributes = Vec::new();
    for column in &stmt.columns {
        let attribute = match column.data_type {
            ColumnType::Int => DataType::Int,
            ColumnType::Text => DataType::Text,
            ColumnType::Double => return Err(ExecError::UnrecognizedDataType),
        };
        column_names.push(column.name.clone());
        column_attributes.push(attribute);
    }

    let table_row = Row::from([(
        schema::TABLE_NAME.to_string(),
        Value::from(stmt.name.as_str()),
    )]);
    if stmt.if_not_exists && !catalog.tables.select_where(&table_row)?.is_empty() {
        return Ok(QueryResult::message(format!("created {}", stmt.name)));
    }
    let t_handle = catalog.tables.insert(&table_row)?;

    match create_table_body(catalog, stmt, &column_names, &column_attributes) {
        Ok(()) => Ok(QueryResult::message(format!("created {}", stmt.name))),
        Err(e) => {
            let _ = catalog.tables.del(t_handle);
            Err(e)
        }
    }
}

/// Inserts the `_columns` rows and creates the backing file, deleting the
/// rows again if anything past the first insert fails.
fn create_table_body<E: StorageEnv>(
    catalog: &mut Catalog<E>,
    stmt: &CreateTableStmt,
    column_names: &[String],
    column_attributes: &[DataType],
) -> Result<(), ExecError> {
    let mut c_handles = Vec::new();
    let result = (|| -> Result<(), ExecError> {
        for (name, attribute) in column_names.iter().zip(column_attributes) {
            let row = Row::from([
                (
                    schema::TABLE_NAME.to_string(),
                    Value::from(stmt.name.as_str()),
                ),
                (schema::COLUMN_NAME.to_string(), Value::from(name.as_str())),
                (
                    schema::DATA_TYPE.to_string(),
                    Value::from(attribute.catalog_name()),
                ),
            ]);
            c_handles.push(catalog.columns.insert(&row)?);
        }

        let table = catalog.get_table(&stmt.name)?;
        let mut table = table.lock();
        if stmt.if_not_exists {
            table.create_if_not_exists()?;
        } else {
            table.create()?;
        }
        Ok(())
    })();

    if let Err(e) = result {
        for handle in c_handles {
            let _ = catalog.columns.del(handle);
        }
        catalog.evict(&stmt.name);
        return Err(e);
    }
    Ok(())
}

pub(super) fn create_index<E: StorageEnv>(
    catalog: &mut Catalog<E>,
    stmt: &CreateIndexStmt,
) -> Result<QueryResult, ExecError> {
    let is_unique = stmt.index_type == "BTREE";
    create_index_entries(
        catalog,
        &stmt.table,
        &stmt.index,
        &stmt.index_type,
        is_unique,
        &stmt.columns,
    )?;
    Ok(QueryResult::message(format!("created index {}", stmt.index)))
}

/// Inserts the `_indices` rows, creates the index body, and feeds it the
/// table's existing rows. Used by CREATE INDEX and by DELETE's index
/// rebuild. Rolls the rows back on any failure.
pub(super) fn create_index_entries<E: StorageEnv>(
    catalog: &mut Catalog<E>,
    table_name: &str,
    index_name: &str,
    index_type: &str,
    is_unique: bool,
    columns: &[String],
) -> Result<(), ExecError> {
    let table = catalog.get_table(table_name)?;
    {
        let table = table.lock();
        for column in columns {
            if !table.column_names().contains(column) {
                return Err(ExecError::ColumnNotInTable {
                    column: column.clone(),
                    table: table_name.to_string(),
                });
            }
        }
    }

    let mut row = Row::from([
        (schema::TABLE_NAME.to_string(), Value::from(table_name)),
        (schema::INDEX_NAME.to_string(), Value::from(index_name)),
        (schema::INDEX_TYPE.to_string(), Value::from(index_type)),
        (schema::IS_UNIQUE.to_string(), Value::Boolean(is_unique)),
    ]);

    let mut i_handles = Vec::new();
    let result = (|| -> Result<(), ExecError> {
        for (seq, column) in columns.iter().enumerate() {
            row.insert(
                schema::SEQ_IN_INDEX.to_string(),
                Value::Int(seq as i32 + 1),
            );
            row.insert(schema::COLUMN_NAME.to_string(), Value::from(column.as_str()));
            i_handles.push(catalog.indices.insert(&row)?);
        }

        let mut index = catalog.indices.get_index(table_name, index_name)?;
        index.create()?;
        for handle in table.lock().select()? {
            index.insert(handle)?;
        }
        index.close()?;
        Ok(())
    })();

    if let Err(e) = result {
        for handle in i_handles {
            let _ = catalog.indices.del(handle);
        }
        return Err(e);
    }
    Ok(())
}

pub(super) fn drop_table<E: StorageEnv>(
    catalog: &mut Catalog<E>,
    stmt: &DropTableStmt,
) -> Result<QueryResult, ExecError> {
    if schema::is_schema_table(&stmt.name) {
        return Err(ExecError::SchemaTable(stmt.name.clone()));
    }
    let table = catalog.get_table(&stmt.name)?;
    let where_clause = Row::from([(
        schema::TABLE_NAME.to_string(),
        Value::from(stmt.name.as_str()),
    )]);

    for index_name in catalog.indices.index_names(&stmt.name)? {
        let mut index = catalog.indices.get_index(&stmt.name, &index_name)?;
        index.destroy()?;
    }
    for handle in catalog.indices.select_where(&where_clause)? {
        catalog.indices.del(handle)?;
    }

    for handle in catalog.columns.select_where(&where_clause)? {
        catalog.columns.del(handle)?;
    }

    table.lock().destroy()?;
    catalog.evict(&stmt.name);

    for handle in catalog.tables.select_where(&where_clause)? {
        catalog.tables.del(handle)?;
    }
    Ok(QueryResult::message(format!("dropped {}", stmt.name)))
}

pub(super) fn drop_index<E: StorageEnv>(
    catalog: &mut Catalog<E>,
    stmt: &DropIndexStmt,
) -> Result<QueryResult, ExecError> {
    drop_index_entries(catalog, &stmt.table, &stmt.index)?;
    Ok(QueryResult::message(format!("dropped index {}", stmt.index)))
}

/// Drops the index body, then deletes its `_indices` rows. Used by DROP
/// INDEX and by DELETE's index rebuild.
pub(super) fn drop_index_entries<E: StorageEnv>(
    catalog: &mut Catalog<E>,
    table_name: &str,
    index_name: &str,
) -> Result<(), ExecError> {
    let mut index = catalog.indices.get_index(table_name, index_name)?;
    index.destroy()?;

    let where_clause = Row::from([
        (schema::TABLE_NAME.to_string(), Value::from(table_name)),
        (schema::INDEX_NAME.to_string(), Value::from(index_name)),
    ]);
    for handle in catalog.indices.select_where(&where_clause)? {
        catalog.indices.del(handle)?;
    }
    Ok(())
}

pub(super) fn show_tables<E: StorageEnv>(
    catalog: &mut Catalog<E>,
) -> Result<QueryResult, ExecError> {
    let column_names = vec![schema::TABLE_NAME.to_string()];
    let column_attributes = vec![DataType::Text];

    let mut rows = Vec::new();
    for handle in catalog.tables.select()? {
        let row = catalog.tables.project_columns(handle, &column_names)?;
        let keep = matches!(
            row.get(schema::TABLE_NAME),
            Some(Value::Text(name)) if !schema::is_schema_table(name)
        );
        if keep {
            rows.push(row);
        }
    }
    let n = rows.len();
    Ok(QueryResult::with_rows(
        column_names,
        column_attributes,
        rows,
        format!("successfully returned {} rows", n),
    ))
}

pub(super) fn show_columns<E: StorageEnv>(
    catalog: &mut Catalog<E>,
    table: &str,
) -> Result<QueryResult, ExecError> {
    let column_names = vec![
        schema::TABLE_NAME.to_string(),
        schema::COLUMN_NAME.to_string(),
        schema::DATA_TYPE.to_string(),
    ];
    let column_attributes = vec![DataType::Text, DataType::Text, DataType::Text];

    let where_clause = Row::from([(schema::TABLE_NAME.to_string(), Value::from(table))]);
    let mut rows = Vec::new();
    for handle in catalog.columns.select_where(&where_clause)? {
        rows.push(catalog.columns.project_columns(handle, &column_names)?);
    }
    let n = rows.len();
    Ok(QueryResult::with_rows(
        column_names,
        column_attributes,
        rows,
        format!("successfully returned {} rows", n),
    ))
}

pub(super) fn show_index<E: StorageEnv>(
    catalog: &mut Catalog<E>,
    table: &str,
) -> Result<QueryResult, ExecError> {
    let (column_names, column_attributes) = schema::indices_schema();

    let where_clause = Row::from([(schema::TABLE_NAME.to_string(), Value::from(table))]);
    let mut rows = Vec::new();
    for handle in catalog.indices.select_where(&where_clause)? {
        rows.push(catalog.indices.project_columns(handle, &column_names)?);
    }
    let n = rows.len();
    Ok(QueryResult::with_rows(
        column_names,
        column_attributes,
        rows,
        format!("successfully returned {} rows", n),
    ))
}
