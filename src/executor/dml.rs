//! INSERT, DELETE, and SELECT statements.

use super::ddl::{create_index_entries, drop_index_entries};
use super::error::ExecError;
use super::plan::EvalPlan;
use super::{literal_value, parse_where, QueryResult};
use crate::catalog::Catalog;
use crate::sql::ast::{DeleteStmt, InsertStmt, SelectList, SelectStmt};
use crate::storage::StorageEnv;
use crate::value::{DataType, Row};

pub(super) fn insert<E: StorageEnv>(
    catalog: &mut Catalog<E>,
    stmt: &InsertStmt,
) -> Result<QueryResult, ExecError> {
    let table = catalog.get_table(&stmt.table)?;

    let column_names: Vec<String> = match &stmt.columns {
        Some(columns) => {
            if columns.len() != stmt.values.len() {
                return Err(ExecError::ValueCountMismatch {
                    columns: columns.len(),
                    values: stmt.values.len(),
                });
            }
            columns.clone()
        }
        None => {
            // unnamed columns bind to the schema order
            let names = table.lock().column_names().to_vec();
            if stmt.values.len() > names.len() {
                return Err(ExecError::TooManyValues {
                    table: stmt.table.clone(),
                });
            }
            names[..stmt.values.len()].to_vec()
        }
    };

    let mut row = Row::new();
    for (column, expr) in column_names.iter().zip(&stmt.values) {
        row.insert(column.clone(), literal_value(expr)?);
    }

    let handle = table.lock().insert(&row)?;

    let index_names = catalog.indices.index_names(&stmt.table)?;
    let result = (|| -> Result<(), ExecError> {
        for index_name in &index_names {
            let mut index = catalog.indices.get_index(&stmt.table, index_name)?;
            index.insert(handle)?;
            index.close()?;
        }
        Ok(())
    })();
    if let Err(e) = result {
        let _ = table.lock().del(handle);
        return Err(e);
    }

    let mut message = format!("successfully inserted 1 row into {}", stmt.table);
    if !index_names.is_empty() {
        message.push_str(&format!(" and {} indices", index_names.len()));
    }
    Ok(QueryResult::message(message))
}

pub(super) fn delete<E: StorageEnv>(
    catalog: &mut Catalog<E>,
    stmt: &DeleteStmt,
) -> Result<QueryResult, ExecError> {
    let table = catalog.get_table(&stmt.table)?;

    let mut plan = EvalPlan::table_scan(table.clone());
    if let Some(expr) = &stmt.where_clause {
        plan = EvalPlan::Select {
            predicate: parse_where(expr)?,
            child: Box::new(plan),
        };
    }
    let plan = plan.optimize();
    let (_, handles) = plan.pipeline()?;

    // Per-row index maintenance is not implemented; each index is dropped,
    // the rows deleted, and the index rebuilt from what remains.
    let index_names = catalog.indices.index_names(&stmt.table)?;
    let mut definitions = Vec::new();
    for index_name in &index_names {
        definitions.push((
            index_name.clone(),
            catalog.indices.index_definition(&stmt.table, index_name)?,
        ));
        drop_index_entries(catalog, &stmt.table, index_name)?;
    }

    let n = handles.len();
    {
        let mut table = table.lock();
        for handle in handles {
            table.del(handle)?;
        }
    }

    for (index_name, def) in definitions {
        create_index_entries(
            catalog,
            &stmt.table,
            &index_name,
            &def.index_type,
            def.is_unique,
            &def.columns,
        )?;
    }

    let mut message = format!("successfully deleted {} rows from {}", n, stmt.table);
    if !index_names.is_empty() {
        message.push_str(&format!(" and {} indices", index_names.len()));
    }
    Ok(QueryResult::message(message))
}

pub(super) fn select<E: StorageEnv>(
    catalog: &mut Catalog<E>,
    stmt: &SelectStmt,
) -> Result<QueryResult, ExecError> {
    let table = catalog.get_table(&stmt.table)?;

    let mut plan = EvalPlan::table_scan(table.clone());
    if let Some(expr) = &stmt.where_clause {
        plan = EvalPlan::Select {
            predicate: parse_where(expr)?,
            child: Box::new(plan),
        };
    }

    let projection: Vec<String> = match &stmt.columns {
        SelectList::Star => table.lock().column_names().to_vec(),
        SelectList::Columns(columns) => columns.clone(),
    };
    plan = match &stmt.columns {
        SelectList::Star => EvalPlan::ProjectAll {
            child: Box::new(plan),
        },
        SelectList::Columns(columns) => EvalPlan::Project {
            columns: columns.clone(),
            child: Box::new(plan),
        },
    };

    let plan = plan.optimize();
    let rows = plan.evaluate()?;

    let column_attributes: Vec<DataType> = {
        let table = table.lock();
        projection
            .iter()
            .map(|column| {
                table
                    .attribute_of(column)
                    .ok_or_else(|| ExecError::ColumnNotInTable {
                        column: column.clone(),
                        table: stmt.table.clone(),
                    })
            })
            .collect::<Result<_, _>>()?
    };

    let n = rows.len();
    Ok(QueryResult::with_rows(
        projection,
        column_attributes,
        rows,
        format!("successfully returned {} rows", n),
    ))
}
