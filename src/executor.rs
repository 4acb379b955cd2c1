//! SQL statement execution.
//!
//! [`execute`] dispatches a parsed [`Statement`] against the catalog:
//! DDL rewrites catalog rows and creates or removes backing files, DML
//! builds an [`EvalPlan`] and drives the heap tables through it.

mod ddl;
mod dml;
mod error;
mod plan;

pub use error::ExecError;
pub use plan::EvalPlan;

use std::fmt;

use crate::catalog::Catalog;
use crate::sql::ast::{BinaryOperator, Expr, Statement};
use crate::storage::StorageEnv;
use crate::value::{DataType, Row, Value};

/// The outcome of one statement: an optional result table plus a message.
#[derive(Debug)]
pub struct QueryResult {
    /// Result column names, when the statement produces rows.
    pub column_names: Option<Vec<String>>,
    /// Result column types, parallel to `column_names`.
    pub column_attributes: Option<Vec<DataType>>,
    /// Materialized result rows.
    pub rows: Option<Vec<Row>>,
    /// Human-readable status line.
    pub message: String,
}

impl QueryResult {
    /// A row-less result carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            column_names: None,
            column_attributes: None,
            rows: None,
            message: message.into(),
        }
    }

    /// A result with materialized rows.
    pub fn with_rows(
        column_names: Vec<String>,
        column_attributes: Vec<DataType>,
        rows: Vec<Row>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            column_names: Some(column_names),
            column_attributes: Some(column_attributes),
            rows: Some(rows),
            message: message.into(),
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(column_names), Some(rows)) = (&self.column_names, &self.rows) {
            for name in column_names {
                write!(f, "{} ", name)?;
            }
            writeln!(f)?;
            write!(f, "+")?;
            for _ in column_names {
                write!(f, "----------+")?;
            }
            writeln!(f)?;
            for row in rows {
                for name in column_names {
                    match row.get(name) {
                        Some(value) => write!(f, "{} ", value)?,
                        None => write!(f, "??? ")?,
                    }
                }
                writeln!(f)?;
            }
        }
        write!(f, "{}", self.message)
    }
}

/// Executes one statement against the catalog.
pub fn execute<E: StorageEnv>(
    catalog: &mut Catalog<E>,
    statement: &Statement,
) -> Result<QueryResult, ExecError> {
    match statement {
        Statement::CreateTable(stmt) => ddl::create_table(catalog, stmt),
        Statement::CreateIndex(stmt) => ddl::create_index(catalog, stmt),
        Statement::DropTable(stmt) => ddl::drop_table(catalog, stmt),
        Statement::DropIndex(stmt) => ddl::drop_index(catalog, stmt),
        Statement::ShowTables => ddl::show_tables(catalog),
        Statement::ShowColumns { table } => ddl::show_columns(catalog, table),
        Statement::ShowIndex { table } => ddl::show_index(catalog, table),
        Statement::Insert(stmt) => dml::insert(catalog, stmt),
        Statement::Delete(stmt) => dml::delete(catalog, stmt),
        Statement::Select(stmt) => dml::select(catalog, stmt),
    }
}

/// Translates a WHERE clause into an equality predicate.
///
/// Only conjunctions of `column = literal` are supported.
pub(crate) fn parse_where(expr: &Expr) -> Result<Row, ExecError> {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => {
            let mut where_clause = parse_where(left)?;
            where_clause.extend(parse_where(right)?);
            Ok(where_clause)
        }
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        } => {
            let Expr::ColumnRef(column) = left.as_ref() else {
                return Err(ExecError::NotSupportedOperation);
            };
            Ok(Row::from([(column.clone(), literal_value(right)?)]))
        }
        _ => Err(ExecError::NotSupportedOperation),
    }
}

/// Converts a literal expression to a [`Value`].
///
/// Only integer and string literals are supported.
pub(crate) fn literal_value(expr: &Expr) -> Result<Value, ExecError> {
    match expr {
        Expr::Integer(n) => i32::try_from(*n)
            .map(Value::Int)
            .map_err(|_| ExecError::IntegerOutOfRange(*n)),
        Expr::String(s) => Ok(Value::from(s.as_str())),
        _ => Err(ExecError::NotSupportedLiteral),
    }
}
