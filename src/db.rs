//! Database context.
//!
//! A [`Database`] ties a storage environment to an open catalog and runs SQL
//! against it. There is no implicit global state; the shell owns one
//! `Database` and must [`close`](Database::close) it before exit so the
//! backing store is flushed.

use std::fmt;
use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::executor::{self, ExecError, QueryResult};
use crate::heap::RelationError;
use crate::sql::ast::Statement;
use crate::sql::{self, SyntaxError};
use crate::storage::{FileEnv, StorageEnv, StoreError};

/// Errors surfaced by [`Database::run`].
#[derive(Debug)]
pub enum DatabaseError {
    /// SQL syntax error.
    Parse(SyntaxError),
    /// Statement execution error.
    Exec(ExecError),
    /// Failure opening or closing the catalog.
    Relation(RelationError),
    /// Failure opening the storage environment.
    Store(StoreError),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::Parse(e) => write!(f, "syntax error: {}", e),
            DatabaseError::Exec(e) => write!(f, "{}", e),
            DatabaseError::Relation(e) => write!(f, "{}", e),
            DatabaseError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatabaseError::Parse(e) => Some(e),
            DatabaseError::Exec(e) => Some(e),
            DatabaseError::Relation(e) => Some(e),
            DatabaseError::Store(e) => Some(e),
        }
    }
}

impl From<SyntaxError> for DatabaseError {
    fn from(e: SyntaxError) -> Self {
        DatabaseError::Parse(e)
    }
}

impl From<ExecError> for DatabaseError {
    fn from(e: ExecError) -> Self {
        DatabaseError::Exec(e)
    }
}

impl From<RelationError> for DatabaseError {
    fn from(e: RelationError) -> Self {
        DatabaseError::Relation(e)
    }
}

impl From<StoreError> for DatabaseError {
    fn from(e: StoreError) -> Self {
        DatabaseError::Store(e)
    }
}

/// An open database: a storage environment plus its catalog.
pub struct Database<E: StorageEnv> {
    catalog: Catalog<E>,
}

impl Database<FileEnv> {
    /// Opens the database in `dir`, creating the directory and bootstrapping
    /// the catalog as needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let env = FileEnv::new(dir)?;
        Self::with_env(env)
    }
}

impl<E: StorageEnv> Database<E> {
    /// Opens a database over an existing environment.
    pub fn with_env(env: E) -> Result<Self, DatabaseError> {
        Ok(Self {
            catalog: Catalog::open(env)?,
        })
    }

    /// Parses and executes every statement in `sql`, in order.
    ///
    /// Execution stops at the first failing statement; earlier statements
    /// stay applied (there are no transactions).
    pub fn run(&mut self, sql: &str) -> Result<Vec<QueryResult>, DatabaseError> {
        let statements = sql::parse(sql)?;
        let mut results = Vec::with_capacity(statements.len());
        for statement in &statements {
            results.push(self.execute(statement)?);
        }
        Ok(results)
    }

    /// Executes one parsed statement.
    pub fn execute(&mut self, statement: &Statement) -> Result<QueryResult, DatabaseError> {
        Ok(executor::execute(&mut self.catalog, statement)?)
    }

    /// Closes every open relation, flushing the backing store.
    pub fn close(&mut self) -> Result<(), DatabaseError> {
        self.catalog.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryEnv;
    use crate::value::Value;

    #[test]
    fn test_run_multiple_statements() {
        let mut db = Database::with_env(MemoryEnv::new()).unwrap();
        let results = db
            .run("create table t (a int); insert into t values (1); select * from t")
            .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[2].rows.as_ref().unwrap()[0].get("a"),
            Some(&Value::Int(1))
        );
    }

    #[test]
    fn test_parse_error_reported_with_position() {
        let mut db = Database::with_env(MemoryEnv::new()).unwrap();
        let source = "select *\nfrom";
        let Err(DatabaseError::Parse(e)) = db.run(source) else {
            panic!("expected a parse error");
        };
        assert_eq!(e.line_column(source).0, 2);
    }

    #[test]
    fn test_exec_error_stops_run() {
        let mut db = Database::with_env(MemoryEnv::new()).unwrap();
        let result = db.run("create table t (a int); select * from missing; insert into t values (1)");
        assert!(matches!(result, Err(DatabaseError::Exec(_))));
        // the first statement was applied
        let rows = db.run("select * from t").unwrap();
        assert!(rows[0].rows.as_ref().unwrap().is_empty());
    }
}
