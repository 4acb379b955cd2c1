//! Evaluation plans over heap tables.
//!
//! A plan is a small tree with a table scan at the leaf. [`EvalPlan::optimize`]
//! fuses a `Select` sitting directly above a `TableScan` into the scan's
//! residual predicate, turning it into a filtered scan. A plan whose spine
//! reduces to `TableScan`[+`Select`] supports [`pipeline`](EvalPlan::pipeline)
//! (a handle stream for mutators); a `Project`/`ProjectAll` root supports
//! [`evaluate`](EvalPlan::evaluate) (materialized rows).

use super::error::ExecError;
use crate::catalog::SharedTable;
use crate::heap::Handle;
use crate::storage::StorageEnv;
use crate::value::Row;

/// A plan node.
pub enum EvalPlan<E: StorageEnv> {
    /// Full scan of a table, optionally filtered by a residual predicate.
    TableScan {
        /// Table to scan.
        table: SharedTable<E>,
        /// Equality predicate pushed into the scan by `optimize`.
        residual: Option<Row>,
    },
    /// Filter the child's handles by an equality predicate.
    Select {
        /// Column-to-value equalities, all of which must hold.
        predicate: Row,
        /// Child plan.
        child: Box<EvalPlan<E>>,
    },
    /// Project the child's rows onto named columns.
    Project {
        /// Columns to keep.
        columns: Vec<String>,
        /// Child plan.
        child: Box<EvalPlan<E>>,
    },
    /// Project the child's rows onto all columns.
    ProjectAll {
        /// Child plan.
        child: Box<EvalPlan<E>>,
    },
}

impl<E: StorageEnv> EvalPlan<E> {
    /// A bare table scan.
    pub fn table_scan(table: SharedTable<E>) -> Self {
        EvalPlan::TableScan {
            table,
            residual: None,
        }
    }

    /// Pushes a `Select` directly above a `TableScan` into the scan.
    /// Other shapes pass through with their children optimized.
    pub fn optimize(self) -> Self {
        match self {
            EvalPlan::Select { predicate, child } => match *child {
                EvalPlan::TableScan {
                    table,
                    residual: None,
                } => EvalPlan::TableScan {
                    table,
                    residual: Some(predicate),
                },
                other => EvalPlan::Select {
                    predicate,
                    child: Box::new(other.optimize()),
                },
            },
            EvalPlan::Project { columns, child } => EvalPlan::Project {
                columns,
                child: Box::new(child.optimize()),
            },
            EvalPlan::ProjectAll { child } => EvalPlan::ProjectAll {
                child: Box::new(child.optimize()),
            },
            scan => scan,
        }
    }

    /// Runs the plan as a handle pipeline for a mutator.
    ///
    /// Handles come back in natural scan order: ascending block id, then
    /// ascending record id.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::InvalidPlan` unless the plan reduces to
    /// `TableScan`[+`Select`].
    pub fn pipeline(&self) -> Result<(SharedTable<E>, Vec<Handle>), ExecError> {
        match self {
            EvalPlan::TableScan { table, residual } => {
                let handles = table.lock().select_where(residual.as_ref())?;
                Ok((table.clone(), handles))
            }
            EvalPlan::Select { predicate, child } => {
                let (table, handles) = child.pipeline()?;
                let columns: Vec<String> = predicate.keys().cloned().collect();
                let mut selected = Vec::new();
                {
                    let mut table = table.lock();
                    for handle in handles {
                        if &table.project_columns(handle, &columns)? == predicate {
                            selected.push(handle);
                        }
                    }
                }
                Ok((table, selected))
            }
            _ => Err(ExecError::InvalidPlan(
                "plan does not reduce to a table scan",
            )),
        }
    }

    /// Runs the whole plan to materialized rows.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::InvalidPlan` unless the root is a projection.
    pub fn evaluate(&self) -> Result<Vec<Row>, ExecError> {
        let (columns, child) = match self {
            EvalPlan::Project { columns, child } => (columns.as_slice(), child),
            EvalPlan::ProjectAll { child } => (&[] as &[String], child),
            _ => return Err(ExecError::InvalidPlan("plan root must be a projection")),
        };
        let (table, handles) = child.pipeline()?;
        let mut table = table.lock();
        let mut rows = Vec::with_capacity(handles.len());
        for handle in handles {
            rows.push(table.project_columns(handle, columns)?);
        }
        Ok(rows)
    }
}
