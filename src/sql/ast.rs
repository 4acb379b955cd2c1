//! Abstract syntax tree for the supported SQL statements.

/// A SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE.
    CreateTable(CreateTableStmt),
    /// CREATE INDEX.
    CreateIndex(CreateIndexStmt),
    /// DROP TABLE.
    DropTable(DropTableStmt),
    /// DROP INDEX.
    DropIndex(DropIndexStmt),
    /// SHOW TABLES.
    ShowTables,
    /// SHOW COLUMNS FROM table.
    ShowColumns {
        /// Table whose columns to list.
        table: String,
    },
    /// SHOW INDEX FROM table.
    ShowIndex {
        /// Table whose indices to list.
        table: String,
    },
    /// INSERT.
    Insert(InsertStmt),
    /// DELETE.
    Delete(DeleteStmt),
    /// SELECT.
    Select(SelectStmt),
}

/// CREATE TABLE name (columns).
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStmt {
    /// Table name.
    pub name: String,
    /// Column definitions in declaration order.
    pub columns: Vec<ColumnDef>,
    /// IF NOT EXISTS was given.
    pub if_not_exists: bool,
}

/// One column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Declared type tag.
    pub data_type: ColumnType,
}

/// Type tag in a column definition.
///
/// DOUBLE parses but is rejected by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// INT / INTEGER.
    Int,
    /// TEXT.
    Text,
    /// DOUBLE.
    Double,
}

/// CREATE INDEX index ON table [USING type] (columns).
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStmt {
    /// Index name.
    pub index: String,
    /// Table the index is on.
    pub table: String,
    /// Index type tag, uppercased (`BTREE` when not given).
    pub index_type: String,
    /// Indexed columns in order.
    pub columns: Vec<String>,
}

/// DROP TABLE name.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStmt {
    /// Table name.
    pub name: String,
}

/// DROP INDEX table.index.
#[derive(Debug, Clone, PartialEq)]
pub struct DropIndexStmt {
    /// Table the index is on.
    pub table: String,
    /// Index name.
    pub index: String,
}

/// INSERT INTO table [(columns)] VALUES (literals).
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    /// Target table.
    pub table: String,
    /// Explicit column list, if given.
    pub columns: Option<Vec<String>>,
    /// One value expression per column.
    pub values: Vec<Expr>,
}

/// DELETE FROM table [WHERE condition].
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt {
    /// Target table.
    pub table: String,
    /// Optional WHERE clause.
    pub where_clause: Option<Expr>,
}

/// SELECT list FROM table [WHERE condition].
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    /// Projection list.
    pub columns: SelectList,
    /// Source table.
    pub table: String,
    /// Optional WHERE clause.
    pub where_clause: Option<Expr>,
}

/// The projection of a SELECT.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectList {
    /// `SELECT *`.
    Star,
    /// Named columns.
    Columns(Vec<String>),
}

/// An expression in a VALUES list or WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal.
    Integer(i64),
    /// Float literal (parses; rejected by the executor).
    Float(f64),
    /// String literal.
    String(String),
    /// Column reference.
    ColumnRef(String),
    /// Binary operation.
    BinaryOp {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOperator,
        /// Right operand.
        right: Box<Expr>,
    },
}

/// Binary operators in WHERE clauses.
///
/// Everything except `Eq` and `And` parses but is rejected by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `=`
    Eq,
    /// `<>` or `!=`
    Neq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `AND`
    And,
}
