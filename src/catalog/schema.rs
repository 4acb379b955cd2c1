//! Hard-coded schema-table definitions.
//!
//! The three schema tables are the only relations whose columns are not
//! read from the catalog — they are the catalog.

use crate::value::DataType;

/// Name of the table-of-tables relation.
pub const TABLES_TABLE: &str = "_tables";
/// Name of the table-of-columns relation.
pub const COLUMNS_TABLE: &str = "_columns";
/// Name of the table-of-indices relation.
pub const INDICES_TABLE: &str = "_indices";

/// `table_name` column.
pub const TABLE_NAME: &str = "table_name";
/// `column_name` column.
pub const COLUMN_NAME: &str = "column_name";
/// `data_type` column.
pub const DATA_TYPE: &str = "data_type";
/// `index_name` column.
pub const INDEX_NAME: &str = "index_name";
/// `seq_in_index` column.
pub const SEQ_IN_INDEX: &str = "seq_in_index";
/// `index_type` column.
pub const INDEX_TYPE: &str = "index_type";
/// `is_unique` column.
pub const IS_UNIQUE: &str = "is_unique";

/// Whether `name` is one of the protected schema tables.
pub fn is_schema_table(name: &str) -> bool {
    matches!(name, TABLES_TABLE | COLUMNS_TABLE | INDICES_TABLE)
}

/// Schema of `_tables`: one row per table.
pub fn tables_schema() -> (Vec<String>, Vec<DataType>) {
    (vec![TABLE_NAME.to_string()], vec![DataType::Text])
}

/// Schema of `_columns`: one row per column, in declaration order.
pub fn columns_schema() -> (Vec<String>, Vec<DataType>) {
    (
        vec![
            TABLE_NAME.to_string(),
            COLUMN_NAME.to_string(),
            DATA_TYPE.to_string(),
        ],
        vec![DataType::Text, DataType::Text, DataType::Text],
    )
}

/// Schema of `_indices`: one row per (index, column) pair.
pub fn indices_schema() -> (Vec<String>, Vec<DataType>) {
    (
        vec![
            TABLE_NAME.to_string(),
            INDEX_NAME.to_string(),
            COLUMN_NAME.to_string(),
            SEQ_IN_INDEX.to_string(),
            INDEX_TYPE.to_string(),
            IS_UNIQUE.to_string(),
        ],
        vec![
            DataType::Text,
            DataType::Text,
            DataType::Text,
            DataType::Int,
            DataType::Text,
            DataType::Boolean,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_table_names() {
        assert!(is_schema_table("_tables"));
        assert!(is_schema_table("_columns"));
        assert!(is_schema_table("_indices"));
        assert!(!is_schema_table("t"));
        assert!(!is_schema_table("_tablesx"));
    }

    #[test]
    fn test_schemas_are_parallel() {
        for (names, attributes) in [tables_schema(), columns_schema(), indices_schema()] {
            assert_eq!(names.len(), attributes.len());
        }
    }
}
