//! End-to-end SQL scenarios over a real database directory.

use heapdb::db::Database;
use heapdb::executor::QueryResult;
use heapdb::storage::{FileEnv, BLOCK_SZ};
use heapdb::value::{Row, Value};
use tempfile::tempdir;

fn run(db: &mut Database<FileEnv>, sql: &str) -> QueryResult {
    db.run(sql)
        .unwrap_or_else(|e| panic!("'{}' failed: {}", sql, e))
        .pop()
        .expect("no result")
}

fn rows(result: QueryResult) -> Vec<Row> {
    result.rows.expect("statement produced no rows")
}

#[test]
fn test_create_insert_select_roundtrip() {
    let dir = tempdir().unwrap();
    let mut db = Database::open(dir.path()).unwrap();

    run(&mut db, "create table t (a int, b text)");
    run(&mut db, "insert into t values (12, 'Hello!')");

    let rows = rows(run(&mut db, "select * from t"));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("a"), Some(&Value::Int(12)));
    assert_eq!(rows[0].get("b"), Some(&Value::from("Hello!")));
}

#[test]
fn test_thousand_row_insert_allocates_blocks() {
    let dir = tempdir().unwrap();
    let mut db = Database::open(dir.path()).unwrap();

    run(&mut db, "create table t (a int, b text)");
    let payload = "x".repeat(100);
    for i in 0..1000 {
        run(
            &mut db,
            &format!("insert into t values ({}, '{}')", i, payload),
        );
    }

    let rows = rows(run(&mut db, "select * from t"));
    assert_eq!(rows.len(), 1000);
    db.close().unwrap();

    let file_len = std::fs::metadata(dir.path().join("t")).unwrap().len();
    let min_blocks = (1000 * (4 + 2 + 100) / BLOCK_SZ) as u64;
    assert!(file_len >= min_blocks * BLOCK_SZ as u64);
}

#[test]
fn test_delete_where_preserves_insertion_order() {
    let dir = tempdir().unwrap();
    let mut db = Database::open(dir.path()).unwrap();

    run(&mut db, "create table u (a int)");
    run(&mut db, "insert into u values (1)");
    run(&mut db, "insert into u values (2)");
    run(&mut db, "insert into u values (3)");
    run(&mut db, "delete from u where a = 2");

    let rows = rows(run(&mut db, "select * from u"));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("a"), Some(&Value::Int(1)));
    assert_eq!(rows[1].get("a"), Some(&Value::Int(3)));
}

#[test]
fn test_drop_table_drops_index_and_catalog_rows() {
    let dir = tempdir().unwrap();
    let mut db = Database::open(dir.path()).unwrap();

    run(&mut db, "create table t (a int, b text)");
    run(&mut db, "create index idx on t (a)");
    assert!(dir.path().join("t.idx").exists());

    run(&mut db, "drop table t");
    assert!(!dir.path().join("t").exists());
    assert!(!dir.path().join("t.idx").exists());
    assert!(rows(run(&mut db, "show index from t")).is_empty());
}

#[test]
fn test_show_tables_suppresses_schema_tables() {
    let dir = tempdir().unwrap();
    let mut db = Database::open(dir.path()).unwrap();

    run(&mut db, "create table t (a int)");
    let rows = rows(run(&mut db, "show tables"));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("table_name"), Some(&Value::from("t")));
}

#[test]
fn test_rows_survive_database_reopen() {
    let dir = tempdir().unwrap();
    {
        let mut db = Database::open(dir.path()).unwrap();
        run(&mut db, "create table t (a int, b text)");
        run(&mut db, "insert into t values (42, 'still here')");
        db.close().unwrap();
    }

    let mut db = Database::open(dir.path()).unwrap();
    let rows = rows(run(&mut db, "select * from t"));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("a"), Some(&Value::Int(42)));
    assert_eq!(rows[0].get("b"), Some(&Value::from("still here")));
}

#[test]
fn test_catalog_survives_reopen_with_indices() {
    let dir = tempdir().unwrap();
    {
        let mut db = Database::open(dir.path()).unwrap();
        run(&mut db, "create table t (a int, b text)");
        run(&mut db, "create index idx on t using hash (a, b)");
        db.close().unwrap();
    }

    let mut db = Database::open(dir.path()).unwrap();
    let index_rows = rows(run(&mut db, "show index from t"));
    assert_eq!(index_rows.len(), 2);
    assert_eq!(index_rows[0].get("index_type"), Some(&Value::from("HASH")));
    assert_eq!(
        index_rows[0].get("is_unique"),
        Some(&Value::Boolean(false))
    );

    let column_rows = rows(run(&mut db, "show columns from t"));
    assert_eq!(column_rows.len(), 2);

    // the reopened catalog resolves the table for DML
    run(&mut db, "insert into t values (1, 'after reopen')");
    assert_eq!(rows(run(&mut db, "select * from t")).len(), 1);
}
