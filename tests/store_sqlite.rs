use std::path::PathBuf;

use league_dash::config::DataSource;
use league_dash::demo;
use league_dash::store::{QueryExecutor, Statement, StoreError, Value};

fn temp_db(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "league_dash_store_{name}_{}.sqlite",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

#[test]
fn teams_come_back_in_schema_column_order() {
    let path = temp_db("teams");
    demo::seed(&path).expect("seed");
    let executor = QueryExecutor::new(DataSource::Sqlite(path.clone()));

    let result = executor.execute_query(Statement::AllTeams).expect("query");
    assert_eq!(result.len(), 6);
    assert_eq!(result.columns[0], "TeamID");
    assert_eq!(result.columns[3], "Rank");
    assert_eq!(result.columns.len(), 15);
    assert_eq!(result.rows[0][1], Value::Text("Arsenal".to_string()));
    assert_eq!(result.rows[0][12], Value::Float(6.9));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn unplayed_scores_are_null() {
    let path = temp_db("matches");
    demo::seed(&path).expect("seed");
    let executor = QueryExecutor::new(DataSource::Sqlite(path.clone()));

    let result = executor.execute_query(Statement::AllMatches).expect("query");
    let unplayed: Vec<_> = result
        .rows
        .iter()
        .filter(|row| row[6].as_bool() == Some(false))
        .collect();
    assert!(!unplayed.is_empty());
    assert!(unplayed.iter().all(|row| row[4].is_null() && row[5].is_null()));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn base_tables_lists_both_tables() {
    let path = temp_db("tables");
    demo::seed(&path).expect("seed");
    let executor = QueryExecutor::new(DataSource::Sqlite(path.clone()));

    let result = executor
        .execute_query(Statement::BaseTableNames)
        .expect("query");
    let mut names: Vec<String> = result
        .rows
        .iter()
        .filter_map(|row| row[0].as_str().map(str::to_string))
        .collect();
    names.sort();
    assert_eq!(names, vec!["matches".to_string(), "teams".to_string()]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_file_is_a_connection_error() {
    let path = temp_db("missing");
    let executor = QueryExecutor::new(DataSource::Sqlite(path));
    let err = executor.execute_query(Statement::AllTeams).unwrap_err();
    assert!(matches!(err, StoreError::Connection { .. }), "{err}");
}

#[test]
fn missing_table_is_a_query_error() {
    let path = temp_db("empty");
    let conn = rusqlite::Connection::open(&path).expect("create db");
    conn.execute_batch("CREATE TABLE other (id INTEGER);")
        .expect("create table");
    drop(conn);

    let executor = QueryExecutor::new(DataSource::Sqlite(path.clone()));
    let err = executor.execute_query(Statement::AllMatches).unwrap_err();
    match err {
        StoreError::Query { statement, .. } => assert_eq!(statement, "select-all-matches"),
        other => panic!("unexpected error: {other}"),
    }

    let _ = std::fs::remove_file(&path);
}

#[test]
fn each_query_leaves_the_file_reusable() {
    let path = temp_db("reuse");
    demo::seed(&path).expect("seed");
    let executor = QueryExecutor::new(DataSource::Sqlite(path.clone()));
    for _ in 0..3 {
        executor.execute_query(Statement::AllTeams).expect("query");
    }
    demo::seed(&path).expect("reseed after reads");

    let _ = std::fs::remove_file(&path);
}
