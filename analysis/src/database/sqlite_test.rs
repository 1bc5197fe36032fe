use super::{
    sqlite::{instance_capacity, ResultTable},
    ConnectionError, Satisfiability,
};
use crate::{
    config::ColumnLayout,
    dataset::BenchmarkDataset,
    test_util::{database, key, COLUMNS, F, T},
};
use rusqlite::{params, Connection};

#[test]
pub fn detects_first_user_table() {
    let connection = database(&[]);
    let table = ResultTable::detect(&connection).unwrap();

    assert_eq!(table.name(), "results");
    assert_eq!(table.columns(), COLUMNS.map(str::to_owned).as_slice());
}

#[test]
pub fn missing_table_is_schema_not_found() {
    let connection = Connection::open_in_memory().unwrap();

    assert!(matches!(
        ResultTable::detect(&connection),
        Err(ConnectionError::SchemaNotFound)
    ));
}

#[test]
pub fn short_table_fails_fast() {
    let connection = Connection::open_in_memory().unwrap();
    connection
        .execute("create table runs (instance_id integer, a integer, b integer)", [])
        .unwrap();

    match BenchmarkDataset::from_connection(&connection, &ColumnLayout::compact()) {
        Err(ConnectionError::SchemaMismatch { columns, required }) => {
            assert_eq!(columns, 3);
            assert_eq!(required, 18);
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
pub fn rows_map_into_instances() {
    let connection = database(&[
        (0, [T, F, F, F, F], 0.5, 1.0),
        (0, [F, F, F, F, F], 0.75, 2.0),
        (1, [T, T, F, F, F], 1.5, 3.0),
    ]);
    let dataset = BenchmarkDataset::from_connection(&connection, &ColumnLayout::compact()).unwrap();
    let instances = dataset.instances();

    assert_eq!(dataset.table(), "results");
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].results.len(), 2);
    assert_eq!(instances[1].results.len(), 1);

    let results = &instances[0].results[&key(&[T, F, F, F, F])];
    assert_eq!(results["z3"].generation, 1.0);
    assert_eq!(results["z3"].solve, 2.0);
    assert_eq!(results["z3"].other, 64.0);
    assert_eq!(results["cvc5"].primary(), 0.5);

    let problem = instances[1].problem.as_ref().unwrap();
    assert_eq!(problem.grid, vec!["3x3", "0, 1, 2", "7", "x = 7"]);
    assert_eq!(problem.index, None);
    assert_eq!(problem.satisfiability, Satisfiability::Satisfiable);
}

#[test]
pub fn detailed_layout_splits_index() {
    let connection = database(&[(0, [F, F, F, F, F], 0.5, 1.0)]);
    let dataset =
        BenchmarkDataset::from_connection(&connection, &ColumnLayout::detailed()).unwrap();
    let problem = dataset.instances()[0].problem.as_ref().unwrap();

    assert_eq!(problem.grid, vec!["3x3"]);
    assert_eq!(
        problem.index,
        Some(vec!["0".to_owned(), "1".to_owned(), "2".to_owned()])
    );
    assert_eq!(problem.debug, vec!["7", "x = 7"]);
}

#[test]
pub fn duplicate_keys_keep_later_row() {
    let connection = database(&[
        (0, [T, F, F, F, F], 0.5, 1.0),
        (0, [T, F, F, F, F], 0.5, 4.0),
    ]);
    let dataset = BenchmarkDataset::from_connection(&connection, &ColumnLayout::compact()).unwrap();
    let results = &dataset.instances()[0].results;

    assert_eq!(results.len(), 1);
    assert_eq!(results[&key(&[T, F, F, F, F])]["z3"].primary(), 4.0);
}

#[test]
pub fn gaps_yield_empty_instances() {
    let connection = database(&[
        (0, [T, F, F, F, F], 0.5, 1.0),
        (2, [T, F, F, F, F], 0.5, 1.0),
    ]);
    let dataset = BenchmarkDataset::from_connection(&connection, &ColumnLayout::compact()).unwrap();
    let instances = dataset.instances();

    assert_eq!(instances.len(), 3);
    assert_eq!(instances[1].id, 1);
    assert!(instances[1].results.is_empty());
    assert!(instances[1].problem.is_none());
}

#[test]
pub fn highest_instance_id_does_not_overflow() {
    let connection = database(&[(i64::MAX, [T, F, F, F, F], 0.5, 1.0)]);
    let table = ResultTable::detect(&connection).unwrap();

    assert_eq!(table.max_instance(&ColumnLayout::compact()).unwrap(), Some(i64::MAX));
    assert_eq!(instance_capacity(2), 3);
    assert_eq!(instance_capacity(-1), 0);
    if usize::BITS == 64 {
        assert_eq!(instance_capacity(i64::MAX), i64::MAX as usize + 1);
    }
}

#[test]
pub fn keyword_columns_are_read() {
    // `distinct` is an SQL keyword and must survive table creation and loading
    let connection = database(&[(0, [F, T, F, F, F], 0.5, 1.0)]);
    let dataset = BenchmarkDataset::from_connection(&connection, &ColumnLayout::compact()).unwrap();

    assert_eq!(dataset.list_columns()[&8], "distinct");
    assert!(dataset.instances()[0].results.contains_key(&key(&[F, T, F, F, F])));
}

#[test]
pub fn empty_table_yields_empty_dataset() {
    let connection = database(&[]);
    let dataset = BenchmarkDataset::from_connection(&connection, &ColumnLayout::compact()).unwrap();

    assert!(dataset.instances().is_empty());
}

#[test]
pub fn null_measurement_is_malformed() {
    let connection = database(&[(0, [T, F, F, F, F], 0.5, 1.0)]);
    connection
        .execute("update results set z3_time = null", params![])
        .unwrap();

    match BenchmarkDataset::from_connection(&connection, &ColumnLayout::compact()) {
        Err(ConnectionError::MalformedRow {
            instance, column, ..
        }) => {
            assert_eq!(instance, 0);
            assert_eq!(column, 15);
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
pub fn load_reads_file_and_releases_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("argyle_time.db");
    {
        let connection = Connection::open(&path).unwrap();
        crate::test_util::create_results(&connection);
        crate::test_util::insert(&connection, 0, [T, F, F, F, F], 0.5, 1.0);
        crate::test_util::insert(&connection, 0, [F, F, F, F, F], 0.5, 2.0);
    }

    let dataset = BenchmarkDataset::load(&path, &ColumnLayout::compact()).unwrap();
    assert_eq!(dataset.instances().len(), 1);
    assert_eq!(dataset.list_columns().len(), COLUMNS.len());
}

#[test]
pub fn load_of_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = BenchmarkDataset::load(&dir.path().join("missing.db"), &ColumnLayout::compact());

    assert!(matches!(result, Err(ConnectionError::SQLite(_))));
}
