use rusqlite::Connection;
use student_core::db::migrations::{current_version, latest_version};
use student_core::{DbError, RecordStore, RepoError, SqliteStudentRepository, StudentRepository};
use std::panic::{catch_unwind, AssertUnwindSafe};

fn row_count(store: &RecordStore) -> i64 {
    store
        .with_read_session(|conn| {
            conn.query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))
        })
        .unwrap()
}

#[test]
fn with_transaction_commits_on_success() {
    let store = RecordStore::open_in_memory().unwrap();

    let inserted = store
        .with_transaction(|tx| -> Result<usize, DbError> {
            Ok(tx.execute(
                "INSERT INTO students (name, age) VALUES ('a', 1), ('b', 2);",
                [],
            )?)
        })
        .unwrap();

    assert_eq!(inserted, 2);
    assert_eq!(row_count(&store), 2);
}

#[test]
fn with_transaction_rolls_back_when_work_fails() {
    let store = RecordStore::open_in_memory().unwrap();

    let err = store
        .with_transaction(|tx| -> Result<(), RepoError> {
            tx.execute("INSERT INTO students (name, age) VALUES ('a', 1);", [])?;
            Err(RepoError::InvalidArgument("abort after insert".to_string()))
        })
        .unwrap_err();

    assert!(matches!(err, RepoError::InvalidArgument(message) if message == "abort after insert"));
    assert_eq!(row_count(&store), 0);
}

#[test]
fn with_transaction_rolls_back_on_backend_failure() {
    let store = RecordStore::open_in_memory().unwrap();

    let err = store
        .with_transaction(|tx| -> Result<(), RepoError> {
            tx.execute("INSERT INTO students (name, age) VALUES ('ok', 1);", [])?;
            tx.execute("INSERT INTO students (name, age) VALUES (NULL, 2);", [])?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, RepoError::Persistence(DbError::Sqlite(_))));
    assert_eq!(row_count(&store), 0);
}

#[test]
fn store_recovers_after_panic_inside_transaction() {
    let store = RecordStore::open_in_memory().unwrap();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _: Result<(), DbError> = store.with_transaction(|tx| {
            tx.execute("INSERT INTO students (name, age) VALUES ('p', 1);", [])?;
            panic!("work panicked mid-transaction");
        });
    }));
    assert!(outcome.is_err());

    assert_eq!(row_count(&store), 0);
    let repo = SqliteStudentRepository::new(&store);
    assert!(repo.get_all().unwrap().is_empty());
    assert!(!repo.delete(1).unwrap());
}

#[test]
fn read_session_propagates_work_errors() {
    let store = RecordStore::open_in_memory().unwrap();

    let err = store
        .with_read_session(|conn| conn.query_row("SELECT * FROM missing_table;", [], |_| Ok(())))
        .unwrap_err();
    assert!(err.to_string().contains("missing_table"));
}

#[test]
fn from_connection_migrates_raw_connection() {
    let conn = Connection::open_in_memory().unwrap();
    assert_eq!(current_version(&conn).unwrap(), 0);

    let store = RecordStore::from_connection(conn).unwrap();
    let version = store.with_read_session(current_version).unwrap();
    assert_eq!(version, latest_version());
    assert_eq!(row_count(&store), 0);
}

#[test]
fn from_connection_rejects_newer_schema() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();

    let result = RecordStore::from_connection(conn);
    assert!(matches!(
        result,
        Err(DbError::UnsupportedSchemaVersion {
            db_version: 999,
            ..
        })
    ));
}

#[test]
fn close_releases_file_for_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("close.sqlite3");

    let store = RecordStore::open(&path).unwrap();
    store.close().unwrap();

    let reopened = RecordStore::open(&path).unwrap();
    assert_eq!(row_count(&reopened), 0);
    reopened.close().unwrap();
}
