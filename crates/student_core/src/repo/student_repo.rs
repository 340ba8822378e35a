//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `students` table.
//! - Map `Student` values to and from rows; keep SQL inside this module.
//!
//! # Invariants
//! - Argument checks run before any statement reaches the backend.
//! - Ids `<= 0` are unset for every operation (`Student::assigned_id`).
//! - Every write runs in its own scoped transaction from `RecordStore`.
//! - `update` on a missing row is `NotFound`; `delete` on a missing row is a
//!   successful no-op.

use crate::db::DbError;
use crate::model::student::{is_assigned_id, Student, StudentId};
use crate::store::RecordStore;
use log::info;
use rusqlite::{params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT id, name, age FROM students";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by student repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Backend failure; the enclosing transaction has been rolled back.
    Persistence(DbError),
    /// `update` targeted an id with no matching row.
    NotFound(StudentId),
    /// Rejected before reaching the backend.
    InvalidArgument(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "persistence error: {err}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::NotFound(_) | Self::InvalidArgument(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Persistence(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Persistence(DbError::Sqlite(value))
    }
}

/// Repository interface for student CRUD operations.
pub trait StudentRepository {
    /// Inserts an unsaved student and writes the assigned id back into it.
    fn create(&self, student: &mut Student) -> RepoResult<StudentId>;
    /// Point lookup by primary key; `None` when no row matches.
    fn get_by_id(&self, id: StudentId) -> RepoResult<Option<Student>>;
    /// Returns every stored student. Callers must not rely on the order.
    fn get_all(&self) -> RepoResult<Vec<Student>>;
    /// Overwrites `name` and `age` of the row matching `student.id`.
    fn update(&self, student: &Student) -> RepoResult<()>;
    /// Removes the row if present. Returns whether a row was removed.
    fn delete(&self, id: StudentId) -> RepoResult<bool>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'store> {
    store: &'store RecordStore,
}

impl<'store> SqliteStudentRepository<'store> {
    pub fn new(store: &'store RecordStore) -> Self {
        Self { store }
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create(&self, student: &mut Student) -> RepoResult<StudentId> {
        if let Some(id) = student.assigned_id() {
            return Err(RepoError::InvalidArgument(format!(
                "create requires an unsaved student, got id {id}"
            )));
        }

        let id = self.store.with_transaction(|tx| -> RepoResult<StudentId> {
            let id = tx.query_row(
                "INSERT INTO students (name, age) VALUES (?1, ?2) RETURNING id;",
                params![student.name.as_str(), student.age],
                |row| row.get(0),
            )?;
            Ok(id)
        })?;

        student.id = Some(id);
        info!("event=student_create module=repo status=ok id={id}");
        Ok(id)
    }

    fn get_by_id(&self, id: StudentId) -> RepoResult<Option<Student>> {
        self.store.with_read_session(|conn| {
            let mut stmt = conn.prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
            let mut rows = stmt.query([id])?;
            if let Some(row) = rows.next()? {
                return Ok(Some(parse_student_row(row)?));
            }

            Ok(None)
        })
    }

    fn get_all(&self) -> RepoResult<Vec<Student>> {
        self.store.with_read_session(|conn| {
            let mut stmt = conn.prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY id ASC;"))?;
            let mut rows = stmt.query([])?;
            let mut students = Vec::new();

            while let Some(row) = rows.next()? {
                students.push(parse_student_row(row)?);
            }

            Ok(students)
        })
    }

    fn update(&self, student: &Student) -> RepoResult<()> {
        let id = student.assigned_id().ok_or_else(|| {
            RepoError::InvalidArgument("update requires a student with an assigned id".to_string())
        })?;

        self.store.with_transaction(|tx| -> RepoResult<()> {
            let changed = tx.execute(
                "UPDATE students SET name = ?1, age = ?2 WHERE id = ?3;",
                params![student.name.as_str(), student.age, id],
            )?;

            if changed == 0 {
                return Err(RepoError::NotFound(id));
            }

            Ok(())
        })?;

        info!("event=student_update module=repo status=ok id={id}");
        Ok(())
    }

    fn delete(&self, id: StudentId) -> RepoResult<bool> {
        if !is_assigned_id(id) {
            return Err(RepoError::InvalidArgument(format!(
                "delete requires an assigned id, got {id}"
            )));
        }

        let removed = self.store.with_transaction(|tx| -> RepoResult<bool> {
            let changed = tx.execute("DELETE FROM students WHERE id = ?1;", [id])?;
            Ok(changed > 0)
        })?;

        info!("event=student_delete module=repo status=ok id={id} removed={removed}");
        Ok(removed)
    }
}

fn parse_student_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student::with_id(
        row.get("id")?,
        row.get::<_, String>("name")?,
        row.get("age")?,
    ))
}
