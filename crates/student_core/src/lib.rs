//! Embedded persistence core for student records.
//!
//! `RecordStore` owns the SQLite connection and scopes every unit of work to
//! a transaction or read session; `SqliteStudentRepository` maps `Student`
//! values onto the `students` table through it.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use db::{DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::student::{is_assigned_id, Student, StudentId};
pub use repo::student_repo::{RepoError, RepoResult, SqliteStudentRepository, StudentRepository};
pub use store::RecordStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
