//! Student domain model.
//!
//! # Responsibility
//! - Define the plain value persisted by the student repository.
//!
//! # Invariants
//! - `id == None` or a non-positive id means the value has never been
//!   persisted; backend-assigned ids start at 1.
//! - Once assigned by the backend, `id` identifies at most one row and is
//!   never reassigned to another student.
//! - `name` and `age` carry no validation; whatever the caller sets is stored.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Backend-assigned primary key of a student row.
pub type StudentId = i64;

/// A student record.
///
/// Values returned by the repository are detached copies: mutating them has
/// no effect on storage until they are passed back to `update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Assigned on `create`; `None` before the first insert.
    pub id: Option<StudentId>,
    pub name: String,
    pub age: i32,
}

impl Student {
    /// Creates an unsaved student without an id.
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            age,
        }
    }

    /// Creates a student that refers to an existing row.
    ///
    /// Used when reading rows back and by callers that already hold an id.
    pub fn with_id(id: StudentId, name: impl Into<String>, age: i32) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            age,
        }
    }

    /// Returns the id when it is one the store could have assigned.
    ///
    /// `Some(0)` and negative ids (e.g. from `{"id": 0}` input) count as unset.
    pub fn assigned_id(&self) -> Option<StudentId> {
        self.id.filter(|&id| is_assigned_id(id))
    }

    /// Returns whether this value has been assigned an id by the store.
    pub fn is_persisted(&self) -> bool {
        self.assigned_id().is_some()
    }
}

/// Returns whether `id` is in the range the store assigns (`>= 1`).
pub fn is_assigned_id(id: StudentId) -> bool {
    id > 0
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "Student{{id={id}, ")?,
            None => write!(f, "Student{{id=unset, ")?,
        }
        write!(f, "name='{}', age={}}}", self.name, self.age)
    }
}
