//! Repository layer over the record store.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Repository APIs distinguish semantic outcomes (`NotFound`, invalid
//!   arguments) from backend transport errors.

pub mod student_repo;
