//! Domain model for student records.
//!
//! # Invariants
//! - Model values are plain data; no hidden change tracking.

pub mod student;
