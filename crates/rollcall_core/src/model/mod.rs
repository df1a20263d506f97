//! Domain model for the attendance tracker.
//!
//! # Responsibility
//! - Define the student record and its input-time validation.
//! - Define the date-keyed attendance book and status tags.
//!
//! # Invariants
//! - Student ids are assigned once and never change.
//! - The attendance book holds at most one status per (date, student id).

pub mod attendance;
pub mod student;
