//! Typed collection repositories over the key-value store.
//!
//! # Responsibility
//! - Map logical collections (`students`, `students_nextId`,
//!   `attendance_records`) onto store keys.
//! - Keep JSON and counter encoding out of the service layer.
//!
//! # Invariants
//! - Loads are fail-soft: malformed data yields an empty collection.
//! - Saves return store errors unchanged.

pub mod attendance_repo;
pub mod student_repo;
