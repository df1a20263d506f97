//! Student collection and id counter persistence.
//!
//! # Responsibility
//! - Load/save the ordered `students` array.
//! - Allocate ids from the persisted `students_nextId` counter.
//!
//! # Invariants
//! - An allocated id is strictly greater than every id allocated before,
//!   even after deletions.
//! - A missing or malformed counter never causes an id to be reused while
//!   students exist.

use crate::model::student::{Student, StudentId};
use crate::store::{
    read_json_or_default, read_text, write_json, KeyValueStore, StoreKey, StoreResult,
};
use log::warn;

const FIRST_STUDENT_ID: StudentId = 1;

/// Repository interface for the student collection.
pub trait StudentRepository {
    /// Loads the roster in stored order; malformed data yields an empty list.
    fn load_students(&self) -> Vec<Student>;
    /// Replaces the stored roster.
    fn save_students(&self, students: &[Student]) -> StoreResult<()>;
    /// Next id to assign; reads the counter without advancing it.
    fn next_id(&self, existing: &[Student]) -> StudentId;
    /// Saves a roster that gained student `id` and advances the counter past
    /// it. Either both writes land or neither does.
    fn save_created(&self, students: &[Student], id: StudentId) -> StoreResult<()>;
    /// Removes the roster and the id counter.
    fn clear(&self) -> StoreResult<()>;
}

/// Student repository backed by any `KeyValueStore`.
#[derive(Clone, Copy)]
pub struct KvStudentRepository<S> {
    store: S,
}

impl<S: KeyValueStore> KvStudentRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn stored_counter(&self) -> Option<StudentId> {
        let raw = read_text(&self.store, StoreKey::StudentsNextId)?;
        match raw.trim().parse::<StudentId>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(
                    "event=counter_read module=repo status=recovered key={} reason=malformed",
                    StoreKey::StudentsNextId
                );
                None
            }
        }
    }
}

impl<S: KeyValueStore> StudentRepository for KvStudentRepository<S> {
    fn load_students(&self) -> Vec<Student> {
        read_json_or_default(&self.store, StoreKey::Students)
    }

    fn save_students(&self, students: &[Student]) -> StoreResult<()> {
        write_json(&self.store, StoreKey::Students, students)
    }

    fn next_id(&self, existing: &[Student]) -> StudentId {
        let counter = self.stored_counter().unwrap_or(FIRST_STUDENT_ID);
        let after_existing = existing
            .iter()
            .map(|student| student.id.saturating_add(1))
            .max()
            .unwrap_or(FIRST_STUDENT_ID);
        counter.max(after_existing).max(FIRST_STUDENT_ID)
    }

    fn save_created(&self, students: &[Student], id: StudentId) -> StoreResult<()> {
        self.store.atomically(|| {
            write_json(&self.store, StoreKey::Students, students)?;
            self.store
                .set(StoreKey::StudentsNextId, &id.saturating_add(1).to_string())
        })
    }

    fn clear(&self) -> StoreResult<()> {
        self.store.remove(StoreKey::Students)?;
        self.store.remove(StoreKey::StudentsNextId)
    }
}
