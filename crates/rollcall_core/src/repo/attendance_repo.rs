//! Attendance book persistence.

use crate::model::attendance::AttendanceBook;
use crate::store::{read_json_or_default, write_json, KeyValueStore, StoreKey, StoreResult};

/// Repository interface for the `attendance_records` collection.
pub trait AttendanceRepository {
    /// Loads the whole book; malformed data yields an empty book.
    fn load_book(&self) -> AttendanceBook;
    /// Replaces the stored book.
    fn save_book(&self, book: &AttendanceBook) -> StoreResult<()>;
}

/// Attendance repository backed by any `KeyValueStore`.
#[derive(Clone, Copy)]
pub struct KvAttendanceRepository<S> {
    store: S,
}

impl<S: KeyValueStore> KvAttendanceRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> AttendanceRepository for KvAttendanceRepository<S> {
    fn load_book(&self) -> AttendanceBook {
        read_json_or_default(&self.store, StoreKey::AttendanceRecords)
    }

    fn save_book(&self, book: &AttendanceBook) -> StoreResult<()> {
        write_json(&self.store, StoreKey::AttendanceRecords, book)
    }
}
