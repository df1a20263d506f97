//! Core domain logic for Rollcall, a local student attendance tracker.
//! This crate is the single source of truth for roster and ledger rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use config::{ConfigError, LoggingConfig, TrackerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError, LoggingStatus};
pub use model::attendance::{AttendanceBook, AttendanceStatus, AttendanceTotals, UnknownStatus};
pub use model::student::{
    parse_date, Student, StudentDraft, StudentFields, StudentId, StudentValidationError,
};
pub use notify::{ChangeEvent, ChangeNotifier, StorageWatcher};
pub use repo::attendance_repo::{AttendanceRepository, KvAttendanceRepository};
pub use repo::student_repo::{KvStudentRepository, StudentRepository};
pub use search::resolver::{autocomplete_labels, normalize_lookup_text, resolve, StudentResolver};
pub use service::directory::{
    DirectoryError, DirectoryResult, RosterSummary, StudentDirectory, StudentFilter,
};
pub use service::ledger::{
    parse_status, AttendanceLedger, DayEntry, LedgerError, LedgerResult, TotalsRow,
};
pub use service::session::{LoginRequest, Session, SessionError, SessionGate};
pub use store::{KeyValueStore, SqliteStore, StoreError, StoreKey, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
