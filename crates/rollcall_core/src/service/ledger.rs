//! Attendance ledger use-case service.
//!
//! # Responsibility
//! - Record present/absent marks per (date, student).
//! - Compute lifetime totals, the totals table and single-day views.
//! - Reset every mark of one student.
//!
//! # Invariants
//! - Totals are recomputed from a full scan on every call.
//! - Marks are not checked against the roster; marks for ids that are not
//!   (or no longer) in the roster are retained as orphans, excluded from
//!   roster totals and listed by `orphan_keys`.
//! - A day view never infers `absent` for a student without a mark.

use crate::model::attendance::{AttendanceBook, AttendanceStatus, AttendanceTotals};
use crate::model::student::{parse_date, Student, StudentId, DATE_FORMAT};
use crate::notify::{ChangeEvent, ChangeNotifier};
use crate::repo::attendance_repo::AttendanceRepository;
use crate::repo::student_repo::StudentRepository;
use crate::search::resolver::resolve;
use crate::store::StoreError;
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Service error for ledger use-cases.
#[derive(Debug)]
pub enum LedgerError {
    MissingDate,
    InvalidDate(String),
    InvalidStatus(String),
    /// Search text matched no student.
    StudentNotResolved(String),
    Store(StoreError),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDate => write!(f, "Select Date."),
            Self::InvalidDate(value) => write!(f, "Date `{value}` must be in YYYY-MM-DD form."),
            Self::InvalidStatus(_) => write!(f, "Select Present or Absent"),
            Self::StudentNotResolved(_) => write!(f, "No student found - input valid name or id."),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// One roster row of the totals table.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsRow {
    /// 1-based roster position.
    pub position: usize,
    pub student: Student,
    pub totals: AttendanceTotals,
}

/// One roster row of a single-day view.
#[derive(Debug, Clone, PartialEq)]
pub struct DayEntry {
    /// 1-based roster position.
    pub position: usize,
    pub student: Student,
    /// `None` when no recognized mark exists for the day.
    pub status: Option<AttendanceStatus>,
}

/// Parses a status choice, e.g. from a radio button or CLI flag.
pub fn parse_status(value: &str) -> LedgerResult<AttendanceStatus> {
    value
        .parse()
        .map_err(|_| LedgerError::InvalidStatus(value.to_string()))
}

/// Ledger service over student and attendance repositories.
pub struct AttendanceLedger<S: StudentRepository, A: AttendanceRepository> {
    students: S,
    records: A,
    notifier: Option<Arc<ChangeNotifier>>,
}

impl<S: StudentRepository, A: AttendanceRepository> AttendanceLedger<S, A> {
    pub fn new(students: S, records: A) -> Self {
        Self {
            students,
            records,
            notifier: None,
        }
    }

    /// Publishes `AttendanceUpdated` after every successful write.
    pub fn with_notifier(mut self, notifier: Arc<ChangeNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Records `status` for (`date`, `student_id`), overwriting any prior mark.
    pub fn mark_attendance(
        &self,
        student_id: StudentId,
        date: &str,
        status: AttendanceStatus,
    ) -> LedgerResult<()> {
        let date = validate_date(date)?;
        let mut book = self.records.load_book();
        book.set(&date, student_id, status);
        self.persist(&book, "attendance_mark")?;
        info!(
            "event=attendance_mark module=ledger status=ok id={student_id} date={date} mark={status}"
        );
        Ok(())
    }

    /// Resolves `input` to a student and records the mark for it.
    pub fn mark_for_input(
        &self,
        input: &str,
        date: &str,
        status: AttendanceStatus,
    ) -> LedgerResult<Student> {
        let students = self.students.load_students();
        let student = resolve(&students, input)
            .cloned()
            .ok_or_else(|| LedgerError::StudentNotResolved(input.to_string()))?;
        self.mark_attendance(student.id, date, status)?;
        Ok(student)
    }

    /// Lifetime totals for one student id, orphan or not.
    pub fn totals_for(&self, student_id: StudentId) -> AttendanceTotals {
        self.records.load_book().totals_for(student_id)
    }

    /// Totals for every roster student; students without marks get zeros.
    pub fn totals_for_all(&self) -> BTreeMap<StudentId, AttendanceTotals> {
        let students = self.students.load_students();
        let book = self.records.load_book();
        let by_key = book.totals_by_key();
        students
            .iter()
            .map(|student| {
                let totals = by_key
                    .get(student.id.to_string().as_str())
                    .copied()
                    .unwrap_or_default();
                (student.id, totals)
            })
            .collect()
    }

    /// Roster-ordered totals table.
    pub fn totals_table(&self) -> Vec<TotalsRow> {
        let students = self.students.load_students();
        let book = self.records.load_book();
        students
            .into_iter()
            .enumerate()
            .map(|(index, student)| TotalsRow {
                position: index + 1,
                totals: book.totals_for(student.id),
                student,
            })
            .collect()
    }

    /// Roster-ordered marks for one date.
    pub fn day_view(&self, date: &str) -> LedgerResult<Vec<DayEntry>> {
        let date = validate_date(date)?;
        let students = self.students.load_students();
        let book = self.records.load_book();
        Ok(students
            .into_iter()
            .enumerate()
            .map(|(index, student)| DayEntry {
                position: index + 1,
                status: book.status(&date, student.id),
                student,
            })
            .collect())
    }

    /// Deletes every mark of `student_id` across all dates.
    ///
    /// Returns the number of removed marks; nothing is written when zero.
    /// Callers gate this behind a confirmation step.
    pub fn reset_student(&self, student_id: StudentId) -> LedgerResult<usize> {
        let mut book = self.records.load_book();
        let removed = book.remove_student(student_id);
        if removed > 0 {
            self.persist(&book, "attendance_reset")?;
        }
        info!("event=attendance_reset module=ledger status=ok id={student_id} removed={removed}");
        Ok(removed)
    }

    /// Ledger keys that match no roster student.
    pub fn orphan_keys(&self) -> Vec<String> {
        let known: BTreeSet<String> = self
            .students
            .load_students()
            .iter()
            .map(|student| student.id.to_string())
            .collect();
        let book = self.records.load_book();
        book.student_keys()
            .into_iter()
            .filter(|key| !known.contains(*key))
            .map(str::to_string)
            .collect()
    }

    fn persist(&self, book: &AttendanceBook, event: &str) -> LedgerResult<()> {
        if let Err(err) = self.records.save_book(book) {
            warn!("event={event} module=ledger status=error error_code=store_write_failed");
            return Err(err.into());
        }
        if let Some(notifier) = &self.notifier {
            notifier.publish(ChangeEvent::AttendanceUpdated);
        }
        Ok(())
    }
}

/// Returns the canonical ledger key for `date`.
fn validate_date(date: &str) -> LedgerResult<String> {
    let trimmed = date.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::MissingDate);
    }
    parse_date(trimmed)
        .map(|day| day.format(DATE_FORMAT).to_string())
        .ok_or_else(|| LedgerError::InvalidDate(trimmed.to_string()))
}
