//! Attendance status tags and the date-keyed attendance book.
//!
//! # Responsibility
//! - Define the `present | absent` status tag.
//! - Hold the persisted `date -> student id -> status` mapping and answer
//!   scans over it (totals, per-day lookups, per-student removal).
//!
//! # Invariants
//! - At most one status per (date, student id); writes overwrite.
//! - Date buckets are never left empty after a removal.
//! - Unknown status text from persisted data is kept verbatim but never
//!   counted as present or absent.

use super::student::StudentId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Attendance mark for one student on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    /// Persisted tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }

    /// Capitalized label for rendering.
    pub fn label(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            _ => None,
        }
    }
}

impl Display for AttendanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status text that is neither `present` nor `absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl Display for UnknownStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown attendance status `{}`", self.0)
    }
}

impl Error for UnknownStatus {}

impl FromStr for AttendanceStatus {
    type Err = UnknownStatus;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_tag(value.trim().to_ascii_lowercase().as_str())
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// Lifetime counts for one student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceTotals {
    pub present: u32,
    pub absent: u32,
}

impl AttendanceTotals {
    /// Number of classes with a recorded mark.
    pub fn total(&self) -> u32 {
        self.present + self.absent
    }

    fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
        }
    }
}

/// Persisted attendance mapping: date (`YYYY-MM-DD`) -> student id -> tag.
///
/// Student ids are decimal string keys, matching the JSON object layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceBook {
    days: BTreeMap<String, BTreeMap<String, String>>,
}

impl AttendanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Recorded dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.days.keys().map(String::as_str)
    }

    /// Sets (or overwrites) the mark for `student_id` on `date`.
    pub fn set(&mut self, date: &str, student_id: StudentId, status: AttendanceStatus) {
        self.days
            .entry(date.to_string())
            .or_default()
            .insert(student_id.to_string(), status.as_str().to_string());
    }

    /// Returns the mark for one (date, student) pair, if recognized.
    pub fn status(&self, date: &str, student_id: StudentId) -> Option<AttendanceStatus> {
        self.days
            .get(date)
            .and_then(|day| day.get(&student_id.to_string()))
            .and_then(|tag| AttendanceStatus::from_tag(tag))
    }

    /// Removes every mark for `student_id` and drops emptied dates.
    ///
    /// Returns the number of removed marks.
    pub fn remove_student(&mut self, student_id: StudentId) -> usize {
        let key = student_id.to_string();
        let mut removed = 0;
        self.days.retain(|_, day| {
            if day.remove(&key).is_some() {
                removed += 1;
            }
            !day.is_empty()
        });
        removed
    }

    /// Full scan of every date for one student.
    pub fn totals_for(&self, student_id: StudentId) -> AttendanceTotals {
        let key = student_id.to_string();
        let mut totals = AttendanceTotals::default();
        for day in self.days.values() {
            if let Some(status) = day.get(&key).and_then(|tag| AttendanceStatus::from_tag(tag)) {
                totals.record(status);
            }
        }
        totals
    }

    /// Accumulates totals for every student key present in the book.
    pub fn totals_by_key(&self) -> BTreeMap<&str, AttendanceTotals> {
        let mut totals: BTreeMap<&str, AttendanceTotals> = BTreeMap::new();
        for day in self.days.values() {
            for (key, tag) in day {
                let entry = totals.entry(key.as_str()).or_default();
                if let Some(status) = AttendanceStatus::from_tag(tag) {
                    entry.record(status);
                }
            }
        }
        totals
    }

    /// Distinct student keys with at least one mark.
    pub fn student_keys(&self) -> BTreeSet<&str> {
        self.days
            .values()
            .flat_map(|day| day.keys().map(String::as_str))
            .collect()
    }

    /// Number of dates that hold any mark (recognized or not) for `student_id`.
    pub fn dates_recorded_for(&self, student_id: StudentId) -> usize {
        let key = student_id.to_string();
        self.days.values().filter(|day| day.contains_key(&key)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::{AttendanceBook, AttendanceStatus, AttendanceTotals};

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(" Present ".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Present));
        assert_eq!("ABSENT".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Absent));
        assert!("late".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn set_overwrites_instead_of_accumulating() {
        let mut book = AttendanceBook::new();
        book.set("2024-01-10", 1, AttendanceStatus::Present);
        book.set("2024-01-10", 1, AttendanceStatus::Absent);

        assert_eq!(book.status("2024-01-10", 1), Some(AttendanceStatus::Absent));
        assert_eq!(
            book.totals_for(1),
            AttendanceTotals {
                present: 0,
                absent: 1
            }
        );
    }

    #[test]
    fn remove_student_drops_empty_buckets_only() {
        let mut book = AttendanceBook::new();
        book.set("2024-01-10", 1, AttendanceStatus::Present);
        book.set("2024-01-11", 1, AttendanceStatus::Absent);
        book.set("2024-01-11", 2, AttendanceStatus::Present);

        assert_eq!(book.remove_student(1), 2);
        assert_eq!(book.dates().collect::<Vec<_>>(), vec!["2024-01-11"]);
        assert_eq!(book.status("2024-01-11", 2), Some(AttendanceStatus::Present));
        assert_eq!(book.remove_student(1), 0);
    }

    #[test]
    fn unknown_tags_are_ignored_by_totals() {
        let book: AttendanceBook =
            serde_json::from_str(r#"{"2024-01-10":{"1":"late","2":"present"}}"#).unwrap();

        assert_eq!(book.totals_for(1), AttendanceTotals::default());
        assert_eq!(book.status("2024-01-10", 1), None);
        assert_eq!(book.dates_recorded_for(1), 1);
        assert_eq!(book.totals_by_key().get("2").map(|t| t.present), Some(1));
    }
}
