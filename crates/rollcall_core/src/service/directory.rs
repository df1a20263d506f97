//! Student directory use-case service.
//!
//! # Responsibility
//! - Create, update, delete and list students through a repository.
//! - Validate form input and assign ids from the persisted counter.
//! - Summarize the filtered roster.
//!
//! # Invariants
//! - Failed validation or a missing id leaves stored state unchanged.
//! - Filtering never mutates the stored roster.
//! - Deleting a student leaves its attendance marks in place (orphan
//!   retention; see `AttendanceLedger::orphan_keys`).

use crate::model::student::{
    Student, StudentDraft, StudentFields, StudentId, StudentValidationError,
};
use crate::notify::{ChangeEvent, ChangeNotifier};
use crate::repo::student_repo::StudentRepository;
use crate::store::StoreError;
use chrono::{Local, NaiveDate};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Service error for directory use-cases.
#[derive(Debug)]
pub enum DirectoryError {
    /// Input failed a form rule; the message is user-facing.
    Validation(StudentValidationError),
    /// No student has the requested id.
    NotFound(StudentId),
    /// Persisting the change failed.
    Store(StoreError),
}

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(_) => write!(f, "Editing failed: record not found."),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DirectoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StudentValidationError> for DirectoryError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for DirectoryError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Roster view filter. Both parts are optional and combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    /// Exact section match; empty or `None` means all sections.
    pub section: Option<String>,
    /// Case-insensitive substring over name or contact.
    pub query: Option<String>,
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        if let Some(section) = self.section.as_deref().filter(|value| !value.is_empty()) {
            if student.section != section {
                return false;
            }
        }

        let query = self
            .query
            .as_deref()
            .map(|value| value.trim().to_lowercase())
            .unwrap_or_default();
        if query.is_empty() {
            return true;
        }
        student.name.to_lowercase().contains(&query)
            || student.contact.to_lowercase().contains(&query)
    }
}

/// Totals shown under the roster table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RosterSummary {
    /// Every stored student.
    pub total: usize,
    /// Students passing the filter.
    pub shown: usize,
    /// Salary sum over the shown students.
    pub total_salary: f64,
}

/// Directory service facade over a student repository.
pub struct StudentDirectory<R: StudentRepository> {
    repo: R,
    sections: Vec<String>,
    notifier: Option<Arc<ChangeNotifier>>,
    today: fn() -> NaiveDate,
}

impl<R: StudentRepository> StudentDirectory<R> {
    /// Creates a directory accepting the given section options.
    ///
    /// An empty option list accepts any section text.
    pub fn new(repo: R, sections: Vec<String>) -> Self {
        Self {
            repo,
            sections,
            notifier: None,
            today: local_today,
        }
    }

    /// Publishes `StudentsUpdated` after every successful write.
    pub fn with_notifier(mut self, notifier: Arc<ChangeNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Overrides the clock used for default joining dates.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Configured section options in display order.
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    /// Lists students passing `filter`, in stored order.
    pub fn list(&self, filter: &StudentFilter) -> Vec<Student> {
        self.repo
            .load_students()
            .into_iter()
            .filter(|student| filter.matches(student))
            .collect()
    }

    /// Gets one student by id.
    pub fn get(&self, id: StudentId) -> Option<Student> {
        self.repo
            .load_students()
            .into_iter()
            .find(|student| student.id == id)
    }

    /// Validates `draft`, assigns the next id and appends the student.
    pub fn create(&self, draft: &StudentDraft) -> DirectoryResult<Student> {
        let fields = self.validate(draft)?;
        let mut students = self.repo.load_students();
        let id = self.repo.next_id(&students);
        let student = fields.into_student(id);
        students.push(student.clone());
        if let Err(err) = self.repo.save_created(&students, id) {
            warn!("event=student_create module=directory status=error error_code=store_write_failed");
            return Err(err.into());
        }
        self.publish();
        info!("event=student_create module=directory status=ok id={id}");
        Ok(student)
    }

    /// Replaces the mutable fields of student `id`, keeping the id.
    pub fn update(&self, id: StudentId, draft: &StudentDraft) -> DirectoryResult<Student> {
        let fields = self.validate(draft)?;
        let mut students = self.repo.load_students();
        let Some(student) = students.iter_mut().find(|student| student.id == id) else {
            warn!("event=student_update module=directory status=error id={id} error_code=not_found");
            return Err(DirectoryError::NotFound(id));
        };
        fields.apply_to(student);
        let updated = student.clone();
        self.persist(&students, "student_update")?;
        info!("event=student_update module=directory status=ok id={id}");
        Ok(updated)
    }

    /// Removes student `id`. Returns whether a record was removed; nothing
    /// is written when the id is unknown.
    ///
    /// Callers gate this behind a confirmation step.
    pub fn delete(&self, id: StudentId) -> DirectoryResult<bool> {
        let mut students = self.repo.load_students();
        let before = students.len();
        students.retain(|student| student.id != id);
        if students.len() == before {
            info!("event=student_delete module=directory status=ok id={id} removed=false");
            return Ok(false);
        }
        self.persist(&students, "student_delete")?;
        info!("event=student_delete module=directory status=ok id={id} removed=true");
        Ok(true)
    }

    /// Removes every student and resets the id counter.
    ///
    /// Callers gate this behind a confirmation step.
    pub fn clear_all(&self) -> DirectoryResult<()> {
        self.repo.clear()?;
        info!("event=student_clear module=directory status=ok");
        self.publish();
        Ok(())
    }

    /// Summarizes the roster under `filter`.
    pub fn summary(&self, filter: &StudentFilter) -> RosterSummary {
        let students = self.repo.load_students();
        let shown: Vec<&Student> = students
            .iter()
            .filter(|student| filter.matches(student))
            .collect();
        RosterSummary {
            total: students.len(),
            shown: shown.len(),
            total_salary: shown.iter().map(|student| student.salary).sum(),
        }
    }

    fn validate(&self, draft: &StudentDraft) -> DirectoryResult<StudentFields> {
        draft.validate(&self.sections, (self.today)()).map_err(|err| {
            info!(
                "event=student_validate module=directory status=rejected rule={}",
                err.rule()
            );
            DirectoryError::Validation(err)
        })
    }

    fn persist(&self, students: &[Student], event: &str) -> DirectoryResult<()> {
        if let Err(err) = self.repo.save_students(students) {
            warn!("event={event} module=directory status=error error_code=store_write_failed");
            return Err(err.into());
        }
        self.publish();
        Ok(())
    }

    fn publish(&self) {
        if let Some(notifier) = &self.notifier {
            notifier.publish(ChangeEvent::StudentsUpdated);
        }
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
