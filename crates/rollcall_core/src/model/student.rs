//! Student record and form validation.
//!
//! # Responsibility
//! - Define the persisted student shape (`camelCase` JSON keys).
//! - Validate raw form input before a record is created or updated.
//!
//! # Invariants
//! - `id` is assigned by the directory counter and is immutable.
//! - Validation runs at input time only; persisted records are not re-checked
//!   on read.
//! - Rules are checked in a fixed order: name, contact, salary, section,
//!   joining date. The first violation wins.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

// Why: `\d` would also accept non-ASCII Unicode digits.
static CONTACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{11}$").expect("valid contact regex"));
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));

/// Date format used for joining dates and ledger keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Integer identity assigned from the persisted counter.
pub type StudentId = u64;

/// Persisted student record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// Eleven-digit phone number.
    pub contact: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub salary: f64,
    pub joining_date: NaiveDate,
}

impl Student {
    /// Display label used for autocomplete, e.g. `Asha - 1`.
    ///
    /// The resolver maps this label back to the same record.
    pub fn label(&self) -> String {
        format!("{} - {}", self.name, self.id)
    }
}

/// Raw form input for creating or updating a student.
///
/// Every field is kept as entered; `validate` trims and parses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentDraft {
    pub name: String,
    pub contact: String,
    /// Empty means "first configured section".
    pub section: String,
    /// Empty means 0.
    pub salary: String,
    /// Empty means today.
    pub joining_date: String,
}

/// Validated mutable fields of a student.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentFields {
    pub name: String,
    pub contact: String,
    pub section: String,
    pub salary: f64,
    pub joining_date: NaiveDate,
}

impl StudentFields {
    pub fn into_student(self, id: StudentId) -> Student {
        Student {
            id,
            name: self.name,
            contact: self.contact,
            section: self.section,
            salary: self.salary,
            joining_date: self.joining_date,
        }
    }

    /// Overwrites every mutable field of `student`, keeping its id.
    pub fn apply_to(self, student: &mut Student) {
        student.name = self.name;
        student.contact = self.contact;
        student.section = self.section;
        student.salary = self.salary;
        student.joining_date = self.joining_date;
    }
}

/// Input-time validation failure. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    MissingName,
    InvalidContact,
    SalaryNotNumeric(String),
    NegativeSalary,
    UnknownSection {
        section: String,
        allowed: Vec<String>,
    },
    InvalidJoiningDate(String),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "Student name is required."),
            Self::InvalidContact => write!(f, "Contact should be exactly 11 digits."),
            Self::SalaryNotNumeric(_) => write!(f, "Salary must be a number."),
            Self::NegativeSalary => write!(f, "Salary cannot be negative."),
            Self::UnknownSection { allowed, .. } => {
                write!(f, "Section must be one of: {}.", allowed.join(", "))
            }
            Self::InvalidJoiningDate(_) => write!(f, "Joining date must be in YYYY-MM-DD form."),
        }
    }
}

impl Error for StudentValidationError {}

impl StudentValidationError {
    /// Stable rule name for diagnostics; never includes user input.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::MissingName => "name",
            Self::InvalidContact => "contact",
            Self::SalaryNotNumeric(_) | Self::NegativeSalary => "salary",
            Self::UnknownSection { .. } => "section",
            Self::InvalidJoiningDate(_) => "joining_date",
        }
    }
}

impl StudentDraft {
    /// Validates the draft against the configured section options.
    ///
    /// `today` fills an empty joining date; an empty `sections` list accepts
    /// any section text.
    pub fn validate(
        &self,
        sections: &[String],
        today: NaiveDate,
    ) -> Result<StudentFields, StudentValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(StudentValidationError::MissingName);
        }

        let contact = self.contact.trim();
        if !CONTACT_RE.is_match(contact) {
            return Err(StudentValidationError::InvalidContact);
        }

        let salary = parse_salary(self.salary.trim())?;
        let section = resolve_section(self.section.trim(), sections)?;

        let joining_text = self.joining_date.trim();
        let joining_date = if joining_text.is_empty() {
            today
        } else {
            parse_date(joining_text)
                .ok_or_else(|| StudentValidationError::InvalidJoiningDate(joining_text.to_string()))?
        };

        Ok(StudentFields {
            name: name.to_string(),
            contact: contact.to_string(),
            section,
            salary,
            joining_date,
        })
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    // Why: chrono also accepts a signed year, unpadded fields and inner
    // spaces; one calendar day must map to exactly one ledger key.
    if !DATE_RE.is_match(trimmed) {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok()
}

fn parse_salary(value: &str) -> Result<f64, StudentValidationError> {
    if value.is_empty() {
        return Ok(0.0);
    }
    let parsed = value
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| StudentValidationError::SalaryNotNumeric(value.to_string()))?;
    if parsed < 0.0 {
        return Err(StudentValidationError::NegativeSalary);
    }
    Ok(parsed)
}

fn resolve_section(value: &str, sections: &[String]) -> Result<String, StudentValidationError> {
    if sections.is_empty() {
        return Ok(value.to_string());
    }
    if value.is_empty() {
        return Ok(sections[0].clone());
    }
    if sections.iter().any(|option| option == value) {
        return Ok(value.to_string());
    }
    Err(StudentValidationError::UnknownSection {
        section: value.to_string(),
        allowed: sections.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_date, StudentDraft, StudentValidationError};
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date")
    }

    fn sections() -> Vec<String> {
        vec!["A".to_string(), "B".to_string()]
    }

    fn draft() -> StudentDraft {
        StudentDraft {
            name: "Asha".to_string(),
            contact: "01234567890".to_string(),
            ..StudentDraft::default()
        }
    }

    #[test]
    fn empty_optional_fields_take_defaults() {
        let fields = draft().validate(&sections(), today()).unwrap();
        assert_eq!(fields.section, "A");
        assert_eq!(fields.salary, 0.0);
        assert_eq!(fields.joining_date, today());
    }

    #[test]
    fn name_is_checked_before_contact_and_salary() {
        let bad = StudentDraft {
            name: "   ".to_string(),
            contact: "123".to_string(),
            salary: "lots".to_string(),
            ..StudentDraft::default()
        };
        assert_eq!(
            bad.validate(&sections(), today()),
            Err(StudentValidationError::MissingName)
        );

        let bad_contact = StudentDraft {
            name: "Asha".to_string(),
            ..bad
        };
        assert_eq!(
            bad_contact.validate(&sections(), today()),
            Err(StudentValidationError::InvalidContact)
        );
    }

    #[test]
    fn contact_rejects_non_ascii_digits_and_wrong_length() {
        for contact in ["0123456789", "012345678901", "0123456789a", "٠١٢٣٤٥٦٧٨٩٠"] {
            let candidate = StudentDraft {
                contact: contact.to_string(),
                ..draft()
            };
            assert_eq!(
                candidate.validate(&sections(), today()),
                Err(StudentValidationError::InvalidContact),
                "contact {contact:?} should be rejected"
            );
        }
    }

    #[test]
    fn salary_must_be_finite_and_non_negative() {
        let not_number = StudentDraft {
            salary: "abc".to_string(),
            ..draft()
        };
        assert!(matches!(
            not_number.validate(&sections(), today()),
            Err(StudentValidationError::SalaryNotNumeric(_))
        ));

        let negative = StudentDraft {
            salary: "-5".to_string(),
            ..draft()
        };
        assert_eq!(
            negative.validate(&sections(), today()),
            Err(StudentValidationError::NegativeSalary)
        );

        let fine = StudentDraft {
            salary: " 1500.5 ".to_string(),
            ..draft()
        };
        assert_eq!(fine.validate(&sections(), today()).unwrap().salary, 1500.5);
    }

    #[test]
    fn section_outside_configured_options_is_rejected() {
        let candidate = StudentDraft {
            section: "Z".to_string(),
            ..draft()
        };
        let err = candidate.validate(&sections(), today()).unwrap_err();
        assert_eq!(err.to_string(), "Section must be one of: A, B.");

        assert_eq!(candidate.validate(&[], today()).unwrap().section, "Z");
    }

    #[test]
    fn parse_date_requires_padded_iso_form() {
        assert_eq!(parse_date("2024-01-10"), Some(today()));
        assert_eq!(parse_date("2024-1-10"), None);
        assert_eq!(parse_date("10/01/2024"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("+2024-1-10"), None);
        assert_eq!(parse_date("2024- 1-10"), None);
        assert_eq!(parse_date(" 2024-01-10 "), Some(today()));
    }
}
