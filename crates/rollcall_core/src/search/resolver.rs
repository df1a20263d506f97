//! Student resolver.
//!
//! # Invariants
//! - Resolution short-circuits in a fixed order: id after the last hyphen,
//!   exact id, then name/id substring.
//! - All comparisons are case-insensitive.
//! - Empty input never matches.
//! - Every label from `autocomplete_labels` resolves to its own student.

use crate::model::student::Student;
use crate::repo::student_repo::StudentRepository;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static HYPHEN_SPACING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*-\s*").expect("valid hyphen spacing regex"));

/// Normalizes lookup text.
///
/// Em/en dashes become ASCII hyphens and whitespace around hyphens is
/// removed, so `Asha — 7` and `Asha-7` normalize identically.
pub fn normalize_lookup_text(text: &str) -> String {
    let dashed = text.trim().replace(['\u{2014}', '\u{2013}'], "-");
    HYPHEN_SPACING_RE
        .replace_all(&dashed, "-")
        .trim()
        .to_string()
}

/// Resolves `text` against `students`, returning the first match.
pub fn resolve<'a>(students: &'a [Student], text: &str) -> Option<&'a Student> {
    let normalized = normalize_lookup_text(text);
    if normalized.is_empty() {
        return None;
    }
    let lower = normalized.to_lowercase();

    // Why: the name part of a `Name - id` label may itself contain hyphens,
    // so the id is read after the last one.
    if let Some((_, tail)) = normalized.rsplit_once('-') {
        let candidate = tail.trim().to_lowercase();
        if !candidate.is_empty() {
            if let Some(student) = find_by_id_text(students, &candidate) {
                return Some(student);
            }
        }
    }

    if let Some(student) = find_by_id_text(students, &lower) {
        return Some(student);
    }

    students.iter().find(|student| {
        student.name.to_lowercase().contains(&lower)
            || student.id.to_string().contains(&lower)
    })
}

/// `Name - id` labels in roster order.
pub fn autocomplete_labels(students: &[Student]) -> Vec<String> {
    students.iter().map(Student::label).collect()
}

fn find_by_id_text<'a>(students: &'a [Student], lower_id: &str) -> Option<&'a Student> {
    students
        .iter()
        .find(|student| student.id.to_string() == lower_id)
}

/// Resolver that re-reads the roster on every lookup.
pub struct StudentResolver<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> StudentResolver<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Resolves `text` against the current roster.
    pub fn resolve(&self, text: &str) -> Option<Student> {
        let students = self.repo.load_students();
        let found = resolve(&students, text).cloned();
        debug!(
            "event=student_resolve module=search status={} roster_size={}",
            if found.is_some() { "ok" } else { "not_found" },
            students.len()
        );
        found
    }

    /// Autocomplete labels for the current roster.
    pub fn suggestions(&self) -> Vec<String> {
        autocomplete_labels(&self.repo.load_students())
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_lookup_text;

    #[test]
    fn normalize_collapses_unicode_dashes_and_spacing() {
        assert_eq!(normalize_lookup_text("  Asha \u{2014} 7 "), "Asha-7");
        assert_eq!(normalize_lookup_text("Asha \u{2013}7"), "Asha-7");
        assert_eq!(normalize_lookup_text("Mary - Jane - 12"), "Mary-Jane-12");
    }

    #[test]
    fn normalize_keeps_inner_spaces_away_from_hyphens() {
        assert_eq!(normalize_lookup_text("Alice Smith - 7"), "Alice Smith-7");
    }
}
