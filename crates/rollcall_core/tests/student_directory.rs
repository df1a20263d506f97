use chrono::NaiveDate;
use rollcall_core::db::open_db_in_memory;
use rollcall_core::{
    DirectoryError, KeyValueStore, KvStudentRepository, SqliteStore, StoreKey, StudentDirectory,
    StudentDraft, StudentFilter, StudentValidationError,
};
use rusqlite::Connection;

type Directory<'conn> = StudentDirectory<KvStudentRepository<SqliteStore<'conn>>>;

fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn directory(conn: &Connection) -> Directory<'_> {
    StudentDirectory::new(
        KvStudentRepository::new(SqliteStore::new(conn)),
        vec!["A".to_string(), "B".to_string()],
    )
    .with_today(fixed_today)
}

fn draft(name: &str, contact: &str, section: &str) -> StudentDraft {
    StudentDraft {
        name: name.to_string(),
        contact: contact.to_string(),
        section: section.to_string(),
        ..StudentDraft::default()
    }
}

#[test]
fn create_assigns_first_id_and_defaults() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);

    let asha = directory
        .create(&draft("Asha", "01234567890", "A"))
        .unwrap();
    assert_eq!(asha.id, 1);
    assert_eq!(asha.salary, 0.0);
    assert_eq!(asha.joining_date, fixed_today());
    assert_eq!(directory.get(1), Some(asha));
}

#[test]
fn ids_strictly_increase_even_after_deletions() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);

    let mut last_id = 0;
    for round in 0..4 {
        let student = directory
            .create(&draft(&format!("Student {round}"), "01234567890", "A"))
            .unwrap();
        assert!(student.id > last_id);
        last_id = student.id;
        assert!(directory.delete(student.id).unwrap());
    }

    let after = directory
        .create(&draft("After", "01234567890", "B"))
        .unwrap();
    assert_eq!(after.id, 5);
}

#[test]
fn validation_failures_leave_roster_untouched() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);

    let err = directory.create(&draft("", "123", "A")).unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::Validation(StudentValidationError::MissingName)
    ));
    assert_eq!(err.to_string(), "Student name is required.");

    let err = directory.create(&draft("Asha", "123", "A")).unwrap_err();
    assert_eq!(err.to_string(), "Contact should be exactly 11 digits.");

    let mut bad_salary = draft("Asha", "01234567890", "A");
    bad_salary.salary = "ten".to_string();
    let err = directory.create(&bad_salary).unwrap_err();
    assert_eq!(err.to_string(), "Salary must be a number.");

    assert!(directory.list(&StudentFilter::default()).is_empty());
    let store = SqliteStore::new(&conn);
    assert_eq!(store.get(StoreKey::StudentsNextId).unwrap(), None);
}

#[test]
fn update_preserves_id_and_replaces_fields() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);
    let created = directory
        .create(&draft("Asha", "01234567890", "A"))
        .unwrap();

    let mut edit = draft("Asha Rao", "09876543210", "B");
    edit.salary = "250".to_string();
    edit.joining_date = "2023-09-01".to_string();
    let updated = directory.update(created.id, &edit).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Asha Rao");
    assert_eq!(updated.section, "B");
    assert_eq!(updated.salary, 250.0);
    assert_eq!(updated.joining_date.to_string(), "2023-09-01");
    assert_eq!(directory.get(created.id), Some(updated));
}

#[test]
fn update_of_missing_id_is_not_found_with_distinct_message() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);

    let err = directory
        .update(42, &draft("Ghost", "01234567890", "A"))
        .unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound(42)));
    assert_eq!(err.to_string(), "Editing failed: record not found.");
}

#[test]
fn update_validates_before_looking_up_the_record() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);

    let err = directory.update(42, &draft("", "", "")).unwrap_err();
    assert!(matches!(err, DirectoryError::Validation(_)));
}

#[test]
fn list_filters_by_section_and_name_or_contact() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);
    directory
        .create(&draft("Asha", "01234567890", "A"))
        .unwrap();
    directory
        .create(&draft("Bilal", "05550000000", "B"))
        .unwrap();
    directory
        .create(&draft("Ashraf", "07770000000", "B"))
        .unwrap();

    let by_name = StudentFilter {
        query: Some("ASH".to_string()),
        ..StudentFilter::default()
    };
    let names: Vec<String> = directory
        .list(&by_name)
        .into_iter()
        .map(|student| student.name)
        .collect();
    assert_eq!(names, vec!["Asha", "Ashraf"]);

    let both = StudentFilter {
        section: Some("B".to_string()),
        query: Some("ash".to_string()),
    };
    let names: Vec<String> = directory
        .list(&both)
        .into_iter()
        .map(|student| student.name)
        .collect();
    assert_eq!(names, vec!["Ashraf"]);

    let by_contact = StudentFilter {
        query: Some("555".to_string()),
        ..StudentFilter::default()
    };
    assert_eq!(directory.list(&by_contact).len(), 1);

    let all_sections = StudentFilter {
        section: Some(String::new()),
        query: None,
    };
    assert_eq!(directory.list(&all_sections).len(), 3);
}

#[test]
fn summary_counts_shown_rows_and_their_salary() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);
    for (name, section, salary) in [("Asha", "A", "100"), ("Bilal", "B", "40.5"), ("Chen", "B", "")] {
        let mut input = draft(name, "01234567890", section);
        input.salary = salary.to_string();
        directory.create(&input).unwrap();
    }

    let section_b = StudentFilter {
        section: Some("B".to_string()),
        query: None,
    };
    let summary = directory.summary(&section_b);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.shown, 2);
    assert_eq!(summary.total_salary, 40.5);
}

#[test]
fn clear_all_removes_roster_and_restarts_counter() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);
    directory
        .create(&draft("Asha", "01234567890", "A"))
        .unwrap();
    directory
        .create(&draft("Bilal", "01234567890", "A"))
        .unwrap();

    directory.clear_all().unwrap();
    assert!(directory.list(&StudentFilter::default()).is_empty());

    let fresh = directory
        .create(&draft("Chen", "01234567890", "A"))
        .unwrap();
    assert_eq!(fresh.id, 1);
}

#[test]
fn delete_of_missing_id_reports_nothing_removed() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);
    directory
        .create(&draft("Asha", "01234567890", "A"))
        .unwrap();

    let store = SqliteStore::new(&conn);
    let before = store.get(StoreKey::Students).unwrap();
    conn.execute_batch("PRAGMA query_only = ON;").unwrap();

    // A read-only connection proves no write is attempted.
    assert!(!directory.delete(99).unwrap());

    conn.execute_batch("PRAGMA query_only = OFF;").unwrap();
    assert_eq!(store.get(StoreKey::Students).unwrap(), before);
    assert_eq!(directory.list(&StudentFilter::default()).len(), 1);
}
