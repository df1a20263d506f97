//! Plain-text table rendering for roster, totals and day views.

use rollcall_core::{DayEntry, RosterSummary, Student, TotalsRow};
use std::io::{self, Write};

const UNSET_MARK: &str = "\u{2014}";

/// Roster table with the summary line underneath.
pub fn roster(out: &mut impl Write, students: &[Student], summary: &RosterSummary) -> io::Result<()> {
    if students.is_empty() {
        writeln!(out, "No students found.")?;
    } else {
        let rows: Vec<Vec<String>> = students
            .iter()
            .map(|student| {
                vec![
                    student.id.to_string(),
                    student.name.clone(),
                    student.contact.clone(),
                    student.section.clone(),
                    student.salary.to_string(),
                    student.joining_date.to_string(),
                ]
            })
            .collect();
        table(
            out,
            &["ID", "Name", "Contact", "Section", "Salary", "Joining Date"],
            &rows,
        )?;
    }
    writeln!(
        out,
        "Total students: {} | Showing: {} | Total salary (shown): {}",
        summary.total, summary.shown, summary.total_salary
    )
}

/// Lifetime totals per roster student.
pub fn totals(out: &mut impl Write, rows: &[TotalsRow]) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "No Students Found");
    }
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.position.to_string(),
                row.student.name.clone(),
                row.student.id.to_string(),
                row.totals.total().to_string(),
                row.totals.present.to_string(),
                row.totals.absent.to_string(),
            ]
        })
        .collect();
    table(out, &["#", "Name", "ID", "Total", "Present", "Absent"], &rows)
}

/// Marks of one date; unmarked students show a neutral placeholder.
pub fn day(out: &mut impl Write, date: &str, entries: &[DayEntry]) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "No Student Found.");
    }
    writeln!(out, "Attendance for {date}")?;
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                entry.position.to_string(),
                entry.student.name.clone(),
                entry.student.id.to_string(),
                entry
                    .status
                    .map_or(UNSET_MARK, |status| status.label())
                    .to_string(),
            ]
        })
        .collect();
    table(out, &["#", "Name", "ID", "Status"], &rows)
}

fn table(out: &mut impl Write, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header_cells: Vec<String> = headers.iter().map(|header| header.to_string()).collect();
    write_row(out, &widths, &header_cells)?;
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    write_row(out, &widths, &rule)?;
    for row in rows {
        write_row(out, &widths, row)?;
    }
    Ok(())
}

fn write_row(out: &mut impl Write, widths: &[usize], cells: &[String]) -> io::Result<()> {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    writeln!(out, "{}", padded.join("  ").trim_end())
}
