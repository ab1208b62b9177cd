use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};

use crate::analyzer::counting::NestedCountTable;
use crate::analyzer::ReportTables;
use crate::error::AppError;
use crate::export::{create_header_format, create_integer_format, create_title_format};

pub const REPORT_SHEET: &str = "Report";
pub const PROBLEM_SHEET: &str = "Problem Reported Details";
pub const PIVOT_TITLE: &str = "Total Tickets Received (Current Week Mode wise)";

/// Builds the workbook:
/// - "Report": mode-wise pivot, then one Bot Name / Ticket Count table per section
/// - "Problem Reported Details": problem × bot counts, when requested and non-empty
pub fn generate_ticket_report(
    tables: &ReportTables,
    include_problems: bool,
) -> Result<Vec<u8>, AppError> {
    let mut wb = Workbook::new();
    write_report_sheet(&mut wb, tables)?;
    if include_problems && !tables.problems.is_empty() {
        write_problem_sheet(&mut wb, &tables.problems)?;
    }
    Ok(wb.save_to_buffer()?)
}

/// Writes the report to `path`, creating the parent folder if needed.
pub fn write_ticket_report(
    path: &Path,
    tables: &ReportTables,
    include_problems: bool,
) -> Result<(), AppError> {
    let bytes = generate_ticket_report(tables, include_problems)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    log::info!("Excel report saved to {}", path.display());
    Ok(())
}

/// Worksheet column of the `i`-th value column (column 0 holds the labels).
fn sheet_col(i: usize) -> Result<u16, AppError> {
    i.checked_add(1)
        .and_then(|c| u16::try_from(c).ok())
        .ok_or_else(|| AppError::Custom(format!("Too many report columns: {}", i)))
}

fn sheet_row(i: usize) -> Result<u32, AppError> {
    u32::try_from(i).map_err(|_| AppError::Custom(format!("Too many report rows: {}", i)))
}

/// Bots in first-seen order across all modes of the pivot.
fn pivot_bots(mode_wise: &NestedCountTable) -> Vec<&str> {
    let mut bots: Vec<&str> = Vec::new();
    for inner in mode_wise.values() {
        for bot in inner.keys() {
            if !bots.contains(&bot.as_str()) {
                bots.push(bot.as_str());
            }
        }
    }
    bots
}

// ── Sheet 1: Report ──────────────────────────────────────────────────────────

fn write_report_sheet(wb: &mut Workbook, tables: &ReportTables) -> Result<(), AppError> {
    let ws = wb.add_worksheet();
    ws.set_name(REPORT_SHEET)?;

    let title = create_title_format();
    let hdr = create_header_format();
    let int = create_integer_format();

    // Part 1: mode-wise pivot
    let mut row: u32 = 0;
    ws.write_with_format(row, 0, PIVOT_TITLE, &title)?;
    row += 1;

    ws.write_with_format(row, 0, "Bot Name", &hdr)?;
    for (col, mode) in tables.mode_wise.keys().enumerate() {
        ws.write_with_format(row, sheet_col(col)?, mode.as_str(), &hdr)?;
    }
    row += 1;

    for bot in pivot_bots(&tables.mode_wise) {
        ws.write(row, 0, bot)?;
        for (col, counts) in tables.mode_wise.values().enumerate() {
            let count = counts.get(bot).copied().unwrap_or(0);
            ws.write_with_format(row, sheet_col(col)?, count as f64, &int)?;
        }
        row += 1;
    }
    row += 1;

    // Part 2: one table per section
    for (name, counts) in &tables.sections {
        row = write_section(ws, row, name, counts.iter())?;
    }

    ws.set_column_width(0, 28)?;
    for col in 1..=sheet_col(tables.mode_wise.len().saturating_sub(1))? {
        ws.set_column_width(col, 14)?;
    }

    Ok(())
}

/// Writes title, header and rows starting at `row`; returns the next free row
/// after a blank separator.
fn write_section<'a>(
    ws: &mut Worksheet,
    mut row: u32,
    name: &str,
    counts: impl Iterator<Item = (&'a String, &'a usize)>,
) -> Result<u32, AppError> {
    let title = create_title_format();
    let hdr = create_header_format();
    let int = create_integer_format();

    ws.write_with_format(row, 0, name, &title)?;
    row += 1;
    ws.write_with_format(row, 0, "Bot Name", &hdr)?;
    ws.write_with_format(row, 1, "Ticket Count", &hdr)?;
    row += 1;

    for (bot, count) in counts {
        ws.write(row, 0, bot.as_str())?;
        ws.write_with_format(row, 1, *count as f64, &int)?;
        row += 1;
    }
    Ok(row + 1)
}

// ── Sheet 2: Problem Reported Details ────────────────────────────────────────

fn write_problem_sheet(wb: &mut Workbook, problems: &NestedCountTable) -> Result<(), AppError> {
    let ws = wb.add_worksheet();
    ws.set_name(PROBLEM_SHEET)?;

    let hdr = create_header_format();
    let int = create_integer_format();
    let bots = pivot_bots(problems);

    ws.write_with_format(0, 0, "Problem Reported", &hdr)?;
    for (col, bot) in bots.iter().enumerate() {
        ws.write_with_format(0, sheet_col(col)?, *bot, &hdr)?;
    }

    for (i, (problem, counts)) in problems.iter().enumerate() {
        let row = sheet_row(i + 1)?;
        ws.write(row, 0, problem.as_str())?;
        for (col, bot) in bots.iter().enumerate() {
            let count = counts.get(*bot).copied().unwrap_or(0);
            ws.write_with_format(row, sheet_col(col)?, count as f64, &int)?;
        }
    }

    ws.set_freeze_panes(1, 1)?;
    ws.set_column_width(0, 40)?;

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::counting::CountTable;
    use crate::analyzer::WindowSummary;
    use chrono::NaiveDate;
    use indexmap::IndexMap;

    fn counts(pairs: &[(&str, usize)]) -> CountTable {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn make_tables(with_problems: bool) -> ReportTables {
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let mut mode_wise = NestedCountTable::new();
        mode_wise.insert("Email".into(), counts(&[("Alpha", 3), ("Beta", 0)]));
        mode_wise.insert("Phone".into(), counts(&[("Alpha", 1), ("Beta", 2)]));

        let mut sections = IndexMap::new();
        sections.insert(
            "Total Closed Tickets (Current Week)".to_string(),
            counts(&[("Alpha", 2), ("Beta", 1)]),
        );
        sections.insert("Total Archive Open Tickets".to_string(), counts(&[("Alpha", 0), ("Beta", 5)]));

        let mut problems = NestedCountTable::new();
        if with_problems {
            problems.insert("printer jam".into(), counts(&[("Alpha", 2), ("Beta", 0)]));
        }

        ReportTables {
            bots: vec!["Alpha".into(), "Beta".into()],
            modes: vec!["Email".into(), "Phone".into()],
            mode_wise,
            received: CountTable::new(),
            status_by_mode: IndexMap::new(),
            sections,
            problems,
            window: WindowSummary {
                reference: day,
                cutoff: day,
                recent_rows: 6,
                archive_rows: 5,
                undated_rows: 0,
            },
        }
    }

    fn assert_xlsx(bytes: &[u8]) {
        assert!(bytes.len() > 4, "XLSX too small");
        assert_eq!(bytes[0], 0x50, "Expected PK byte 0");
        assert_eq!(bytes[1], 0x4B, "Expected PK byte 1");
    }

    #[test]
    fn test_generate_ticket_report_xlsx_signature() {
        let result = generate_ticket_report(&make_tables(true), true);
        assert!(result.is_ok(), "generate_ticket_report failed: {:?}", result.err());
        assert_xlsx(&result.unwrap());
    }

    #[test]
    fn test_generate_without_problem_sheet() {
        let bytes = generate_ticket_report(&make_tables(false), true).unwrap();
        assert_xlsx(&bytes);
    }

    #[test]
    fn test_generate_with_no_modes() {
        let mut tables = make_tables(false);
        tables.mode_wise.clear();
        tables.sections.clear();
        let bytes = generate_ticket_report(&tables, false).unwrap();
        assert_xlsx(&bytes);
    }

    #[test]
    fn test_sheet_col_bounds() {
        assert_eq!(sheet_col(0).unwrap(), 1);
        assert_eq!(sheet_col(usize::from(u16::MAX) - 1).unwrap(), u16::MAX);
        assert!(matches!(sheet_col(usize::from(u16::MAX)), Err(AppError::Custom(_))));
        assert!(sheet_col(usize::MAX).is_err());
    }

    #[test]
    fn test_too_many_modes_is_error_not_panic() {
        let mut tables = make_tables(false);
        for i in 0..=usize::from(u16::MAX) {
            tables
                .mode_wise
                .insert(format!("Mode {}", i), counts(&[("Alpha", 1)]));
        }
        assert!(generate_ticket_report(&tables, false).is_err());
    }

    #[test]
    fn test_pivot_bots_union_in_order() {
        let mut mode_wise = NestedCountTable::new();
        mode_wise.insert("Email".into(), counts(&[("Alpha", 1)]));
        mode_wise.insert("Web".into(), counts(&[("Beta", 1), ("Alpha", 0)]));
        assert_eq!(pivot_bots(&mode_wise), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_write_ticket_report_creates_folder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("Report.xlsx");
        write_ticket_report(&path, &make_tables(true), true).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_xlsx(&bytes);
    }
}
