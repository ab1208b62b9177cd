use chrono::{Days, Local, NaiveDate};

use crate::error::AppError;
use crate::parser::deserializers::parse_ticket_date;
use crate::parser::types::{CellValue, RecordSet};

/// Result of splitting a record set around `cutoff`.
/// `recent`, `archive` and `undated` are disjoint and together hold every input row.
#[derive(Debug, Clone)]
pub struct WindowSplit {
    pub cutoff: NaiveDate,
    pub recent: RecordSet,
    pub archive: RecordSet,
    /// Rows whose date is null or unparseable; compared against no cutoff.
    pub undated: RecordSet,
}

fn cell_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => parse_ticket_date(s),
        _ => None,
    }
}

/// First day of the recent window: `reference - window_days`.
pub fn window_cutoff(reference: NaiveDate, window_days: i64) -> Result<NaiveDate, AppError> {
    u64::try_from(window_days)
        .ok()
        .and_then(|days| reference.checked_sub_days(Days::new(days)))
        .ok_or_else(|| {
            AppError::InvalidConfig(format!(
                "window of {} days before {} is out of the calendar range",
                window_days, reference
            ))
        })
}

/// Splits `records` into rows dated on/after the cutoff and rows dated before it.
/// `reference` defaults to today's local date. Row order is preserved.
pub fn split_by_window(
    records: &RecordSet,
    date_column: &str,
    reference: Option<NaiveDate>,
    window_days: i64,
) -> Result<WindowSplit, AppError> {
    let idx = records
        .column_index(date_column)
        .ok_or_else(|| AppError::missing_column(date_column))?;
    let reference = reference.unwrap_or_else(|| Local::now().date_naive());
    let cutoff = window_cutoff(reference, window_days)?;

    let mut recent = records.empty_like();
    let mut archive = records.empty_like();
    let mut undated = records.empty_like();

    for row in records.rows() {
        match cell_date(&row[idx]) {
            Some(d) if d >= cutoff => recent.push_row(row.clone()),
            Some(_) => archive.push_row(row.clone()),
            None => undated.push_row(row.clone()),
        }
    }

    if !undated.is_empty() {
        log::warn!(
            "{} row(s) without a valid '{}' excluded from both windows",
            undated.len(),
            date_column
        );
    }
    log::info!(
        "Window cutoff {}: {} recent, {} archive",
        cutoff,
        recent.len(),
        archive.len()
    );

    Ok(WindowSplit {
        cutoff,
        recent,
        archive,
        undated,
    })
}

/// Rows dated within the last `window_days` days of `reference`.
pub fn filter_recent(
    records: &RecordSet,
    date_column: &str,
    reference: Option<NaiveDate>,
    window_days: i64,
) -> Result<RecordSet, AppError> {
    split_by_window(records, date_column, reference, window_days).map(|s| s.recent)
}

/// Rows dated strictly before the recent window.
pub fn filter_archive(
    records: &RecordSet,
    date_column: &str,
    reference: Option<NaiveDate>,
    window_days: i64,
) -> Result<RecordSet, AppError> {
    split_by_window(records, date_column, reference, window_days).map(|s| s.archive)
}
