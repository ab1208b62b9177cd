use chrono::{NaiveDate, NaiveTime};

use crate::error::AppError;

/// Accepted date layouts, tried in order. Slash dates are read month-first
/// and only fall back to day-first when that fails.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
];

const TIME_FMT: &str = "%H:%M:%S";

/// Parse the date half of a `Created Time` value.
/// Returns None for empty or unparseable strings.
pub fn parse_ticket_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Parse the time half of a `Created Time` value ("16:24:05").
pub fn parse_ticket_time(s: &str) -> Option<NaiveTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(trimmed, TIME_FMT).ok()
}

/// "2024-06-15 10:30:00" → (Some(date), Some(time)).
/// Splits on the first space; either half is None when missing or invalid.
pub fn split_created_time(s: &str) -> (Option<NaiveDate>, Option<NaiveTime>) {
    let trimmed = s.trim();
    match trimmed.split_once(' ') {
        Some((date, time)) => (parse_ticket_date(date), parse_ticket_time(time)),
        None => (parse_ticket_date(trimmed), None),
    }
}

/// Strict ISO parse for dates given on the command line.
pub fn parse_reference_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| AppError::InvalidDate(format!("{:?}: {}", s, e)))
}
