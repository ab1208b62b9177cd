use crate::error::AppError;
use crate::parser::types::RecordSet;

pub const CREATED_TIME: &str = "Created Time";
pub const BOT_NAME: &str = "Bot Name";
pub const MODE: &str = "Mode";
pub const STATUS: &str = "Status";
pub const PROBLEM_REPORTED: &str = "Problem Reported";
pub const TICKET_CREATION_DATE: &str = "Ticket Creation Date";
pub const TICKET_CREATION_TIME: &str = "Ticket Creation Time";

/// A file missing any of these is rejected before aggregation.
const REQUIRED: &[&str] = &[CREATED_TIME, BOT_NAME, MODE, STATUS];

/// Absent ones are reported, never fatal.
const OPTIONAL: &[&str] = &[PROBLEM_REPORTED];

fn absent(records: &RecordSet, columns: &[&str]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| !records.has_column(c))
        .map(|c| c.to_string())
        .collect()
}

/// Checks the ticket columns of a freshly loaded export.
/// Returns the missing optional columns, or `MissingColumns` listing every
/// missing required one.
pub fn check_ticket_columns(records: &RecordSet) -> Result<Vec<String>, AppError> {
    let missing = absent(records, REQUIRED);
    if !missing.is_empty() {
        return Err(AppError::MissingColumns(missing));
    }
    Ok(absent(records, OPTIONAL))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cols: &[&str]) -> RecordSet {
        RecordSet::new(cols.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_all_columns_present() {
        let rs = headers(&[
            "Ticket Id",
            "Created Time",
            "Bot Name",
            "Mode",
            "Status",
            "Problem Reported",
        ]);
        assert!(check_ticket_columns(&rs).unwrap().is_empty());
    }

    #[test]
    fn test_missing_required_lists_all_in_order() {
        match check_ticket_columns(&headers(&["Bot Name", "Status"])) {
            Err(AppError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["Created Time".to_string(), "Mode".to_string()]);
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_optional_is_reported() {
        let rs = headers(&["Created Time", "Bot Name", "Mode", "Status"]);
        assert_eq!(check_ticket_columns(&rs).unwrap(), vec!["Problem Reported".to_string()]);
    }
}
