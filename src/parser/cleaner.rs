use indexmap::IndexMap;

use crate::error::AppError;
use crate::parser::columns::{CREATED_TIME, TICKET_CREATION_DATE, TICKET_CREATION_TIME};
use crate::parser::deserializers::split_created_time;
use crate::parser::types::{CellValue, RecordSet};

/// Text values treated as missing during imputation.
const NULL_MARKERS: &[&str] = &["nan", "-"];

/// Drops the listed columns. Names absent from the export are only logged.
pub fn remove_columns(records: &mut RecordSet, columns: &[String]) {
    let missing = records.drop_columns(columns);
    if !missing.is_empty() {
        log::warn!(
            "{} column(s) not found and not removed: {:?}",
            missing.len(),
            missing
        );
    }
    log::debug!("Removed columns, {} remaining", records.headers().len());
}

/// Splits `Created Time` into `Ticket Creation Date` and `Ticket Creation Time`.
/// Unparseable halves become `Null`.
pub fn split_timestamp(records: &mut RecordSet) -> Result<(), AppError> {
    let idx = records
        .column_index(CREATED_TIME)
        .ok_or_else(|| AppError::missing_column(CREATED_TIME))?;

    let mut dates = Vec::with_capacity(records.len());
    let mut times = Vec::with_capacity(records.len());
    let mut unparsed = 0usize;

    for row in records.rows() {
        let (date, time) = match &row[idx] {
            CellValue::Text(s) => split_created_time(s),
            _ => (None, None),
        };
        if date.is_none() {
            unparsed += 1;
        }
        dates.push(date.map_or(CellValue::Null, CellValue::Date));
        times.push(time.map_or(CellValue::Null, CellValue::Time));
    }

    records.set_column(TICKET_CREATION_DATE, dates);
    records.set_column(TICKET_CREATION_TIME, times);

    if unparsed > 0 {
        log::warn!("{} row(s) have an unparseable '{}' date", unparsed, CREATED_TIME);
    }
    log::info!("Split '{}' into date and time columns", CREATED_TIME);
    Ok(())
}

/// Fills null, "nan" and "-" cells of each mapped column with its replacement.
/// Columns absent from the export are skipped with a warning.
pub fn impute_null_values(records: &mut RecordSet, imputation_values: &IndexMap<String, String>) {
    for (column, replacement) in imputation_values {
        let Some(cells) = records.column_cells_mut(column) else {
            log::warn!("Column '{}' not found, skipping imputation", column);
            continue;
        };

        let mut filled = 0usize;
        for cell in cells {
            let is_missing = match cell {
                CellValue::Null => true,
                CellValue::Text(s) => NULL_MARKERS.contains(&s.as_str()),
                _ => false,
            };
            if is_missing {
                *cell = CellValue::Text(replacement.clone());
                filled += 1;
            }
        }
        log::info!(
            "Imputed {} null value(s) in column '{}' with '{}'",
            filled,
            column,
            replacement
        );
    }
}
