use std::io::Read;
use std::path::Path;
use std::time::Instant;

use crate::config::ReportConfig;
use crate::error::AppError;
use crate::parser::cleaner::{impute_null_values, remove_columns, split_timestamp};
use crate::parser::columns::check_ticket_columns;
use crate::parser::types::{CellValue, ParseWarning, RecordSet};

/// Output of `parse_csv`: the raw record set plus load metadata.
#[derive(Debug)]
pub struct ParseOutput {
    pub records: RecordSet,
    pub warnings: Vec<ParseWarning>,
    pub total_rows_processed: usize,
    pub skipped_rows: usize,
    pub detected_columns: Vec<String>,
    pub missing_optional_columns: Vec<String>,
    pub parse_duration_ms: u64,
}

/// Parse a ticket export from `path`.
pub fn parse_csv(path: &Path, delimiter: u8) -> Result<ParseOutput, AppError> {
    let file = std::fs::File::open(path)?;
    parse_csv_reader(std::io::BufReader::new(file), delimiter)
}

/// Core loading logic. Accepts any `Read` source, useful for tests.
pub fn parse_csv_reader<R: Read>(reader: R, delimiter: u8) -> Result<ParseOutput, AppError> {
    let start = Instant::now();

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .double_quote(true)
        .quoting(true)
        .from_reader(reader);

    // Phase 1: validate columns
    let headers = rdr.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::EmptyFile);
    }
    let mut records = RecordSet::new(headers.iter().map(|h| h.trim().to_string()).collect());
    let missing_optional_columns = check_ticket_columns(&records)?;

    // Phase 2: load records
    let mut warnings: Vec<ParseWarning> = Vec::new();
    let mut skipped = 0usize;
    let mut row_idx = 0usize;

    for result in rdr.records() {
        row_idx += 1;
        match result {
            Ok(record) => {
                if record.len() > headers.len() {
                    warnings.push(ParseWarning {
                        line: row_idx + 1, // +1 for the header row
                        message: format!(
                            "{} fields for {} columns, extra fields ignored",
                            record.len(),
                            headers.len()
                        ),
                    });
                }
                records.push_row(record.iter().map(CellValue::from_field).collect());
            }
            Err(err) => {
                warnings.push(ParseWarning {
                    line: row_idx + 1,
                    message: err.to_string(),
                });
                skipped += 1;
            }
        }
    }

    if row_idx == 0 {
        return Err(AppError::EmptyFile);
    }
    for w in &warnings {
        log::warn!("Line {}: {}", w.line, w.message);
    }

    Ok(ParseOutput {
        warnings,
        total_rows_processed: row_idx,
        skipped_rows: skipped,
        detected_columns: records.headers().to_vec(),
        missing_optional_columns,
        parse_duration_ms: start.elapsed().as_millis() as u64,
        records,
    })
}

/// Column projection, timestamp split and null imputation, in that order.
pub fn clean_records(mut records: RecordSet, config: &ReportConfig) -> Result<RecordSet, AppError> {
    remove_columns(&mut records, &config.columns_to_remove);
    split_timestamp(&mut records)?;
    impute_null_values(&mut records, &config.imputation_values);
    Ok(records)
}
