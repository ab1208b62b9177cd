use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::analyzer::{build_report_tables, ReportTables};
use crate::config::ReportConfig;
use crate::error::AppError;
use crate::export::write_ticket_report;
use crate::parser::{clean_records, parse_csv};

/// What one file produced before archiving.
#[derive(Debug)]
pub struct FileReport {
    pub tables: ReportTables,
    pub report_path: PathBuf,
    pub total_rows: usize,
    pub skipped_rows: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub file_name: String,
    pub report_path: Option<PathBuf>,
    pub archived_to: Option<PathBuf>,
    pub total_rows: usize,
    pub skipped_rows: usize,
    pub warnings: usize,
    pub error: Option<String>,
    pub duration_ms: u64,
    /// Count tables behind the report, for the JSON summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<ReportTables>,
}

impl FileOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub reference_date: NaiveDate,
    pub files: Vec<FileOutcome>,
    pub skipped_files: Vec<String>,
}

impl RunSummary {
    pub fn failed_count(&self) -> usize {
        self.files.iter().filter(|f| !f.succeeded()).count()
    }
}

fn is_csv(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// `<output_dir>/<stem>_Report.xlsx`
pub fn report_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("tickets");
    output_dir.join(format!("{}_Report.xlsx", stem))
}

/// Load, clean, aggregate and render one export. Does not move the input.
pub fn process_file(
    path: &Path,
    config: &ReportConfig,
    reference: NaiveDate,
) -> Result<FileReport, AppError> {
    let parsed = parse_csv(path, config.delimiter_byte()?)?;
    log::info!(
        "Loaded {} with {} rows ({} skipped) in {} ms",
        path.display(),
        parsed.total_rows_processed,
        parsed.skipped_rows,
        parsed.parse_duration_ms
    );
    if !parsed.missing_optional_columns.is_empty() {
        log::warn!(
            "Optional column(s) absent: {}",
            parsed.missing_optional_columns.join(", ")
        );
    }

    let records = clean_records(parsed.records, config)?;
    let tables = build_report_tables(&records, config, reference)?;

    let report_path = report_path_for(path, &config.output_dir);
    write_ticket_report(&report_path, &tables, config.include_problem_sheet)?;

    Ok(FileReport {
        tables,
        report_path,
        total_rows: parsed.total_rows_processed,
        skipped_rows: parsed.skipped_rows,
        warnings: parsed.warnings.len(),
    })
}

/// Moves `path` into `archive_dir`. An existing file of the same name is kept;
/// the moved file then gets a numeric suffix.
pub fn archive_file(path: &Path, archive_dir: &Path) -> Result<PathBuf, AppError> {
    std::fs::create_dir_all(archive_dir)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| AppError::Custom(format!("Not a file path: {}", path.display())))?;

    let mut target = archive_dir.join(file_name);
    let mut n = 1;
    while target.exists() {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("csv");
        target = archive_dir.join(format!("{}_{}.{}", stem, n, ext));
        n += 1;
    }

    if std::fs::rename(path, &target).is_err() {
        // rename fails across filesystems
        std::fs::copy(path, &target)?;
        std::fs::remove_file(path)?;
    }
    Ok(target)
}

/// Processes every CSV file of `config.input_dir`, one after the other.
///
/// A file is archived only once its report has been written; a failed file
/// stays in the input folder so the next run retries it.
pub fn process_folder(
    config: &ReportConfig,
    reference: Option<NaiveDate>,
) -> Result<RunSummary, AppError> {
    let input_dir = &config.input_dir;
    if !input_dir.is_dir() {
        return Err(AppError::InvalidFolder(input_dir.clone()));
    }
    let reference = reference.unwrap_or_else(|| Local::now().date_naive());

    let mut entries: Vec<PathBuf> = std::fs::read_dir(input_dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    let mut files = Vec::new();
    let mut skipped_files = Vec::new();

    for path in entries {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !is_csv(&path) {
            log::info!("Skipping non-CSV entry: {}", file_name);
            skipped_files.push(file_name);
            continue;
        }

        log::info!("Processing file: {}", file_name);
        let start = Instant::now();
        let mut outcome = FileOutcome {
            file_name: file_name.clone(),
            report_path: None,
            archived_to: None,
            total_rows: 0,
            skipped_rows: 0,
            warnings: 0,
            error: None,
            duration_ms: 0,
            tables: None,
        };

        match process_file(&path, config, reference) {
            Ok(report) => {
                outcome.report_path = Some(report.report_path);
                outcome.total_rows = report.total_rows;
                outcome.skipped_rows = report.skipped_rows;
                outcome.warnings = report.warnings;
                outcome.tables = Some(report.tables);

                match archive_file(&path, &config.archive_dir) {
                    Ok(target) => {
                        log::info!("Moved {} to archive: {}", file_name, target.display());
                        outcome.archived_to = Some(target);
                    }
                    Err(e) => {
                        log::error!("Failed to archive {}: {}", file_name, e);
                        outcome.error = Some(e.to_string());
                    }
                }
            }
            Err(e) => {
                log::error!("Failed to process {}: {} (left in place)", file_name, e);
                outcome.error = Some(e.to_string());
            }
        }

        outcome.duration_ms = start.elapsed().as_millis() as u64;
        files.push(outcome);
    }

    Ok(RunSummary {
        reference_date: reference,
        files,
        skipped_files,
    })
}
