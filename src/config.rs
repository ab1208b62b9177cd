use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::parser::columns::{BOT_NAME, PROBLEM_REPORTED};

/// Upper bound on `window_days`: a century of history.
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Columns dropped from every export before analysis.
const DEFAULT_COLUMNS_TO_REMOVE: &[&str] = &[
    "Hardware ID/Serial Number",
    "Child Ticket Count",
    "Similar issue Count",
    "State Name",
    "UDISE_Code",
    "Block_Name",
    "School_Code",
    "School_Name",
    "ICT-Reported-Problems",
    "Infra-Status",
    "NIC Code",
    "Server A or B",
    "Block",
    "UDISE Code",
    "Block Name",
    "District Names",
    "Admin Code/School Code",
    "Project Code",
    "Project Name",
    "Partner Name",
    "Device Model Number",
    "School Name",
    "District",
    "FMS Email",
    "Reason for On-Hold",
    "Select Your Issue",
    "Steps Performed",
    "Actual Problem",
    "Classification",
    "Time to Respond",
    "Team",
    "Team Id",
    "Tags",
    "Ticket On Hold Time",
    "Category",
    "Sub Category",
    "Resolution",
    "To Address",
    "Account Name",
    "Account Id",
    "Due Date",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    pub delimiter: char,
    /// Size of the "current week" window in days.
    pub window_days: i64,
    pub columns_to_remove: Vec<String>,
    /// Column name → replacement for null, "nan" and "-" cells.
    pub imputation_values: IndexMap<String, String>,
    /// One bot-total section per status over the current window.
    pub current_week_statuses: Vec<String>,
    /// One bot-total section per status over the archive window.
    pub archive_statuses: Vec<String>,
    pub include_problem_sheet: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let mut imputation_values = IndexMap::new();
        imputation_values.insert(PROBLEM_REPORTED.to_string(), "Problem not found".to_string());
        imputation_values.insert(BOT_NAME.to_string(), "Unidentified Bot Name".to_string());

        ReportConfig {
            input_dir: PathBuf::from("data/input"),
            output_dir: PathBuf::from("data/output"),
            archive_dir: PathBuf::from("data/archive"),
            log_file: None,
            delimiter: ',',
            window_days: 8,
            columns_to_remove: DEFAULT_COLUMNS_TO_REMOVE
                .iter()
                .map(|c| c.to_string())
                .collect(),
            imputation_values,
            current_week_statuses: vec!["Closed".into(), "Open".into(), "On Hold".into()],
            archive_statuses: vec!["Open".into()],
            include_problem_sheet: true,
        }
    }
}

impl ReportConfig {
    /// The delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8, AppError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(AppError::InvalidConfig(format!(
                "delimiter must be an ASCII character, got {:?}",
                self.delimiter
            )))
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.delimiter_byte()?;
        if !(0..=MAX_WINDOW_DAYS).contains(&self.window_days) {
            return Err(AppError::InvalidConfig(format!(
                "window_days must be between 0 and {}, got {}",
                MAX_WINDOW_DAYS, self.window_days
            )));
        }
        if self.current_week_statuses.is_empty() {
            return Err(AppError::InvalidConfig(
                "current_week_statuses must not be empty".to_string(),
            ));
        }
        if self.archive_statuses.is_empty() {
            return Err(AppError::InvalidConfig(
                "archive_statuses must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads the configuration from a TOML file, or the defaults when `path` is None.
/// Keys absent from the file keep their default value.
pub fn load_config(path: Option<&Path>) -> Result<ReportConfig, AppError> {
    let config = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)?;
            toml::from_str::<ReportConfig>(&text)?
        }
        None => ReportConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
