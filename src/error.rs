use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid configuration file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("File is empty or has no data rows")]
    EmptyFile,

    #[error("Invalid folder path: {}", .0.display())]
    InvalidFolder(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("{0}")]
    Custom(String),
}

impl AppError {
    pub fn missing_column(name: &str) -> Self {
        AppError::MissingColumns(vec![name.to_string()])
    }
}
