pub mod analyzer;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod parser;

pub use commands::{process_folder, RunSummary};
pub use config::{load_config, ReportConfig};
pub use error::AppError;

// ─── E2E Integration Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod e2e_tests {
    use std::path::Path;

    use chrono::NaiveDate;

    use crate::commands::process_folder;
    use crate::config::ReportConfig;

    const GOOD_CSV: &str = "\
Ticket Id,Created Time,Bot Name,Mode,Status,Problem Reported,Team,Tags
1,2024-06-14 10:00:00,Alpha,Email,Closed,Printer jam,T1,x
2,2024-06-13 11:00:00,Alpha,Phone,Open,No network,T1,x
3,2024-06-10 12:00:00,Beta,Web,On Hold,-,T2,x
4,2024-05-01 09:00:00,Beta,Email,Open,Printer jam,T2,x
";

    /// Missing the Mode column: rejected before any aggregation.
    const BAD_CSV: &str = "\
Ticket Id,Created Time,Bot Name,Status
1,2024-06-14 10:00:00,Alpha,Closed
";

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn config_in(root: &Path) -> ReportConfig {
        ReportConfig {
            input_dir: root.join("input"),
            output_dir: root.join("output"),
            archive_dir: root.join("archive"),
            ..ReportConfig::default()
        }
    }

    fn setup(files: &[(&str, &str)]) -> (tempfile::TempDir, ReportConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        for (name, content) in files {
            std::fs::write(config.input_dir.join(name), content).unwrap();
        }
        (dir, config)
    }

    /// E2E: input folder → report written → input archived
    #[test]
    fn test_e2e_success_writes_report_and_archives() {
        let (_dir, config) = setup(&[("week24.csv", GOOD_CSV)]);

        let summary = process_folder(&config, Some(reference())).unwrap();

        assert_eq!(summary.files.len(), 1);
        assert_eq!(summary.failed_count(), 0);
        let outcome = &summary.files[0];
        assert_eq!(outcome.total_rows, 4);

        let report = config.output_dir.join("week24_Report.xlsx");
        assert_eq!(outcome.report_path.as_deref(), Some(report.as_path()));
        let bytes = std::fs::read(&report).unwrap();
        assert_eq!(&bytes[..2], b"PK");

        assert!(!config.input_dir.join("week24.csv").exists());
        assert!(config.archive_dir.join("week24.csv").exists());
    }

    /// E2E: a failing file is not archived and does not stop the others
    #[test]
    fn test_e2e_failed_file_is_retained() {
        let (_dir, config) = setup(&[("a_bad.csv", BAD_CSV), ("b_good.csv", GOOD_CSV)]);

        let summary = process_folder(&config, Some(reference())).unwrap();

        assert_eq!(summary.files.len(), 2);
        assert_eq!(summary.failed_count(), 1);

        let bad = &summary.files[0];
        assert_eq!(bad.file_name, "a_bad.csv");
        assert!(bad.error.as_deref().unwrap().contains("Mode"));
        assert!(bad.report_path.is_none());
        assert!(bad.archived_to.is_none());
        assert!(config.input_dir.join("a_bad.csv").exists());
        assert!(!config.archive_dir.join("a_bad.csv").exists());
        assert!(!config.output_dir.join("a_bad_Report.xlsx").exists());

        let good = &summary.files[1];
        assert!(good.succeeded());
        assert!(config.archive_dir.join("b_good.csv").exists());
    }

    #[test]
    fn test_e2e_non_csv_skipped() {
        let (_dir, config) = setup(&[("notes.txt", "hello"), ("week.csv", GOOD_CSV)]);

        let summary = process_folder(&config, Some(reference())).unwrap();

        assert_eq!(summary.skipped_files, vec!["notes.txt".to_string()]);
        assert_eq!(summary.files.len(), 1);
        assert!(config.input_dir.join("notes.txt").exists());
    }

    /// Same input and reference date → same tables
    #[test]
    fn test_e2e_idempotent_tables() {
        let (dir, config) = setup(&[("week.csv", GOOD_CSV)]);
        let path = config.input_dir.join("week.csv");

        let first = crate::commands::process_file(&path, &config, reference()).unwrap();
        let second = crate::commands::process_file(&path, &config, reference()).unwrap();
        assert_eq!(first.tables, second.tables);

        let closed = &first.tables.sections["Total Closed Tickets (Current Week)"];
        assert_eq!(closed["Alpha"], 1);
        assert_eq!(closed["Beta"], 0);
        assert_eq!(first.tables.sections["Total Archive Open Tickets"]["Beta"], 1);
        drop(dir);
    }

    #[test]
    fn test_e2e_summary_serializes_camel_case() {
        let (_dir, config) = setup(&[("week.csv", GOOD_CSV)]);
        let summary = process_folder(&config, Some(reference())).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["referenceDate"], "2024-06-15");
        assert_eq!(json["files"][0]["fileName"], "week.csv");
        assert!(json["files"][0]["error"].is_null());

        let tables = &json["files"][0]["tables"];
        assert_eq!(tables["received"]["Alpha_Email"], 1);
        assert_eq!(tables["received"]["Beta_Email"], 0);
        assert_eq!(tables["statusByMode"]["Open"]["total_Open_ticket_Alpha_Phone"], 1);
        assert_eq!(tables["statusByMode"]["Closed"]["total_Closed_ticket_Alpha_Email"], 1);
    }

    #[test]
    fn test_e2e_failed_file_has_no_tables() {
        let (_dir, config) = setup(&[("broken.csv", BAD_CSV)]);
        let summary = process_folder(&config, Some(reference())).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["files"][0].get("tables").is_none());
    }
}
