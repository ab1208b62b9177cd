use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use helpdesk_report::commands::RunSummary;
use helpdesk_report::config::{load_config, ReportConfig};
use helpdesk_report::error::AppError;
use helpdesk_report::parser::deserializers::parse_reference_date;
use helpdesk_report::process_folder;

#[derive(Parser, Debug)]
#[command(
    name = "helpdesk-report",
    version,
    about = "Builds weekly per-bot ticket reports from helpdesk CSV exports"
)]
struct Args {
    /// TOML configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
    /// Folder scanned for CSV exports
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,
    /// Folder receiving the .xlsx reports
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
    /// Folder receiving processed exports
    #[arg(long, short = 'a')]
    archive: Option<PathBuf>,
    /// Reference date (YYYY-MM-DD) for the current window; defaults to today
    #[arg(long, short = 'd')]
    reference_date: Option<String>,
    #[arg(long)]
    window_days: Option<i64>,
    /// Append log output to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
    #[arg(long, short = 'q', default_value_t = false)]
    quiet: bool,
    /// Print the run summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn apply_args(args: &Args, config: &mut ReportConfig) {
    if let Some(p) = &args.input {
        config.input_dir = p.clone();
    }
    if let Some(p) = &args.output {
        config.output_dir = p.clone();
    }
    if let Some(p) = &args.archive {
        config.archive_dir = p.clone();
    }
    if let Some(days) = args.window_days {
        config.window_days = days;
    }
    if let Some(p) = &args.log_file {
        config.log_file = Some(p.clone());
    }
}

fn init_logging(args: &Args, log_file: Option<&Path>) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if args.verbose > 0 {
        let f = if args.verbose >= 2 { log::LevelFilter::Trace } else { log::LevelFilter::Debug };
        builder.filter_level(f);
    }
    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Failed to create log directory {}: {}", parent.display(), e);
            }
        }
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => {
                builder.format(|buf, record| {
                    use std::io::Write;
                    let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                    writeln!(buf, "{} - {} - {}", ts, record.level(), record.args())
                });
                builder.target(env_logger::Target::Pipe(Box::new(f)));
            }
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", path.display(), e);
            }
        }
    }
    builder.init();
}

fn print_summary(summary: &RunSummary) {
    println!("Reference date: {}", summary.reference_date);
    for f in &summary.files {
        match (&f.error, &f.report_path) {
            (None, Some(report)) => println!("  ok     {} -> {}", f.file_name, report.display()),
            (Some(e), _) => println!("  FAILED {}: {}", f.file_name, e),
            (None, None) => println!("  ?      {}", f.file_name),
        }
    }
    if !summary.skipped_files.is_empty() {
        println!("Skipped {} non-CSV entr(ies)", summary.skipped_files.len());
    }
    println!(
        "{} file(s) processed, {} failed",
        summary.files.len(),
        summary.failed_count()
    );
}

/// `--log-file` wins; otherwise the file named by a successfully loaded config.
fn resolve_log_file(args: &Args, loaded: &Result<ReportConfig, AppError>) -> Option<PathBuf> {
    args.log_file
        .clone()
        .or_else(|| loaded.as_ref().ok().and_then(|c| c.log_file.clone()))
}

fn print_json(summary: &RunSummary) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

fn run(args: &Args) -> Result<RunSummary, AppError> {
    let loaded = load_config(args.config.as_deref()).and_then(|mut config| {
        apply_args(args, &mut config);
        config.validate()?;
        Ok(config)
    });
    // The logger must be installed before anything is logged, including a config error.
    init_logging(args, resolve_log_file(args, &loaded).as_deref());

    let config = loaded?;
    match &args.config {
        Some(p) => log::info!("Loaded configuration from {}", p.display()),
        None => log::info!("Using default configuration"),
    }
    let reference = args
        .reference_date
        .as_deref()
        .map(parse_reference_date)
        .transpose()?;

    log::info!("Processing folder {}", config.input_dir.display());

    process_folder(&config, reference)
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(summary) => {
            if args.json {
                if let Err(e) = print_json(&summary) {
                    eprintln!("Error: {}", e);
                    log::error!("{}", e);
                    return ExitCode::from(2);
                }
            } else if !args.quiet {
                print_summary(&summary);
            }
            if summary.failed_count() > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            log::error!("{}", e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_flag_wins_even_when_config_fails() {
        let args = Args::parse_from(["helpdesk-report", "--log-file", "logs/run.log"]);
        let loaded = Err(AppError::InvalidConfig("bad".into()));
        assert_eq!(resolve_log_file(&args, &loaded), Some(PathBuf::from("logs/run.log")));
    }

    #[test]
    fn test_log_file_from_loaded_config() {
        let args = Args::parse_from(["helpdesk-report"]);
        let loaded = Ok(ReportConfig {
            log_file: Some(PathBuf::from("cfg.log")),
            ..ReportConfig::default()
        });
        assert_eq!(resolve_log_file(&args, &loaded), Some(PathBuf::from("cfg.log")));
        assert_eq!(resolve_log_file(&args, &Err(AppError::EmptyFile)), None);
    }

    #[test]
    fn test_bad_config_is_error_before_processing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"window_days = 100000000").unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let args = Args::parse_from(["helpdesk-report", "-q", "--config", path.as_str()]);
        assert!(matches!(run(&args), Err(AppError::InvalidConfig(_))));
    }
}
