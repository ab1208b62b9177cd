pub mod process;

pub use process::{archive_file, process_file, process_folder, FileOutcome, RunSummary};
