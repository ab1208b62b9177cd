pub mod counting;
pub mod partition;
pub mod tables;
pub mod window;

pub use partition::{bot_keys, split_by_bot_name, PartitionMap};
pub use tables::{build_report_tables, ReportTables, WindowSummary};
pub use window::{split_by_window, WindowSplit};
