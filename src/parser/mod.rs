pub mod cleaner;
pub mod columns;
pub mod deserializers;
pub mod pipeline;
pub mod types;

pub use pipeline::{clean_records, parse_csv, parse_csv_reader, ParseOutput};
pub use types::{CellValue, ParseWarning, RecordSet};
