pub mod ticket_report;

pub use ticket_report::{generate_ticket_report, write_ticket_report};

use rust_xlsxwriter::Format;

/// Section title: bold, 14pt
pub fn create_title_format() -> Format {
    Format::new().set_bold().set_font_size(14)
}

/// Column header: bold, 12pt
pub fn create_header_format() -> Format {
    Format::new().set_bold().set_font_size(12)
}

/// Integer #,##0
pub fn create_integer_format() -> Format {
    Format::new().set_num_format("#,##0")
}
