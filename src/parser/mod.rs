pub mod columns;
pub mod deserializers;
pub mod pipeline;
pub mod types;
pub mod xlsx;

pub use pipeline::{
    is_spreadsheet, normalize, parse_csv, parse_csv_reader, parse_export, Normalized, ParseOutput,
};
pub use types::{ParseWarning, Priority, RawDate, Ticket, TicketRaw};
pub use xlsx::parse_xlsx;
