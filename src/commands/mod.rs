pub mod export;
pub mod report;

pub use export::{export_report, ExportResult};
pub use report::{run_report_from_reader, run_report_logic, ReportOutcome, ReportRequest};
