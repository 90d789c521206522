pub mod analyzer;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod parser;

pub use analyzer::{build_report, Report, ReportParams, ReportRow};
pub use config::ReportConfig;
pub use error::AppError;

// ─── E2E Integration Tests ──────────────────────────────────────────────────
