use std::io::Read;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::analyzer::report::{build_report, Report, ReportParams};
use crate::config::ReportConfig;
use crate::error::AppError;
use crate::parser::{parse_csv_reader, parse_export, ParseOutput, ParseWarning};

pub struct ReportRequest {
    pub input: PathBuf,
    /// Reference instant for target ETAs.
    pub now: NaiveDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total_rows: usize,
    pub tickets: usize,
    pub skipped_rows: usize,
    pub unparsed_close_dates: usize,
    pub warnings: Vec<ParseWarning>,
    pub detected_columns: Vec<String>,
    pub missing_optional_columns: Vec<String>,
    pub unique_statuses: Vec<String>,
    pub parse_duration_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutcome {
    pub report: Report,
    pub import: ImportSummary,
}

/// Read the export at `request.input` (CSV or workbook, by extension) and
/// build the report.
pub fn run_report_logic(
    config: &ReportConfig,
    request: &ReportRequest,
) -> Result<ReportOutcome, AppError> {
    config.validate()?;
    let parsed = parse_export(&request.input, config.delimiter_byte())?;
    Ok(finish(parsed, config, request.now))
}

/// Same as `run_report_logic` over any reader.
pub fn run_report_from_reader<R: Read>(
    reader: R,
    config: &ReportConfig,
    now: NaiveDateTime,
) -> Result<ReportOutcome, AppError> {
    config.validate()?;
    let parsed = parse_csv_reader(reader, config.delimiter_byte())?;
    Ok(finish(parsed, config, now))
}

fn finish(parsed: ParseOutput, config: &ReportConfig, now: NaiveDateTime) -> ReportOutcome {
    let params = ReportParams::new(config, now);
    let report = build_report(&parsed.tickets, &params);

    ReportOutcome {
        report,
        import: ImportSummary {
            total_rows: parsed.total_rows_processed,
            tickets: parsed.tickets.len(),
            skipped_rows: parsed.skipped_rows,
            unparsed_close_dates: parsed.unparsed_close_dates,
            warnings: parsed.warnings,
            detected_columns: parsed.detected_columns,
            missing_optional_columns: parsed.missing_optional_columns,
            unique_statuses: parsed.unique_statuses,
            parse_duration_ms: parsed.parse_duration_ms,
        },
    }
}
