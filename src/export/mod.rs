pub mod tabular;
pub mod xlsx_report;

use chrono::NaiveDate;

use crate::analyzer::report::{Diagnostic, Report, ReportRow};
use crate::error::AppError;

/// Rendering of "not applicable" values.
pub const NA: &str = "NA";

/// Team label used when the report is not split by team.
pub const ALL_TEAMS: &str = "All";

pub const HEADERS: [&str; 10] = [
    "Team",
    "Priority",
    "Raised",
    "Not an Issue",
    "Bugs",
    "Closed Tickets",
    "Pending",
    "Expected TAT",
    "Actual TAT",
    "Target ETA",
];

pub const DIAGNOSTIC_HEADERS: [&str; 4] = ["Line", "Ticket", "Issue", "Detail"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Table,
    Csv,
    Json,
    Xlsx,
}

pub fn format_tat(value: Option<f64>) -> String {
    value.map_or_else(|| NA.to_string(), |v| format!("{:.2}", v))
}

pub fn format_eta(value: Option<NaiveDate>) -> String {
    value.map_or_else(|| NA.to_string(), |d| d.format("%d %b %Y").to_string())
}

/// Row as display strings, in `HEADERS` order.
pub fn row_cells(row: &ReportRow) -> [String; 10] {
    [
        row.team.clone().unwrap_or_else(|| ALL_TEAMS.to_string()),
        row.priority.to_string(),
        row.raised.to_string(),
        row.not_an_issue.to_string(),
        row.bugs.to_string(),
        row.closed.to_string(),
        row.pending.to_string(),
        row.expected_tat.to_string(),
        format_tat(row.actual_tat),
        format_eta(row.target_eta),
    ]
}

pub fn diagnostic_cells(diag: &Diagnostic) -> [String; 4] {
    match diag {
        Diagnostic::UnknownPriority {
            line,
            ticket_id,
            label,
        } => [
            line.to_string(),
            ticket_id.clone(),
            "Unknown priority".to_string(),
            format!("{:?}", label),
        ],
        Diagnostic::UnreadableCloseDate {
            line,
            ticket_id,
            value,
        } => [
            line.to_string(),
            ticket_id.clone(),
            "Unreadable close date".to_string(),
            format!("{:?}, treated as open", value),
        ],
        Diagnostic::ClosedWithoutDate { line, ticket_id } => [
            line.to_string(),
            ticket_id.clone(),
            "Closed without close date".to_string(),
            "counted as pending".to_string(),
        ],
    }
}

/// Serialize the report in the requested format.
pub fn render(report: &Report, format: ExportFormat) -> Result<Vec<u8>, AppError> {
    match format {
        ExportFormat::Table => Ok(tabular::to_table(report).into_bytes()),
        ExportFormat::Csv => tabular::to_csv(report),
        ExportFormat::Json => Ok(serde_json::to_vec_pretty(report)?),
        ExportFormat::Xlsx => xlsx_report::generate_tat_report(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::parser::types::Priority;

    pub(crate) fn sample_report() -> Report {
        Report {
            rows: vec![
                ReportRow {
                    team: Some("Primary".into()),
                    priority: Priority::P1,
                    raised: 3,
                    not_an_issue: 1,
                    bugs: 2,
                    closed: 2,
                    pending: 1,
                    expected_tat: 1,
                    actual_tat: Some(1.5),
                    target_eta: NaiveDate::from_ymd_opt(2024, 7, 26),
                },
                ReportRow {
                    team: None,
                    priority: Priority::P4,
                    raised: 0,
                    not_an_issue: 0,
                    bugs: 0,
                    closed: 0,
                    pending: 0,
                    expected_tat: 30,
                    actual_tat: None,
                    target_eta: None,
                },
            ],
            diagnostics: vec![
                Diagnostic::UnknownPriority {
                    line: 7,
                    ticket_id: "T-7".into(),
                    label: "Critical".into(),
                },
                Diagnostic::UnreadableCloseDate {
                    line: 9,
                    ticket_id: "T-9".into(),
                    value: "soon".into(),
                },
            ],
        }
    }

    #[test]
    fn test_row_cells_with_values() {
        let report = sample_report();
        let cells = row_cells(&report.rows[0]);
        assert_eq!(cells[0], "Primary");
        assert_eq!(cells[1], "P1");
        assert_eq!(cells[8], "1.50");
        assert_eq!(cells[9], "26 Jul 2024");
    }

    #[test]
    fn test_row_cells_not_applicable() {
        let report = sample_report();
        let cells = row_cells(&report.rows[1]);
        assert_eq!(cells[0], ALL_TEAMS);
        assert_eq!(cells[8], NA);
        assert_eq!(cells[9], NA);
    }

    #[test]
    fn test_render_json_uses_null_for_not_applicable() {
        let bytes = render(&sample_report(), ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["rows"][0]["notAnIssue"], 1);
        assert_eq!(value["rows"][0]["targetEta"], "2024-07-26");
        assert!(value["rows"][1]["actualTat"].is_null());
        assert_eq!(value["diagnostics"][0]["kind"], "unknownPriority");
        assert_eq!(value["diagnostics"][0]["label"], "Critical");
        assert_eq!(value["diagnostics"][1]["kind"], "unreadableCloseDate");
        assert_eq!(value["diagnostics"][1]["ticketId"], "T-9");
        assert_eq!(value["diagnostics"][1]["value"], "soon");
    }

    #[test]
    fn test_diagnostic_cells_unreadable_close_date() {
        let report = sample_report();
        let cells = diagnostic_cells(&report.diagnostics[1]);
        assert_eq!(cells[0], "9");
        assert_eq!(cells[2], "Unreadable close date");
        assert_eq!(cells[3], "\"soon\", treated as open");
    }
}
