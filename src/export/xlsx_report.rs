use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

use crate::analyzer::report::{Report, ReportRow};
use crate::error::AppError;
use crate::export::{diagnostic_cells, format_eta, ALL_TEAMS, DIAGNOSTIC_HEADERS, HEADERS, NA};

/// Workbook with two sheets:
/// - "TAT Report"  : one line per report row, numeric cells kept numeric
/// - "Diagnostics" : tickets left out or partially counted
pub fn generate_tat_report(report: &Report) -> Result<Vec<u8>, AppError> {
    let mut wb = Workbook::new();
    write_rows(&mut wb, &report.rows)?;
    write_diagnostics(&mut wb, report)?;
    Ok(wb.save_to_buffer()?)
}

fn write_headers(ws: &mut Worksheet, headers: &[&str]) -> Result<(), XlsxError> {
    for (col, h) in headers.iter().enumerate() {
        ws.write(0, col as u16, *h)?;
    }
    Ok(())
}

// ── Sheet 1: TAT Report ──────────────────────────────────────────────────────

fn write_rows(wb: &mut Workbook, rows: &[ReportRow]) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name("TAT Report")?;
    write_headers(ws, &HEADERS)?;

    for (i, r) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        ws.write(row, 0, r.team.as_deref().unwrap_or(ALL_TEAMS))?;
        ws.write(row, 1, r.priority.code())?;
        ws.write(row, 2, r.raised as f64)?;
        ws.write(row, 3, r.not_an_issue as f64)?;
        ws.write(row, 4, r.bugs as f64)?;
        ws.write(row, 5, r.closed as f64)?;
        ws.write(row, 6, r.pending as f64)?;
        ws.write(row, 7, r.expected_tat as f64)?;
        match r.actual_tat {
            Some(tat) => ws.write(row, 8, tat)?,
            None => ws.write(row, 8, NA)?,
        };
        let eta = format_eta(r.target_eta);
        ws.write(row, 9, eta.as_str())?;
    }

    Ok(())
}

// ── Sheet 2: Diagnostics ─────────────────────────────────────────────────────

fn write_diagnostics(wb: &mut Workbook, report: &Report) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name("Diagnostics")?;
    write_headers(ws, &DIAGNOSTIC_HEADERS)?;

    for (i, diag) in report.diagnostics.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in diagnostic_cells(diag).iter().enumerate() {
            ws.write(row, col as u16, cell.as_str())?;
        }
    }

    Ok(())
}
