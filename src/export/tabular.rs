use crate::analyzer::report::Report;
use crate::error::AppError;
use crate::export::{diagnostic_cells, row_cells, HEADERS};

/// Report rows as CSV, header first.
pub fn to_csv(report: &Report) -> Result<Vec<u8>, AppError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(HEADERS)?;
    for row in &report.rows {
        wtr.write_record(row_cells(row))?;
    }
    wtr.into_inner()
        .map_err(|e| AppError::Custom(format!("CSV flush failed: {}", e)))
}

/// Plain text table for the terminal, followed by the diagnostics if any.
pub fn to_table(report: &Report) -> String {
    let cells: Vec<[String; 10]> = report.rows.iter().map(row_cells).collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let line = |fields: &[&str], out: &mut String| {
        let padded: Vec<String> = fields
            .iter()
            .zip(&widths)
            .map(|(f, w)| format!("{:<width$}", f, width = *w))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    };

    line(&HEADERS, &mut out);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    line(&rule.iter().map(String::as_str).collect::<Vec<_>>(), &mut out);
    for row in &cells {
        line(&row.iter().map(String::as_str).collect::<Vec<_>>(), &mut out);
    }

    if !report.diagnostics.is_empty() {
        out.push_str(&format!("\n{} data-quality issue(s):\n", report.diagnostics.len()));
        for diag in &report.diagnostics {
            let [l, id, issue, detail] = diagnostic_cells(diag);
            out.push_str(&format!("  line {}: ticket {}: {} ({})\n", l, id, issue, detail));
        }
    }
    out
}
