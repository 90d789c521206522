use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::analyzer::report::Report;
use crate::error::AppError;
use crate::export::{render, ExportFormat};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub path: String,
    pub size_bytes: u64,
    pub duration_ms: u64,
}

/// Render `report` and write it to `path`.
pub fn export_report(
    report: &Report,
    format: ExportFormat,
    path: &Path,
) -> Result<ExportResult, AppError> {
    let start = Instant::now();

    let bytes = render(report, format)?;
    std::fs::write(path, &bytes)?;
    log::info!("Report written to {} ({} bytes)", path.display(), bytes.len());

    Ok(ExportResult {
        path: path.display().to_string(),
        size_bytes: bytes.len() as u64,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}
