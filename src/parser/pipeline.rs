use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use chrono::NaiveDateTime;

use crate::error::AppError;
use crate::parser::columns::{
    validate_columns, ColumnMap, ColumnValidation, COL_CATEGORY, COL_CLOSED, COL_CREATED, COL_ID,
    COL_PRIORITY, COL_STATUS, COL_SUBJECT,
};
use crate::parser::deserializers::{parse_ticket_datetime, TICKET_DT_FMT};
use crate::parser::types::{ParseWarning, Priority, RawDate, Ticket, TicketRaw};
use crate::parser::xlsx::parse_xlsx;

/// Extensions read as workbooks; anything else is read as CSV.
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Output of a parse — normalized tickets plus import diagnostics.
#[derive(Debug)]
pub struct ParseOutput {
    pub tickets: Vec<Ticket>,
    pub warnings: Vec<ParseWarning>,
    pub total_rows_processed: usize,
    pub skipped_rows: usize,
    /// Rows whose close date was present but unreadable; they count as open.
    pub unparsed_close_dates: usize,
    pub detected_columns: Vec<String>,
    pub missing_optional_columns: Vec<String>,
    pub unique_statuses: Vec<String>,
    pub parse_duration_ms: u64,
}

/// Tickets normalized from raw rows.
#[derive(Debug, Default)]
pub struct Normalized {
    pub tickets: Vec<Ticket>,
    pub warnings: Vec<ParseWarning>,
    pub skipped_rows: usize,
    pub unparsed_close_dates: usize,
}

/// Parse a ticket export, choosing the reader from the file extension.
pub fn parse_export(path: impl AsRef<Path>, delimiter: u8) -> Result<ParseOutput, AppError> {
    let path = path.as_ref();
    if is_spreadsheet(path) {
        parse_xlsx(path)
    } else {
        parse_csv(path, delimiter)
    }
}

pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Parse a CSV ticket export from `path`.
pub fn parse_csv(path: impl AsRef<Path>, delimiter: u8) -> Result<ParseOutput, AppError> {
    let file = std::fs::File::open(path.as_ref())?;
    log::info!("Reading ticket export {}", path.as_ref().display());
    parse_csv_reader(std::io::BufReader::new(file), delimiter)
}

/// Core parsing logic — accepts any `Read` source, useful for tests.
pub fn parse_csv_reader<R: Read>(reader: R, delimiter: u8) -> Result<ParseOutput, AppError> {
    let start = Instant::now();

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    // Phase 1: validate columns before touching any record
    let headers = rdr.headers()?.clone();
    let col_map = ColumnMap::from_headers(&headers);
    let col_validation = validate_columns(&col_map)?;

    // Phase 2: read raw rows
    let mut rows: Vec<(usize, TicketRaw)> = Vec::new();
    let mut read_errors: Vec<ParseWarning> = Vec::new();
    let mut row_idx = 0usize;

    for result in rdr.records() {
        row_idx += 1;
        if row_idx % 500 == 0 {
            log::debug!("{} rows read", row_idx);
        }
        let line = row_idx + 1; // +1 for the header row
        match result {
            Ok(record) => rows.push((line, record_to_raw(&col_map, &record))),
            Err(err) => read_errors.push(ParseWarning {
                line,
                message: err.to_string(),
            }),
        }
    }

    Ok(assemble(rows, read_errors, col_validation, row_idx, start))
}

/// Normalise the raw rows of any reader and build the import summary.
pub(crate) fn assemble(
    rows: Vec<(usize, TicketRaw)>,
    read_errors: Vec<ParseWarning>,
    col_validation: ColumnValidation,
    row_idx: usize,
    start: Instant,
) -> ParseOutput {
    // Phase 3: normalise
    let mut normalized = normalize(rows);
    normalized.skipped_rows += read_errors.len();
    normalized.warnings.extend(read_errors);
    normalized.warnings.sort_by_key(|w| w.line);

    for w in &normalized.warnings {
        log::warn!("line {}: {}", w.line, w.message);
    }

    let unique_statuses: BTreeSet<String> = normalized
        .tickets
        .iter()
        .map(|t| t.status.clone())
        .collect();

    log::info!(
        "{} rows read, {} tickets kept, {} skipped, {} unreadable close dates",
        row_idx,
        normalized.tickets.len(),
        normalized.skipped_rows,
        normalized.unparsed_close_dates
    );

    ParseOutput {
        tickets: normalized.tickets,
        warnings: normalized.warnings,
        total_rows_processed: row_idx,
        skipped_rows: normalized.skipped_rows,
        unparsed_close_dates: normalized.unparsed_close_dates,
        detected_columns: col_validation.present,
        missing_optional_columns: col_validation.missing_optional,
        unique_statuses: unique_statuses.into_iter().collect(),
        parse_duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// Turn raw rows (with their source line) into tickets.
///
/// A row without a readable creation date is skipped with a warning. A close
/// date that fails to parse never fails the row: the ticket is kept as open
/// and the failure is counted.
pub fn normalize(rows: Vec<(usize, TicketRaw)>) -> Normalized {
    let mut out = Normalized::default();
    for (line, raw) in rows {
        match normalize_ticket(&raw, line) {
            Ok(ticket) => {
                if let Some(text) = &ticket.unparsed_close {
                    out.unparsed_close_dates += 1;
                    out.warnings.push(ParseWarning {
                        line,
                        message: format!("Unreadable close date {:?}, ticket treated as open", text),
                    });
                }
                out.tickets.push(ticket);
            }
            Err(message) => {
                out.warnings.push(ParseWarning { line, message });
                out.skipped_rows += 1;
            }
        }
    }
    out
}

fn record_to_raw(col_map: &ColumnMap, record: &csv::StringRecord) -> TicketRaw {
    TicketRaw {
        id: col_map.get(record, COL_ID).map(str::to_string),
        created_at: col_map.get(record, COL_CREATED).map(RawDate::from),
        closed_at: col_map.get(record, COL_CLOSED).map(RawDate::from),
        priority: col_map.get(record, COL_PRIORITY).map(str::to_string),
        status: col_map.get(record, COL_STATUS).map(str::to_string),
        category: col_map.get(record, COL_CATEGORY).map(str::to_string),
        subject: col_map.get(record, COL_SUBJECT).map(str::to_string),
    }
}

/// Blank cell = Ok(None); text that is not a ticket timestamp = Err(text).
fn resolve_date(raw: Option<&RawDate>) -> Result<Option<NaiveDateTime>, String> {
    match raw {
        None => Ok(None),
        Some(RawDate::DateTime(dt)) => Ok(Some(*dt)),
        Some(RawDate::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            parse_ticket_datetime(text)
                .map(Some)
                .ok_or_else(|| text.to_string())
        }
    }
}

fn normalize_ticket(raw: &TicketRaw, line: usize) -> Result<Ticket, String> {
    // Created time (required)
    let created_at = match resolve_date(raw.created_at.as_ref()) {
        Ok(Some(dt)) => dt,
        Ok(None) => return Err("Missing created time".to_string()),
        Err(text) => {
            return Err(format!(
                "Invalid created time {:?} (expected {})",
                text, TICKET_DT_FMT
            ))
        }
    };

    // Closed time (optional, unreadable = open)
    let (closed_at, unparsed_close) = match resolve_date(raw.closed_at.as_ref()) {
        Ok(closed) => (closed, None),
        Err(text) => (None, Some(text)),
    };

    let id = raw
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("line-{}", line));

    let priority_label = raw.priority.as_deref().unwrap_or("").trim().to_string();

    let ticket = Ticket {
        id,
        line,
        created_at,
        closed_at,
        unparsed_close,
        priority: Priority::from_label(&priority_label),
        priority_label,
        status: raw.status.as_deref().unwrap_or("").trim().to_string(),
        category: raw.category.as_deref().unwrap_or("").trim().to_string(),
        subject: raw.subject.as_deref().unwrap_or("").trim().to_string(),
    };
    Ok(ticket)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
