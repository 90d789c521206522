use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, Data, DataType, Range, Reader};

use crate::error::AppError;
use crate::parser::columns::{
    validate_columns, ColumnMap, COL_CATEGORY, COL_CLOSED, COL_CREATED, COL_ID, COL_PRIORITY,
    COL_STATUS, COL_SUBJECT,
};
use crate::parser::pipeline::{assemble, ParseOutput};
use crate::parser::types::{RawDate, TicketRaw};

/// Parse a ticket export workbook (xlsx, xls, ods). Only the first sheet is
/// read; its first row holds the column names.
///
/// Cells typed as dates are taken as is, text cells go through the same
/// timestamp parsing as CSV.
pub fn parse_xlsx(path: impl AsRef<Path>) -> Result<ParseOutput, AppError> {
    let start = Instant::now();
    let path = path.as_ref();
    log::info!("Reading ticket workbook {}", path.display());

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .transpose()?
        .unwrap_or_else(Range::empty);

    // Sheet row number (1-based) of the header
    let header_line = range.start().map_or(1, |(row, _)| row as usize + 1);

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .map(|cells| cells.iter().map(cell_text).collect())
        .unwrap_or_default();
    let col_map = ColumnMap::from_names(headers.iter().map(String::as_str));
    let col_validation = validate_columns(&col_map)?;

    let mut rows: Vec<(usize, TicketRaw)> = Vec::new();
    let mut row_idx = 0usize;
    for (offset, cells) in sheet_rows.enumerate() {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        row_idx += 1;
        if row_idx % 500 == 0 {
            log::debug!("{} rows read", row_idx);
        }
        let line = header_line + offset + 1;
        rows.push((line, cells_to_raw(&col_map, cells)));
    }

    Ok(assemble(rows, Vec::new(), col_validation, row_idx, start))
}

fn cells_to_raw(col_map: &ColumnMap, cells: &[Data]) -> TicketRaw {
    let cell = |col: &str| col_map.index(col).and_then(|i| cells.get(i));
    let text = |col: &str| cell(col).map(cell_text);

    TicketRaw {
        id: text(COL_ID),
        created_at: cell(COL_CREATED).and_then(cell_date),
        closed_at: cell(COL_CLOSED).and_then(cell_date),
        priority: text(COL_PRIORITY),
        status: text(COL_STATUS),
        category: text(COL_CATEGORY),
        subject: text(COL_SUBJECT),
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Numeric ids come back as floats
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn cell_date(cell: &Data) -> Option<RawDate> {
    match cell {
        Data::Empty => None,
        Data::DateTime(_) | Data::DateTimeIso(_) => Some(
            cell.as_datetime()
                .map(RawDate::DateTime)
                .unwrap_or_else(|| RawDate::Text(cell_text(cell))),
        ),
        other => Some(RawDate::Text(cell_text(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::deserializers::parse_ticket_datetime;
    use crate::parser::pipeline::parse_export;
    use crate::parser::types::Priority;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    const HEADERS: [&str; 7] = [
        COL_ID,
        COL_CREATED,
        COL_CLOSED,
        COL_PRIORITY,
        COL_STATUS,
        COL_CATEGORY,
        COL_SUBJECT,
    ];

    fn excel_dt(day: u8, hour: u16, min: u8) -> ExcelDateTime {
        ExcelDateTime::from_ymd(2024, 7, day)
            .unwrap()
            .and_hms(hour, min, 0)
            .unwrap()
    }

    /// Three tickets: typed dates, export text dates, unreadable close text.
    fn write_export(path: &Path) {
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        let date_fmt = Format::new().set_num_format("yyyy-mm-dd hh:mm");

        for (col, h) in HEADERS.iter().enumerate() {
            ws.write(0, col as u16, *h).unwrap();
        }

        ws.write(1, 0, 1001).unwrap();
        ws.write_datetime_with_format(1, 1, &excel_dt(1, 10, 0), &date_fmt)
            .unwrap();
        ws.write_datetime_with_format(1, 2, &excel_dt(3, 14, 0), &date_fmt)
            .unwrap();
        ws.write(1, 3, "P2-High").unwrap();
        ws.write(1, 4, "Closed").unwrap();
        ws.write(1, 5, "Bug").unwrap();
        ws.write(1, 6, "Login broken").unwrap();

        ws.write(2, 0, "1002").unwrap();
        ws.write(2, 1, "22 Jul 2024 11:00 AM").unwrap();
        ws.write(2, 3, "P1-Urgent").unwrap();
        ws.write(2, 4, "Open").unwrap();
        ws.write(2, 5, "Bug").unwrap();
        ws.write(2, 6, "ElastAlert: cpu spike").unwrap();

        ws.write(3, 0, 1003).unwrap();
        ws.write_datetime_with_format(3, 1, &excel_dt(2, 13, 0), &date_fmt)
            .unwrap();
        ws.write(3, 2, "not closed").unwrap();
        ws.write(3, 3, "P3").unwrap();
        ws.write(3, 4, "Closed").unwrap();
        ws.write(3, 5, "Query").unwrap();
        ws.write(3, 6, "Bad close date").unwrap();

        wb.save(path).unwrap();
    }

    #[test]
    fn test_parse_xlsx_typed_and_text_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tickets.xlsx");
        write_export(&path);

        let out = parse_xlsx(&path).unwrap();
        assert_eq!(out.total_rows_processed, 3);
        assert_eq!(out.tickets.len(), 3);
        assert!(out.missing_optional_columns.is_empty());

        let t = &out.tickets[0];
        assert_eq!(t.id, "1001");
        assert_eq!(t.line, 2);
        assert_eq!(t.priority, Some(Priority::P2));
        assert_eq!(t.created_at.to_string(), "2024-07-01 10:00:00");
        assert_eq!(t.closed_at.unwrap().to_string(), "2024-07-03 14:00:00");

        let t = &out.tickets[1];
        assert_eq!(t.id, "1002");
        assert_eq!(t.created_at, parse_ticket_datetime("22 Jul 2024 11:00 AM").unwrap());
        assert_eq!(t.closed_at, None);
        assert_eq!(t.subject, "ElastAlert: cpu spike");

        let t = &out.tickets[2];
        assert_eq!(t.line, 4);
        assert_eq!(t.closed_at, None);
        assert_eq!(t.unparsed_close.as_deref(), Some("not closed"));
        assert_eq!(out.unparsed_close_dates, 1);
    }

    #[test]
    fn test_parse_export_picks_workbook_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Tickets.XLSX");
        write_export(&path);
        let out = parse_export(&path, b',').unwrap();
        assert_eq!(out.tickets.len(), 3);
    }

    #[test]
    fn test_parse_xlsx_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.xlsx");
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.write(0, 0, COL_SUBJECT).unwrap();
        ws.write(0, 1, COL_STATUS).unwrap();
        ws.write(1, 0, "Login broken").unwrap();
        wb.save(&path).unwrap();

        match parse_xlsx(&path) {
            Err(AppError::MissingColumns(cols)) => {
                assert_eq!(cols.len(), 4);
                assert!(cols.contains(&COL_CREATED.to_string()));
            }
            other => panic!("Expected MissingColumns, got {:?}", other.map(|o| o.tickets)),
        }
    }

    #[test]
    fn test_parse_xlsx_not_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"Ticket Id,Subject\n1,hello").unwrap();
        assert!(matches!(parse_xlsx(&path), Err(AppError::Spreadsheet(_))));
    }

    #[test]
    fn test_cell_text_numeric_id() {
        assert_eq!(cell_text(&Data::Float(1001.0)), "1001");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
