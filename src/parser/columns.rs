use std::collections::HashMap;

use crate::error::AppError;

pub const COL_ID: &str = "Ticket Id";
pub const COL_CREATED: &str = "Created Time (Ticket)";
pub const COL_CLOSED: &str = "Ticket Closed Time";
pub const COL_PRIORITY: &str = "Priority (Ticket)";
pub const COL_STATUS: &str = "Status (Ticket)";
pub const COL_CATEGORY: &str = "Category (Ticket)";
pub const COL_SUBJECT: &str = "Subject";

/// Required columns: the import fails if any of them is absent.
const REQUIRED: &[&str] = &[
    COL_CREATED,
    COL_CLOSED,
    COL_PRIORITY,
    COL_STATUS,
    COL_CATEGORY,
    COL_SUBJECT,
];

/// Optional columns: absent = default value, reported in the result.
const OPTIONAL: &[&str] = &[COL_ID];

/// Maps column names to their position in a row.
pub struct ColumnMap {
    indices: HashMap<String, usize>,
    headers: Vec<String>,
}

impl ColumnMap {
    /// Build a ColumnMap from the CSV header record.
    pub fn from_headers(headers: &csv::StringRecord) -> Self {
        Self::from_names(headers.iter())
    }

    /// Header names in column order (CSV header record or first sheet row).
    /// Names are trimmed of surrounding whitespace and of a leading BOM; the
    /// first occurrence of a duplicated name wins.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut indices = HashMap::new();
        let mut header_list = Vec::new();
        for (i, field) in names.into_iter().enumerate() {
            let name = field.trim_start_matches('\u{FEFF}').trim().to_string();
            indices.entry(name.clone()).or_insert(i);
            header_list.push(name);
        }
        ColumnMap {
            indices,
            headers: header_list,
        }
    }

    pub fn index(&self, col: &str) -> Option<usize> {
        self.indices.get(col).copied()
    }

    pub fn get<'a>(&self, record: &'a csv::StringRecord, col: &str) -> Option<&'a str> {
        self.index(col).and_then(|i| record.get(i))
    }

    pub fn has(&self, col: &str) -> bool {
        self.indices.contains_key(col)
    }

    pub fn all_headers(&self) -> &[String] {
        &self.headers
    }
}

#[derive(Debug)]
pub struct ColumnValidation {
    pub present: Vec<String>,
    pub missing_optional: Vec<String>,
}

/// Validate that all required columns are present.
/// Returns `AppError::MissingColumns` if any required column is absent.
pub fn validate_columns(col_map: &ColumnMap) -> Result<ColumnValidation, AppError> {
    let missing_required: Vec<String> = REQUIRED
        .iter()
        .filter(|&&c| !col_map.has(c))
        .map(|c| c.to_string())
        .collect();

    if !missing_required.is_empty() {
        return Err(AppError::MissingColumns(missing_required));
    }

    let missing_optional = OPTIONAL
        .iter()
        .filter(|&&c| !col_map.has(c))
        .map(|c| c.to_string())
        .collect();

    Ok(ColumnValidation {
        present: col_map.all_headers().to_vec(),
        missing_optional,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_headers(cols: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(cols.to_vec())
    }

    #[test]
    fn test_column_map_get() {
        let headers = make_headers(&[COL_SUBJECT, COL_STATUS]);
        let cm = ColumnMap::from_headers(&headers);
        let record = csv::StringRecord::from(vec!["Login broken", "Open"]);
        assert_eq!(cm.get(&record, COL_SUBJECT), Some("Login broken"));
        assert_eq!(cm.get(&record, COL_STATUS), Some("Open"));
        assert_eq!(cm.get(&record, COL_CATEGORY), None);
    }

    #[test]
    fn test_column_map_trims_whitespace_and_bom() {
        let headers = make_headers(&["\u{FEFF}Subject", " Status (Ticket) "]);
        let cm = ColumnMap::from_headers(&headers);
        assert!(cm.has(COL_SUBJECT));
        assert!(cm.has(COL_STATUS));
    }

    #[test]
    fn test_column_map_from_names_first_duplicate_wins() {
        let cm = ColumnMap::from_names([" Subject", COL_STATUS, "Subject"]);
        assert_eq!(cm.index(COL_SUBJECT), Some(0));
        assert_eq!(cm.index(COL_STATUS), Some(1));
        assert_eq!(cm.index(COL_CLOSED), None);
        assert_eq!(cm.all_headers().len(), 3);
    }

    #[test]
    fn test_validate_columns_ok() {
        let headers = make_headers(&[
            COL_ID,
            COL_CREATED,
            COL_CLOSED,
            COL_PRIORITY,
            COL_STATUS,
            COL_CATEGORY,
            COL_SUBJECT,
        ]);
        let val = validate_columns(&ColumnMap::from_headers(&headers)).unwrap();
        assert!(val.missing_optional.is_empty());
        assert_eq!(val.present.len(), 7);
    }

    #[test]
    fn test_validate_columns_missing_required() {
        let headers = make_headers(&[COL_SUBJECT, COL_STATUS]);
        let err = validate_columns(&ColumnMap::from_headers(&headers)).unwrap_err();
        match err {
            AppError::MissingColumns(cols) => {
                assert!(cols.contains(&COL_CREATED.to_string()));
                assert!(cols.contains(&COL_PRIORITY.to_string()));
                assert!(!cols.contains(&COL_SUBJECT.to_string()));
            }
            _ => panic!("Expected MissingColumns error"),
        }
    }

    #[test]
    fn test_validate_columns_missing_optional_id() {
        let headers = make_headers(REQUIRED);
        let val = validate_columns(&ColumnMap::from_headers(&headers)).unwrap();
        assert_eq!(val.missing_optional, vec![COL_ID.to_string()]);
    }
}
