use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Excel export error: {0}")]
    Xlsx(String),

    #[error("Spreadsheet read error: {0}")]
    Spreadsheet(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid date {0:?} (expected {1})")]
    InvalidDate(String, &'static str),

    #[error("{0}")]
    Custom(String),
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Xlsx(e.to_string())
    }
}

impl From<calamine::Error> for AppError {
    fn from(e: calamine::Error) -> Self {
        AppError::Spreadsheet(e.to_string())
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_all() {
        let err = AppError::MissingColumns(vec!["Subject".into(), "Status (Ticket)".into()]);
        assert_eq!(
            err.to_string(),
            "Missing required columns: Subject, Status (Ticket)"
        );
    }

    #[test]
    fn test_serializes_as_message() {
        let err = AppError::Custom("boom".into());
        assert_eq!(serde_json::to_string(&err).unwrap(), "\"boom\"");
    }
}
