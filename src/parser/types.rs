use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Leading priority code of a priority label ("P1-Urgent", "p3 - Low", "P2").
static PRIORITY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[Pp]([1-4])(?:$|[^0-9])").expect("valid priority regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    P1,
    P2,
    P3,
    P4,
}

impl Priority {
    /// Report order.
    pub const ALL: [Priority; 4] = [Priority::P1, Priority::P2, Priority::P3, Priority::P4];

    /// Contractual turnaround in days. Fixed for every report.
    pub fn expected_tat_days(self) -> u32 {
        match self {
            Priority::P1 => 1,
            Priority::P2 => 3,
            Priority::P3 => 7,
            Priority::P4 => 30,
        }
    }

    /// Extract the leading code from a priority label.
    /// Returns None when the label does not start with P1..P4.
    pub fn from_label(label: &str) -> Option<Priority> {
        let caps = PRIORITY_CODE.captures(label)?;
        match &caps[1] {
            "1" => Some(Priority::P1),
            "2" => Some(Priority::P2),
            "3" => Some(Priority::P3),
            "4" => Some(Priority::P4),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
            Priority::P4 => "P4",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A date cell as found in the export: text to parse, or a value already
/// typed as a date by the spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDate {
    Text(String),
    DateTime(NaiveDateTime),
}

impl From<&str> for RawDate {
    fn from(s: &str) -> Self {
        RawDate::Text(s.to_string())
    }
}

impl From<String> for RawDate {
    fn from(s: String) -> Self {
        RawDate::Text(s)
    }
}

/// One export row as found in the file, before any interpretation.
#[derive(Debug, Clone, Default)]
pub struct TicketRaw {
    pub id: Option<String>,
    pub created_at: Option<RawDate>,
    pub closed_at: Option<RawDate>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: String,
    /// Line in the source file (header is line 1).
    pub line: usize,
    pub created_at: NaiveDateTime,
    pub closed_at: Option<NaiveDateTime>,
    /// Close date text that could not be read; the ticket counts as open.
    pub unparsed_close: Option<String>,
    /// None when the label carries no known code; see `priority_label`.
    pub priority: Option<Priority>,
    pub priority_label: String,
    pub status: String,
    pub category: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseWarning {
    pub line: usize,
    pub message: String,
}
