use chrono::{NaiveDate, NaiveDateTime};

/// Timestamp format of the ticket export ("20 Jul 2024 03:15 PM").
pub const TICKET_DT_FMT: &str = "%d %b %Y %I:%M %p";

/// Accepted formats for plain dates (holidays, week bounds).
const DATE_FMTS: &[&str] = &["%Y-%m-%d", "%d %b %Y"];

/// Parse an export timestamp ("20 Jul 2024 03:15 PM").
/// Returns None for empty or unparseable strings.
pub fn parse_ticket_datetime(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(trimmed, TICKET_DT_FMT).ok()
}

/// Parse a calendar date, ISO ("2024-07-02") or export style ("02 Jul 2024").
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FMTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Parse a reference instant: an export timestamp, an ISO datetime or a bare date
/// (midnight).
pub fn parse_reference_datetime(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    parse_ticket_datetime(trimmed)
        .or_else(|| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M").ok())
        .or_else(|| parse_date(trimmed).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Serde-compatible deserializers for use with `#[serde(deserialize_with = "de::...")]`.
pub mod de {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer};

    /// "2024-07-26" or "26 Jul 2024" → Some(NaiveDate), "" → None
    pub fn date_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        match s.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => super::parse_date(v)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {v:?}"))),
        }
    }

    /// ["2024-07-02", "15 Aug 2024"] → Vec<NaiveDate>
    pub fn date_list<'de, D>(deserializer: D) -> Result<Vec<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|v| {
                super::parse_date(v)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {v:?}")))
            })
            .collect()
    }
}
