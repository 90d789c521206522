use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::parser::deserializers::de;

/// How the span between creation and closure is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DayCount {
    /// `(closed - created).days + 1`
    #[default]
    Inclusive,
    /// `(closed - created).days`
    Exclusive,
}

/// What "Not an Issue" counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NotAnIssueRule {
    /// Category is one of `not_an_issue_categories` (query, access request).
    #[default]
    Category,
    /// Status is terminal (closed, duplicate).
    Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ReportConfig {
    /// Case-insensitive subject marker routing a ticket to the alerts bucket.
    pub team_marker: String,
    pub primary_team: String,
    pub alerts_team: String,
    pub split_by_team: bool,
    #[serde(deserialize_with = "de::date_list")]
    pub holidays: Vec<NaiveDate>,
    /// First day of the reporting window; tickets created earlier are ignored.
    #[serde(deserialize_with = "de::date_opt")]
    pub week_start: Option<NaiveDate>,
    /// Last day of the reporting window, also the base for close-date imputation.
    #[serde(deserialize_with = "de::date_opt")]
    pub week_end_date: Option<NaiveDate>,
    /// Weekly snapshot: open tickets get the Friday of the reporting week as close date.
    pub impute_close_dates: bool,
    pub day_count: DayCount,
    pub not_an_issue_rule: NotAnIssueRule,
    pub terminal_statuses: Vec<String>,
    pub not_an_issue_categories: Vec<String>,
    pub bug_category: String,
    /// Single-byte CSV delimiter.
    pub delimiter: char,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            team_marker: "ElastAlert".into(),
            primary_team: "Primary".into(),
            alerts_team: "Alerts".into(),
            split_by_team: true,
            holidays: Vec::new(),
            week_start: None,
            week_end_date: None,
            impute_close_dates: false,
            day_count: DayCount::Inclusive,
            not_an_issue_rule: NotAnIssueRule::Category,
            terminal_statuses: vec!["closed".into(), "duplicate".into()],
            not_an_issue_categories: vec!["query".into(), "access request".into()],
            bug_category: "bug".into(),
            delimiter: ',',
        }
    }
}

impl ReportConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without validating it, for callers that merge
    /// overrides first.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ReportConfig = toml::from_str(&content)?;
        log::debug!("Configuration loaded from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.team_marker.trim().is_empty() {
            return Err(AppError::Custom("team_marker must not be empty".into()));
        }
        if !self.delimiter.is_ascii() {
            return Err(AppError::Custom(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        if self.impute_close_dates && self.week_end_date.is_none() {
            return Err(AppError::Custom(
                "impute_close_dates requires week_end_date".into(),
            ));
        }
        if let (Some(start), Some(end)) = (self.week_start, self.week_end_date) {
            if start > end {
                return Err(AppError::Custom(format!(
                    "week_start {} is after week_end_date {}",
                    start, end
                )));
            }
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub fn holiday_set(&self) -> BTreeSet<NaiveDate> {
        self.holidays.iter().copied().collect()
    }
}
