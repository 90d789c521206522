use serde::Serialize;

use crate::config::{NotAnIssueRule, ReportConfig};
use crate::parser::types::Ticket;

/// Team bucket of a ticket. The export has no team column: the bucket is
/// derived from the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamTag {
    Primary,
    Alerts,
}

impl TeamTag {
    /// Report order.
    pub const ALL: [TeamTag; 2] = [TeamTag::Primary, TeamTag::Alerts];

    pub fn display_name(self, config: &ReportConfig) -> &str {
        match self {
            TeamTag::Primary => &config.primary_team,
            TeamTag::Alerts => &config.alerts_team,
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Alerts when the subject contains the team marker (case-insensitive),
/// Primary otherwise.
pub fn classify_team(ticket: &Ticket, config: &ReportConfig) -> TeamTag {
    let marker = config.team_marker.trim().to_lowercase();
    if !marker.is_empty() && ticket.subject.to_lowercase().contains(&marker) {
        TeamTag::Alerts
    } else {
        TeamTag::Primary
    }
}

/// Closed or duplicate (per `terminal_statuses`).
pub fn is_terminal(ticket: &Ticket, config: &ReportConfig) -> bool {
    config
        .terminal_statuses
        .iter()
        .any(|s| eq_ignore_case(s, &ticket.status))
}

/// Terminal status with a usable close date. A terminal ticket whose close
/// date is blank or unreadable still counts as open.
pub fn is_closed(ticket: &Ticket, config: &ReportConfig) -> bool {
    ticket.closed_at.is_some() && is_terminal(ticket, config)
}

pub fn is_not_an_issue(ticket: &Ticket, config: &ReportConfig) -> bool {
    match config.not_an_issue_rule {
        NotAnIssueRule::Category => config
            .not_an_issue_categories
            .iter()
            .any(|c| eq_ignore_case(c, &ticket.category)),
        NotAnIssueRule::Status => is_terminal(ticket, config),
    }
}

pub fn is_bug(ticket: &Ticket, config: &ReportConfig) -> bool {
    eq_ignore_case(&config.bug_category, &ticket.category)
}
