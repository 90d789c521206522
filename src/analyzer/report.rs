use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::analyzer::calendar::{friday_of_week, next_friday};
use crate::analyzer::classifier::{
    classify_team, is_bug, is_closed, is_not_an_issue, is_terminal, TeamTag,
};
use crate::analyzer::stats::{mean, round2};
use crate::analyzer::tat::compute_turnaround_days;
use crate::config::ReportConfig;
use crate::parser::types::{Priority, Ticket};

/// One aggregate line: a priority, optionally within a team bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub team: Option<String>,
    pub priority: Priority,
    pub raised: usize,
    pub not_an_issue: usize,
    pub bugs: usize,
    pub closed: usize,
    pub pending: usize,
    pub expected_tat: u32,
    /// Mean turnaround of closed tickets, None when nothing is closed.
    pub actual_tat: Option<f64>,
    /// Next Friday after the reference time, None when nothing is pending.
    pub target_eta: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Diagnostic {
    /// Priority label without a P1..P4 code; the ticket is left out of every row.
    #[serde(rename_all = "camelCase")]
    UnknownPriority {
        line: usize,
        ticket_id: String,
        label: String,
    },
    /// Close date present but unreadable; the ticket counts as open.
    #[serde(rename_all = "camelCase")]
    UnreadableCloseDate {
        line: usize,
        ticket_id: String,
        value: String,
    },
    /// Terminal status with a blank close date; counted as pending.
    #[serde(rename_all = "camelCase")]
    ClosedWithoutDate { line: usize, ticket_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Inputs of one report run besides the tickets.
#[derive(Debug, Clone)]
pub struct ReportParams<'a> {
    pub config: &'a ReportConfig,
    pub holidays: BTreeSet<NaiveDate>,
    /// Reference instant for the target ETA.
    pub now: NaiveDateTime,
}

impl<'a> ReportParams<'a> {
    pub fn new(config: &'a ReportConfig, now: NaiveDateTime) -> Self {
        ReportParams {
            config,
            holidays: config.holiday_set(),
            now,
        }
    }
}

/// Tickets matching `predicate`, input untouched.
pub fn filter_group<'t, P>(tickets: &'t [Ticket], predicate: P) -> Vec<&'t Ticket>
where
    P: Fn(&Ticket) -> bool,
{
    tickets.iter().filter(|t| predicate(t)).collect()
}

/// Weekly snapshot: every ticket without a close date gets the Friday of the
/// week of `week_end_date` (at midnight).
pub fn impute_missing_close_date(tickets: &[Ticket], week_end_date: NaiveDate) -> Vec<Ticket> {
    let friday = friday_of_week(week_end_date).and_time(NaiveTime::MIN);
    tickets
        .iter()
        .map(|t| {
            let mut t = t.clone();
            if t.closed_at.is_none() {
                t.closed_at = Some(friday);
            }
            t
        })
        .collect()
}

/// Counts and turnaround figures of one group.
pub fn aggregate(
    group: &[&Ticket],
    priority: Priority,
    team: Option<TeamTag>,
    params: &ReportParams<'_>,
) -> ReportRow {
    let config = params.config;

    let closed: Vec<&Ticket> = group
        .iter()
        .copied()
        .filter(|t| is_closed(t, config))
        .collect();
    let pending = group.len() - closed.len();

    let turnarounds: Vec<f64> = closed
        .iter()
        .filter_map(|t| compute_turnaround_days(t, &params.holidays, config.day_count))
        .map(f64::from)
        .collect();

    ReportRow {
        team: team.map(|t| t.display_name(config).to_string()),
        priority,
        raised: group.len(),
        not_an_issue: group.iter().filter(|t| is_not_an_issue(t, config)).count(),
        bugs: group.iter().filter(|t| is_bug(t, config)).count(),
        closed: closed.len(),
        pending,
        expected_tat: priority.expected_tat_days(),
        actual_tat: mean(&turnarounds).map(round2),
        target_eta: (pending > 0).then(|| next_friday(params.now.date())),
    }
}

fn in_window(ticket: &Ticket, config: &ReportConfig) -> bool {
    let Some(start) = config.week_start else {
        return true;
    };
    let created = ticket.created_at.date();
    created >= start && config.week_end_date.map_or(true, |end| created <= end)
}

/// Full report: one row per team bucket (if split) and priority, teams in
/// order Primary, Alerts and priorities P1..P4 within each team.
pub fn build_report(tickets: &[Ticket], params: &ReportParams<'_>) -> Report {
    let config = params.config;

    let scoped: Vec<Ticket> = tickets
        .iter()
        .filter(|t| in_window(t, config))
        .cloned()
        .collect();
    let scoped = match (config.impute_close_dates, config.week_end_date) {
        (true, Some(week_end)) => impute_missing_close_date(&scoped, week_end),
        _ => scoped,
    };

    let mut diagnostics = Vec::new();
    for t in &scoped {
        if t.priority.is_none() {
            diagnostics.push(Diagnostic::UnknownPriority {
                line: t.line,
                ticket_id: t.id.clone(),
                label: t.priority_label.clone(),
            });
        } else if let Some(value) = &t.unparsed_close {
            diagnostics.push(Diagnostic::UnreadableCloseDate {
                line: t.line,
                ticket_id: t.id.clone(),
                value: value.clone(),
            });
        } else if t.closed_at.is_none() && is_terminal(t, config) {
            diagnostics.push(Diagnostic::ClosedWithoutDate {
                line: t.line,
                ticket_id: t.id.clone(),
            });
        }
    }
    if !diagnostics.is_empty() {
        log::warn!("{} tickets with data-quality issues", diagnostics.len());
    }

    let teams: Vec<Option<TeamTag>> = if config.split_by_team {
        TeamTag::ALL.iter().copied().map(Some).collect()
    } else {
        vec![None]
    };

    let rows = teams
        .into_iter()
        .flat_map(|team| {
            Priority::ALL.into_iter().map(move |priority| (team, priority))
        })
        .map(|(team, priority)| {
            let group = filter_group(&scoped, |t| {
                t.priority == Some(priority)
                    && team.map_or(true, |tag| classify_team(t, config) == tag)
            });
            aggregate(&group, priority, team, params)
        })
        .collect();

    Report { rows, diagnostics }
}
