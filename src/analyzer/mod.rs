pub mod calendar;
pub mod classifier;
pub mod report;
pub mod stats;
pub mod tat;

pub use calendar::{friday_of_week, next_friday};
pub use classifier::{classify_team, TeamTag};
pub use report::{
    aggregate, build_report, filter_group, impute_missing_close_date, Diagnostic, Report,
    ReportParams, ReportRow,
};
pub use tat::compute_turnaround_days;
