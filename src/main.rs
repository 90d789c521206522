use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{ArgAction, Parser};

use tat_report::commands::{export_report, run_report_logic, ReportRequest};
use tat_report::config::{DayCount, NotAnIssueRule, ReportConfig};
use tat_report::export::{render, ExportFormat};
use tat_report::parser::deserializers::{parse_date, parse_reference_datetime};

#[derive(Parser)]
#[command(name = "tat-report", version)]
#[command(about = "Turnaround-time compliance report from a helpdesk ticket export")]
struct Cli {
    /// Ticket export (CSV, or xlsx/xls/ods workbook)
    input: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = ExportFormat::Table)]
    format: ExportFormat,

    /// Write the report here instead of stdout (required for xlsx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Reference time for target ETAs (default: now)
    #[arg(long, value_parser = parse_now_arg)]
    now: Option<NaiveDateTime>,

    /// First day of the reporting window
    #[arg(long, value_parser = parse_date_arg)]
    week_start: Option<NaiveDate>,

    /// Last day of the reporting window
    #[arg(long, value_parser = parse_date_arg)]
    week_end: Option<NaiveDate>,

    /// Give open tickets the Friday of the reporting week as close date
    #[arg(long)]
    impute: bool,

    /// Holiday excluded from turnaround (repeatable)
    #[arg(long = "holiday", value_parser = parse_date_arg)]
    holidays: Vec<NaiveDate>,

    /// Subject marker of the alerts team
    #[arg(long)]
    marker: Option<String>,

    /// One row per priority, without team split
    #[arg(long)]
    no_teams: bool,

    #[arg(long, value_enum)]
    day_count: Option<DayCount>,

    #[arg(long, value_enum)]
    not_an_issue: Option<NotAnIssueRule>,

    /// CSV field delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// Print the import summary (JSON) on stderr
    #[arg(long)]
    summary: bool,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("invalid date {s:?} (use 2024-07-26 or 26 Jul 2024)"))
}

fn parse_now_arg(s: &str) -> Result<NaiveDateTime, String> {
    parse_reference_datetime(s).ok_or_else(|| format!("invalid date/time {s:?}"))
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn build_config(cli: &Cli) -> Result<ReportConfig> {
    let mut config = match &cli.config {
        Some(path) => ReportConfig::read_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => ReportConfig::default(),
    };

    if let Some(marker) = &cli.marker {
        config.team_marker = marker.clone();
    }
    if cli.no_teams {
        config.split_by_team = false;
    }
    if cli.week_start.is_some() {
        config.week_start = cli.week_start;
    }
    if cli.week_end.is_some() {
        config.week_end_date = cli.week_end;
    }
    if cli.impute {
        config.impute_close_dates = true;
    }
    config.holidays.extend(cli.holidays.iter().copied());
    if let Some(day_count) = cli.day_count {
        config.day_count = day_count;
    }
    if let Some(rule) = cli.not_an_issue {
        config.not_an_issue_rule = rule;
    }
    if let Some(delimiter) = cli.delimiter {
        config.delimiter = delimiter;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = build_config(&cli)?;
    let request = ReportRequest {
        input: cli.input.clone(),
        now: cli
            .now
            .unwrap_or_else(|| chrono::Local::now().naive_local()),
    };

    let outcome = run_report_logic(&config, &request)
        .with_context(|| format!("building report from {}", cli.input.display()))?;

    if cli.summary {
        eprintln!("{}", serde_json::to_string_pretty(&outcome.import)?);
    }

    match &cli.output {
        Some(path) => {
            let result = export_report(&outcome.report, cli.format, path)?;
            log::info!("{} bytes in {} ms", result.size_bytes, result.duration_ms);
        }
        None => {
            if cli.format == ExportFormat::Xlsx {
                bail!("xlsx output needs --output <FILE>");
            }
            let bytes = render(&outcome.report, cli.format)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
