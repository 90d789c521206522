use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};

const FRIDAY: i64 = 4; // Monday = 0

fn days_until_friday(date: NaiveDate) -> i64 {
    (FRIDAY - date.weekday().num_days_from_monday() as i64).rem_euclid(7)
}

/// Friday closing the reporting week of `date`: `date` itself on a Friday,
/// otherwise the first Friday after it (Saturday and Sunday roll into the
/// following Friday, reporting weeks running Saturday to Friday).
pub fn friday_of_week(date: NaiveDate) -> NaiveDate {
    date + Duration::days(days_until_friday(date))
}

/// First Friday strictly after `date` (a Friday yields the one a week later).
pub fn next_friday(date: NaiveDate) -> NaiveDate {
    match days_until_friday(date) {
        0 => date + Duration::days(7),
        n => date + Duration::days(n),
    }
}

/// Number of holidays in `[from, to]`, bounds included. Zero when `to < from`.
pub fn holidays_between(holidays: &BTreeSet<NaiveDate>, from: NaiveDate, to: NaiveDate) -> usize {
    if to < from {
        return 0;
    }
    holidays.range(from..=to).count()
}
