use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::analyzer::calendar::holidays_between;
use crate::config::DayCount;
use crate::parser::types::Ticket;

/// Turnaround in days between two calendar dates.
///
/// Span per `day_count`, minus every holiday in `[created, closed]`, floored at 1.
pub fn turnaround_days(
    created: NaiveDate,
    closed: NaiveDate,
    holidays: &BTreeSet<NaiveDate>,
    day_count: DayCount,
) -> u32 {
    let span = (closed - created).num_days()
        + match day_count {
            DayCount::Inclusive => 1,
            DayCount::Exclusive => 0,
        };
    let worked = span - holidays_between(holidays, created, closed) as i64;
    worked.max(1) as u32
}

/// Turnaround of a ticket, None while it has no close date.
pub fn compute_turnaround_days(
    ticket: &Ticket,
    holidays: &BTreeSet<NaiveDate>,
    day_count: DayCount,
) -> Option<u32> {
    let closed = ticket.closed_at?;
    Some(turnaround_days(
        ticket.created_at.date(),
        closed.date(),
        holidays,
        day_count,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::classifier::tests::base_ticket;
    use crate::parser::deserializers::parse_ticket_datetime;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ticket(created: &str, closed: &str) -> Ticket {
        let mut t = base_ticket();
        t.created_at = parse_ticket_datetime(created).unwrap();
        t.closed_at = parse_ticket_datetime(closed);
        t
    }

    #[test]
    fn test_three_day_span_inclusive() {
        let t = ticket("01 Jul 2024 10:00 AM", "03 Jul 2024 02:00 PM");
        assert_eq!(
            compute_turnaround_days(&t, &BTreeSet::new(), DayCount::Inclusive),
            Some(3)
        );
    }

    #[test]
    fn test_holiday_inside_span_subtracted() {
        let t = ticket("01 Jul 2024 10:00 AM", "03 Jul 2024 02:00 PM");
        let holidays: BTreeSet<NaiveDate> = [d(2024, 7, 2)].into_iter().collect();
        assert_eq!(
            compute_turnaround_days(&t, &holidays, DayCount::Inclusive),
            Some(2)
        );
    }

    #[test]
    fn test_holiday_outside_span_ignored() {
        let t = ticket("01 Jul 2024 10:00 AM", "03 Jul 2024 02:00 PM");
        let holidays: BTreeSet<NaiveDate> = [d(2024, 6, 30), d(2024, 7, 4)].into_iter().collect();
        assert_eq!(
            compute_turnaround_days(&t, &holidays, DayCount::Inclusive),
            Some(3)
        );
    }

    #[test]
    fn test_same_day_is_one() {
        let t = ticket("01 Jul 2024 09:00 AM", "01 Jul 2024 05:00 PM");
        assert_eq!(
            compute_turnaround_days(&t, &BTreeSet::new(), DayCount::Inclusive),
            Some(1)
        );
        assert_eq!(
            compute_turnaround_days(&t, &BTreeSet::new(), DayCount::Exclusive),
            Some(1)
        );
    }

    #[test]
    fn test_exclusive_convention() {
        let t = ticket("01 Jul 2024 10:00 AM", "03 Jul 2024 02:00 PM");
        assert_eq!(
            compute_turnaround_days(&t, &BTreeSet::new(), DayCount::Exclusive),
            Some(2)
        );
    }

    #[test]
    fn test_holidays_never_below_floor() {
        let t = ticket("01 Jul 2024 10:00 AM", "02 Jul 2024 02:00 PM");
        let holidays: BTreeSet<NaiveDate> = [d(2024, 7, 1), d(2024, 7, 2)].into_iter().collect();
        assert_eq!(
            compute_turnaround_days(&t, &holidays, DayCount::Inclusive),
            Some(1)
        );
    }

    #[test]
    fn test_closed_before_created_floored() {
        let t = ticket("05 Jul 2024 10:00 AM", "01 Jul 2024 02:00 PM");
        assert_eq!(
            compute_turnaround_days(&t, &BTreeSet::new(), DayCount::Inclusive),
            Some(1)
        );
    }

    #[test]
    fn test_open_ticket_has_no_turnaround() {
        let t = ticket("01 Jul 2024 10:00 AM", "");
        assert_eq!(
            compute_turnaround_days(&t, &BTreeSet::new(), DayCount::Inclusive),
            None
        );
    }

    #[test]
    fn test_turnaround_always_at_least_one() {
        let holidays: BTreeSet<NaiveDate> = (1..=20).map(|day| d(2024, 7, day)).collect();
        for created in 1..=15 {
            for closed in 1..=15 {
                for day_count in [DayCount::Inclusive, DayCount::Exclusive] {
                    let tat =
                        turnaround_days(d(2024, 7, created), d(2024, 7, closed), &holidays, day_count);
                    assert!(tat >= 1);
                }
            }
        }
    }
}
