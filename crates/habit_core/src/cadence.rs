use chrono::{Datelike, Days, NaiveDate};

/// Calendar period arithmetic for a habit frequency. Periods are identified
/// by their first day.
pub trait Cadence: Send + Sync {
    /// First day of the period containing `date`.
    fn period_start(&self, date: NaiveDate) -> NaiveDate;

    fn previous(&self, period: NaiveDate) -> Option<NaiveDate>;

    fn next(&self, period: NaiveDate) -> Option<NaiveDate>;

    /// Whole periods from `earlier` to `later`; negative when `later` comes first.
    fn periods_between(&self, earlier: NaiveDate, later: NaiveDate) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DailyCadence;

#[derive(Debug, Clone, Copy, Default)]
pub struct WeeklyCadence;

pub static DAILY: DailyCadence = DailyCadence;
pub static WEEKLY: WeeklyCadence = WeeklyCadence;

impl Cadence for DailyCadence {
    fn period_start(&self, date: NaiveDate) -> NaiveDate {
        date
    }

    fn previous(&self, period: NaiveDate) -> Option<NaiveDate> {
        period.pred_opt()
    }

    fn next(&self, period: NaiveDate) -> Option<NaiveDate> {
        period.succ_opt()
    }

    fn periods_between(&self, earlier: NaiveDate, later: NaiveDate) -> i64 {
        later.signed_duration_since(earlier).num_days()
    }
}

impl Cadence for WeeklyCadence {
    fn period_start(&self, date: NaiveDate) -> NaiveDate {
        week_start(date)
    }

    fn previous(&self, period: NaiveDate) -> Option<NaiveDate> {
        period.checked_sub_days(Days::new(7))
    }

    fn next(&self, period: NaiveDate) -> Option<NaiveDate> {
        period.checked_add_days(Days::new(7))
    }

    fn periods_between(&self, earlier: NaiveDate, later: NaiveDate) -> i64 {
        week_start(later)
            .signed_duration_since(week_start(earlier))
            .num_days()
            / 7
    }
}

/// Monday of the week containing `date`. Sunday belongs to the week that
/// started six days earlier.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset))
        .unwrap_or(NaiveDate::MIN)
}

/// Last day (Sunday) of the week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    let start = week_start(date);
    start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_starts_on_monday_and_sunday_closes_the_week() {
        // 2025-10-20 is a Monday.
        assert_eq!(week_start(day(2025, 10, 20)), day(2025, 10, 20));
        assert_eq!(week_start(day(2025, 10, 23)), day(2025, 10, 20));
        assert_eq!(week_start(day(2025, 10, 26)), day(2025, 10, 20));
        assert_eq!(week_start(day(2025, 10, 27)), day(2025, 10, 27));
        assert_eq!(week_end(day(2025, 10, 22)), day(2025, 10, 26));
    }

    #[test]
    fn week_start_crosses_month_and_year_boundaries() {
        // Thursday 2026-01-01 belongs to the week starting Monday 2025-12-29.
        assert_eq!(week_start(day(2026, 1, 1)), day(2025, 12, 29));
        // Sunday 2024-03-03 of a leap year belongs to Monday 2024-02-26.
        assert_eq!(week_start(day(2024, 3, 3)), day(2024, 2, 26));
    }

    #[test]
    fn weekly_periods_between_counts_calendar_weeks() {
        // Sunday to the following Monday is one week apart.
        assert_eq!(WEEKLY.periods_between(day(2025, 10, 26), day(2025, 10, 27)), 1);
        assert_eq!(WEEKLY.periods_between(day(2025, 10, 20), day(2025, 10, 26)), 0);
        assert_eq!(WEEKLY.periods_between(day(2025, 10, 6), day(2025, 10, 22)), 2);
        assert_eq!(DAILY.periods_between(day(2024, 2, 28), day(2024, 3, 1)), 2);
    }

    #[test]
    fn stepping_moves_one_period() {
        assert_eq!(DAILY.previous(day(2024, 3, 1)), Some(day(2024, 2, 29)));
        assert_eq!(WEEKLY.next(day(2025, 12, 29)), Some(day(2026, 1, 5)));
        assert_eq!(DAILY.previous(NaiveDate::MIN), None);
    }
}
