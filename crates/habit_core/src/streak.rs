use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cadence::Cadence;
use crate::habit::HabitLog;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
}

pub fn streak_summary(logs: &[HabitLog], cadence: &dyn Cadence, today: NaiveDate) -> StreakSummary {
    StreakSummary {
        current: current_streak(logs, cadence, today),
        longest: longest_streak(logs, cadence),
    }
}

/// Consecutive periods with a completion, counted backward from the period
/// containing `today`. A period without a completion ends the run, so the
/// current period must itself be completed for the streak to be non-zero.
pub fn current_streak(logs: &[HabitLog], cadence: &dyn Cadence, today: NaiveDate) -> u32 {
    let periods = completed_periods(logs, cadence);
    let Some(latest) = periods.last().copied() else {
        return 0;
    };

    let current = cadence.period_start(today);
    if cadence.periods_between(latest, current) > 1 {
        return 0;
    }

    let mut streak = 0;
    let mut expected = Some(current);
    while let Some(period) = expected {
        if !periods.contains(&period) {
            break;
        }
        streak += 1;
        expected = cadence.previous(period);
    }
    streak
}

/// Longest run of back-to-back completed periods anywhere in the history.
pub fn longest_streak(logs: &[HabitLog], cadence: &dyn Cadence) -> u32 {
    let periods = completed_periods(logs, cadence);
    let mut iter = periods.iter().copied();
    let Some(mut previous) = iter.next() else {
        return 0;
    };

    let mut running = 1;
    let mut longest = 1;
    for period in iter {
        if cadence.next(previous) == Some(period) {
            running += 1;
            longest = longest.max(running);
        } else {
            running = 1;
        }
        previous = period;
    }
    longest
}

/// Distinct period starts that hold at least one completed log, ascending.
pub(crate) fn completed_periods(logs: &[HabitLog], cadence: &dyn Cadence) -> BTreeSet<NaiveDate> {
    logs.iter()
        .filter(|log| log.completed)
        .map(|log| cadence.period_start(log.date))
        .collect()
}
