use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cadence::{week_end, week_start};
use crate::habit::{Habit, HabitFrequency, HabitLog};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionStatus {
    pub completed: usize,
    pub total: usize,
}

/// Daily habits checked off on `today`.
pub fn today_completion_status(habits: &[Habit], logs: &[HabitLog], today: NaiveDate) -> CompletionStatus {
    status_for(habits, logs, HabitFrequency::Daily, |date| date == today)
}

/// Weekly habits with at least one completion between Monday and Sunday of
/// the week containing `today`.
pub fn week_completion_status(habits: &[Habit], logs: &[HabitLog], today: NaiveDate) -> CompletionStatus {
    let start = week_start(today);
    let end = week_end(today);
    status_for(habits, logs, HabitFrequency::Weekly, |date| {
        date >= start && date <= end
    })
}

fn status_for(
    habits: &[Habit],
    logs: &[HabitLog],
    frequency: HabitFrequency,
    in_window: impl Fn(NaiveDate) -> bool,
) -> CompletionStatus {
    let mut status = CompletionStatus::default();
    for habit in habits.iter().filter(|habit| habit.frequency == frequency) {
        status.total += 1;
        let done = logs
            .iter()
            .any(|log| log.habit_id == habit.id && log.completed && in_window(log.date));
        if done {
            status.completed += 1;
        }
    }
    status
}
