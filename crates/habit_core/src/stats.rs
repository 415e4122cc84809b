use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::habit::{HabitFrequency, HabitLog};
use crate::streak::StreakSummary;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CompletionStats {
    pub total_completions: u32,
    /// Percentage in `[0, 100]`.
    pub completion_rate: f64,
}

/// Everything a habit card displays. Unknown habits yield `HabitStats::default()`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct HabitStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completions: u32,
    pub completion_rate: f64,
}

impl HabitStats {
    pub fn new(streaks: StreakSummary, completion: CompletionStats) -> Self {
        Self {
            current_streak: streaks.current,
            longest_streak: streaks.longest,
            total_completions: completion.total_completions,
            completion_rate: completion.completion_rate,
        }
    }
}

/// Completed logs measured against the number of periods since the habit was
/// created, counting the creation period itself.
pub fn completion_stats(
    logs: &[HabitLog],
    frequency: HabitFrequency,
    created_on: NaiveDate,
    today: NaiveDate,
) -> CompletionStats {
    let total_completions = logs.iter().filter(|log| log.completed).count() as u32;
    let expected = expected_completions(frequency, created_on, today);
    let rate = f64::from(total_completions) / expected as f64 * 100.0;
    CompletionStats {
        total_completions,
        completion_rate: rate.clamp(0.0, 100.0),
    }
}

pub fn expected_completions(frequency: HabitFrequency, created_on: NaiveDate, today: NaiveDate) -> i64 {
    let days_since_creation = today.signed_duration_since(created_on).num_days().max(0);
    match frequency {
        HabitFrequency::Daily => days_since_creation + 1,
        HabitFrequency::Weekly => days_since_creation / 7 + 1,
    }
}
