use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    aggregate::{self, CompletionStatus},
    clock::{local_date, Clock, SystemClock},
    habit::{Habit, HabitDraft, HabitLog, HabitUpdate},
    history::{self, HistoryCell},
    stats::{self, CompletionStats, HabitStats},
    storage::{self, KeyValueStorage, MemoryStorage, HABITS_KEY, LOGS_KEY},
    streak::{self, StreakSummary},
};

#[derive(Debug, Default)]
struct HabitState {
    habits: Vec<Habit>,
    logs: Vec<HabitLog>,
}

/// A habit together with its statistics as of the store's current day.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitSummary {
    pub habit: Habit,
    pub stats: HabitStats,
}

/// Owns every habit and completion log and keeps the storage records in step
/// with the in-memory copy. None of its operations fail: storage problems are
/// logged and unknown ids are ignored.
pub struct HabitStore {
    state: RwLock<HabitState>,
    storage: Box<dyn KeyValueStorage>,
    clock: Box<dyn Clock>,
}

pub struct HabitStoreBuilder {
    storage: Option<Box<dyn KeyValueStorage>>,
    clock: Option<Box<dyn Clock>>,
}

impl HabitStoreBuilder {
    pub fn new() -> Self {
        Self {
            storage: None,
            clock: None,
        }
    }

    pub fn with_storage(mut self, storage: impl KeyValueStorage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn build(self) -> HabitStore {
        let storage = self
            .storage
            .unwrap_or_else(|| Box::new(MemoryStorage::new()));
        let clock = self.clock.unwrap_or_else(|| Box::new(SystemClock));
        let state = HabitState {
            habits: storage::load_collection(storage.as_ref(), HABITS_KEY),
            logs: storage::load_collection(storage.as_ref(), LOGS_KEY),
        };
        tracing::debug!(
            habits = state.habits.len(),
            logs = state.logs.len(),
            "habit store loaded"
        );
        HabitStore {
            state: RwLock::new(state),
            storage,
            clock,
        }
    }
}

impl Default for HabitStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitStore {
    pub fn builder() -> HabitStoreBuilder {
        HabitStoreBuilder::new()
    }

    pub fn habits(&self) -> Vec<Habit> {
        self.state.read().habits.clone()
    }

    pub fn habit(&self, id: &str) -> Option<Habit> {
        self.state
            .read()
            .habits
            .iter()
            .find(|habit| habit.id == id)
            .cloned()
    }

    pub fn logs(&self) -> Vec<HabitLog> {
        self.state.read().logs.clone()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub fn add_habit(&self, draft: HabitDraft) -> Habit {
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            frequency: draft.frequency,
            color: draft.color,
            created_at: self.clock.now(),
        };
        let mut state = self.state.write();
        state.habits.push(habit.clone());
        tracing::debug!(id = %habit.id, frequency = ?habit.frequency, "habit added");
        self.persist(&state);
        habit
    }

    /// Merges `update` into the habit. A frequency change is dropped once the
    /// habit has logs, since those logs were recorded against the old cadence.
    #[instrument(skip(self, update))]
    pub fn update_habit(&self, id: &str, mut update: HabitUpdate) {
        let mut state = self.state.write();
        let has_logs = state.logs.iter().any(|log| log.habit_id == id);
        let Some(habit) = state.habits.iter_mut().find(|habit| habit.id == id) else {
            tracing::debug!("update for unknown habit ignored");
            return;
        };
        if let Some(frequency) = update.frequency {
            if frequency != habit.frequency && has_logs {
                tracing::warn!(
                    current = ?habit.frequency,
                    requested = ?frequency,
                    "frequency change rejected for habit with completion history"
                );
                update.frequency = None;
            }
        }
        if update.is_empty() {
            return;
        }
        habit.apply(update);
        self.persist(&state);
    }

    /// Removes the habit together with all of its logs.
    #[instrument(skip(self))]
    pub fn delete_habit(&self, id: &str) {
        let mut state = self.state.write();
        let before = state.habits.len();
        state.habits.retain(|habit| habit.id != id);
        if state.habits.len() == before {
            tracing::debug!("delete for unknown habit ignored");
            return;
        }
        let logs_before = state.logs.len();
        state.logs.retain(|log| log.habit_id != id);
        tracing::debug!(removed_logs = logs_before - state.logs.len(), "habit deleted");
        self.persist(&state);
    }

    /// Flips the completion mark for `date`, creating a completed log on
    /// first use. Calling it twice restores the previous state.
    #[instrument(skip(self))]
    pub fn toggle_habit_completion(&self, habit_id: &str, date: NaiveDate) {
        let now = self.clock.now();
        let mut state = self.state.write();
        match state
            .logs
            .iter_mut()
            .find(|log| log.habit_id == habit_id && log.date == date)
        {
            Some(log) => {
                log.completed = !log.completed;
                log.completed_at = log.completed.then_some(now);
                tracing::debug!(completed = log.completed, "habit log toggled");
            }
            None => {
                state.logs.push(HabitLog {
                    habit_id: habit_id.to_string(),
                    date,
                    completed: true,
                    completed_at: Some(now),
                });
                tracing::debug!("habit log created");
            }
        }
        self.persist(&state);
    }

    pub fn habit_logs(&self, habit_id: &str) -> Vec<HabitLog> {
        self.state
            .read()
            .logs
            .iter()
            .filter(|log| log.habit_id == habit_id)
            .cloned()
            .collect()
    }

    pub fn is_habit_completed_for_date(&self, habit_id: &str, date: NaiveDate) -> bool {
        self.state
            .read()
            .logs
            .iter()
            .any(|log| log.habit_id == habit_id && log.date == date && log.completed)
    }

    pub fn streaks(&self, habit_id: &str) -> StreakSummary {
        let Some(habit) = self.habit(habit_id) else {
            return StreakSummary::default();
        };
        let logs = self.habit_logs(habit_id);
        streak::streak_summary(&logs, habit.frequency.cadence(), self.today())
    }

    pub fn completion_stats(&self, habit_id: &str) -> CompletionStats {
        let Some(habit) = self.habit(habit_id) else {
            return CompletionStats::default();
        };
        let logs = self.habit_logs(habit_id);
        stats::completion_stats(
            &logs,
            habit.frequency,
            local_date(habit.created_at),
            self.today(),
        )
    }

    pub fn habit_stats(&self, habit_id: &str) -> HabitStats {
        let state = self.state.read();
        let Some(habit) = state.habits.iter().find(|habit| habit.id == habit_id) else {
            return HabitStats::default();
        };
        Self::stats_for(habit, &state.logs, self.today())
    }

    pub fn habit_summaries(&self) -> Vec<HabitSummary> {
        let state = self.state.read();
        let today = self.today();
        state
            .habits
            .iter()
            .map(|habit| HabitSummary {
                habit: habit.clone(),
                stats: Self::stats_for(habit, &state.logs, today),
            })
            .collect()
    }

    /// Per-period completion marks for the last `periods` periods, oldest first.
    pub fn completion_history(&self, habit_id: &str, periods: usize) -> Vec<HistoryCell> {
        let Some(habit) = self.habit(habit_id) else {
            return Vec::new();
        };
        let logs = self.habit_logs(habit_id);
        history::completion_history(&logs, habit.frequency.cadence(), self.today(), periods)
    }

    pub fn today_completion_status(&self) -> CompletionStatus {
        let state = self.state.read();
        aggregate::today_completion_status(&state.habits, &state.logs, self.today())
    }

    pub fn week_completion_status(&self) -> CompletionStatus {
        let state = self.state.read();
        aggregate::week_completion_status(&state.habits, &state.logs, self.today())
    }
}

impl HabitStore {
    fn stats_for(habit: &Habit, all_logs: &[HabitLog], today: NaiveDate) -> HabitStats {
        let logs: Vec<HabitLog> = all_logs
            .iter()
            .filter(|log| log.habit_id == habit.id)
            .cloned()
            .collect();
        let streaks = streak::streak_summary(&logs, habit.frequency.cadence(), today);
        let completion =
            stats::completion_stats(&logs, habit.frequency, local_date(habit.created_at), today);
        HabitStats::new(streaks, completion)
    }

    fn persist(&self, state: &HabitState) {
        if let Err(err) = storage::save_collection(self.storage.as_ref(), HABITS_KEY, &state.habits) {
            tracing::warn!(key = HABITS_KEY, %err, "failed to persist habits");
        }
        if let Err(err) = storage::save_collection(self.storage.as_ref(), LOGS_KEY, &state.logs) {
            tracing::warn!(key = LOGS_KEY, %err, "failed to persist habit logs");
        }
    }
}
