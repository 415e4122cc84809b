use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cadence::{Cadence, DAILY, WEEKLY};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub frequency: HabitFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HabitLog {
    pub habit_id: String,
    pub date: NaiveDate,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    Daily,
    Weekly,
}

impl HabitFrequency {
    /// Period arithmetic used by the streak and history calculations.
    pub fn cadence(self) -> &'static dyn Cadence {
        match self {
            HabitFrequency::Daily => &DAILY,
            HabitFrequency::Weekly => &WEEKLY,
        }
    }
}

/// Fields supplied by the caller when creating a habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    pub title: String,
    pub description: Option<String>,
    pub frequency: HabitFrequency,
    pub color: Option<String>,
}

impl HabitDraft {
    pub fn new(title: impl Into<String>, frequency: HabitFrequency) -> Self {
        Self {
            title: title.into(),
            description: None,
            frequency,
            color: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Partial edit of a habit. `None` leaves a field untouched; the nested
/// options on `description` and `color` allow clearing them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub frequency: Option<HabitFrequency>,
    pub color: Option<Option<String>>,
}

impl HabitUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.frequency.is_none()
            && self.color.is_none()
    }
}

impl Habit {
    pub(crate) fn apply(&mut self, update: HabitUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(frequency) = update.frequency {
            self.frequency = frequency;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
    }
}
