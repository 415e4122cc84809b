use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cadence::Cadence;
use crate::habit::HabitLog;
use crate::streak::completed_periods;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryCell {
    pub period_start: NaiveDate,
    pub completed: bool,
}

/// The last `periods` periods up to and including the one containing
/// `today`, oldest first.
pub fn completion_history(
    logs: &[HabitLog],
    cadence: &dyn Cadence,
    today: NaiveDate,
    periods: usize,
) -> Vec<HistoryCell> {
    let completed = completed_periods(logs, cadence);
    let mut cells = Vec::with_capacity(periods);
    let mut cursor = Some(cadence.period_start(today));
    while cells.len() < periods {
        let Some(period) = cursor else {
            break;
        };
        cells.push(HistoryCell {
            period_start: period,
            completed: completed.contains(&period),
        });
        cursor = cadence.previous(period);
    }
    cells.reverse();
    cells
}

/// `X` for a completed period, `.` for a missed one.
pub fn render_history(cells: &[HistoryCell]) -> String {
    cells
        .iter()
        .map(|cell| if cell.completed { 'X' } else { '.' })
        .collect()
}
