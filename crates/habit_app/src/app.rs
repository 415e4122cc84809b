use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use habit_core::{
    aggregate::CompletionStatus,
    habit::{Habit, HabitDraft, HabitFrequency, HabitUpdate},
    history,
    storage::FileStorage,
    HabitStore, HabitSummary,
};
use tracing::{debug, info};

const DEFAULT_DATA_DIR: &str = "lifeos-data";
const DEFAULT_HISTORY_DAYS: usize = 21;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub(crate) data_dir: PathBuf,
    pub(crate) history_days: usize,
    pub(crate) log_filter: String,
}

impl AppConfig {
    /// Reads `HABITS_DATA_DIR`, `HABITS_HISTORY_DAYS` and `HABITS_LOG`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(dir) = lookup("HABITS_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir.trim());
            }
        }
        if let Some(days) = lookup("HABITS_HISTORY_DAYS") {
            let value: usize = days
                .trim()
                .parse()
                .with_context(|| format!("HABITS_HISTORY_DAYS must be a positive integer, got `{days}`"))?;
            if value == 0 {
                bail!("HABITS_HISTORY_DAYS must be greater than zero");
            }
            config.history_days = value;
        }
        if let Some(filter) = lookup("HABITS_LOG") {
            if !filter.trim().is_empty() {
                config.log_filter = filter.trim().to_string();
            }
        }
        Ok(config)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            history_days: DEFAULT_HISTORY_DAYS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "lifeos_habits", about = "Track daily and weekly habits")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Create a habit
    Add {
        title: String,
        #[arg(long, value_enum, default_value_t = FrequencyArg::Daily)]
        frequency: FrequencyArg,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Edit a habit's fields
    Edit {
        habit: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_enum)]
        frequency: Option<FrequencyArg>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Flip the completion mark for a day (defaults to today)
    Toggle {
        habit: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a habit and its history
    Delete { habit: String },
    /// Print the dashboard
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FrequencyArg {
    Daily,
    Weekly,
}

impl From<FrequencyArg> for HabitFrequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Daily => HabitFrequency::Daily,
            FrequencyArg::Weekly => HabitFrequency::Weekly,
        }
    }
}

pub fn open_store(config: &AppConfig) -> HabitStore {
    info!(path = %config.data_dir.display(), "opening habit store");
    HabitStore::builder()
        .with_storage(FileStorage::new(&config.data_dir))
        .build()
}

pub fn run(config: AppConfig, command: Command) -> Result<()> {
    let store = open_store(&config);
    let output = execute(&store, &config, command)?;
    print!("{output}");
    Ok(())
}

/// Applies `command` to `store` and returns the text to print.
pub fn execute(store: &HabitStore, config: &AppConfig, command: Command) -> Result<String> {
    match command {
        Command::Add {
            title,
            frequency,
            description,
            color,
        } => {
            let title = title.trim();
            if title.is_empty() {
                bail!("habit title must not be empty");
            }
            let mut draft = HabitDraft::new(title, frequency.into());
            draft.description = description;
            draft.color = color;
            let habit = store.add_habit(draft);
            Ok(format!("added {} ({})\n", habit.title, short_id(&habit.id)))
        }
        Command::Edit {
            habit,
            title,
            frequency,
            description,
            color,
        } => {
            let habit = resolve_habit(store, &habit)?;
            if let Some(title) = &title {
                if title.trim().is_empty() {
                    bail!("habit title must not be empty");
                }
            }
            store.update_habit(
                &habit.id,
                HabitUpdate {
                    title: title.map(|t| t.trim().to_string()),
                    description: description.map(|d| Some(d).filter(|d| !d.is_empty())),
                    frequency: frequency.map(Into::into),
                    color: color.map(|c| Some(c).filter(|c| !c.is_empty())),
                },
            );
            let updated = store
                .habit(&habit.id)
                .ok_or_else(|| anyhow!("habit vanished during update"))?;
            Ok(format!(
                "updated {} ({}, {})\n",
                updated.title,
                short_id(&updated.id),
                frequency_label(updated.frequency)
            ))
        }
        Command::Toggle { habit, date } => {
            let habit = resolve_habit(store, &habit)?;
            let date = date.unwrap_or_else(|| store.today());
            store.toggle_habit_completion(&habit.id, date);
            let state = if store.is_habit_completed_for_date(&habit.id, date) {
                "done"
            } else {
                "not done"
            };
            Ok(format!("{} on {}: {}\n", habit.title, date, state))
        }
        Command::Delete { habit } => {
            let habit = resolve_habit(store, &habit)?;
            store.delete_habit(&habit.id);
            Ok(format!("deleted {} ({})\n", habit.title, short_id(&habit.id)))
        }
        Command::Show => Ok(render_dashboard(store, config.history_days)),
    }
}

/// Finds a habit by full id or unambiguous id prefix.
fn resolve_habit(store: &HabitStore, reference: &str) -> Result<Habit> {
    let reference = reference.trim();
    if let Some(habit) = store.habit(reference) {
        return Ok(habit);
    }
    let mut matches: Vec<Habit> = store
        .habits()
        .into_iter()
        .filter(|habit| !reference.is_empty() && habit.id.starts_with(reference))
        .collect();
    debug!(reference, candidates = matches.len(), "resolving habit reference");
    match matches.len() {
        0 => Err(anyhow!("no habit matches `{reference}`")),
        1 => Ok(matches.remove(0)),
        n => Err(anyhow!("`{reference}` matches {n} habits, use a longer prefix")),
    }
}

pub fn render_dashboard(store: &HabitStore, history_days: usize) -> String {
    let mut out = String::new();
    let today = store.today();
    let _ = writeln!(out, "Habits for {}", today.format("%A %Y-%m-%d"));
    let _ = writeln!(
        out,
        "Today: {}",
        format_status(store.today_completion_status(), "daily")
    );
    let _ = writeln!(
        out,
        "This week: {}",
        format_status(store.week_completion_status(), "weekly")
    );

    let summaries = store.habit_summaries();
    if summaries.is_empty() {
        let _ = writeln!(out, "\nNo habits yet.");
        return out;
    }
    for summary in &summaries {
        let periods = match summary.habit.frequency {
            HabitFrequency::Daily => history_days,
            HabitFrequency::Weekly => history_days.div_ceil(7),
        };
        let strip = history::render_history(&store.completion_history(&summary.habit.id, periods));
        let _ = writeln!(out);
        out.push_str(&format_summary(summary, &strip));
    }
    out
}

fn format_status(status: CompletionStatus, kind: &str) -> String {
    if status.total == 0 {
        return format!("no {kind} habits");
    }
    format!("{}/{} {kind} habits done", status.completed, status.total)
}

fn format_summary(summary: &HabitSummary, strip: &str) -> String {
    let HabitSummary { habit, stats } = summary;
    let unit = match habit.frequency {
        HabitFrequency::Daily => "day",
        HabitFrequency::Weekly => "week",
    };
    let plural = |n: u32| if n == 1 { "" } else { "s" };
    let mut line = format!(
        "[{}] {} ({})\n",
        frequency_label(habit.frequency),
        habit.title,
        short_id(&habit.id)
    );
    if let Some(description) = habit.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(line, "  {description}");
    }
    let _ = writeln!(
        line,
        "  streak {} {unit}{} (best {}) | {} done | {:.0}%",
        stats.current_streak,
        plural(stats.current_streak),
        stats.longest_streak,
        stats.total_completions,
        stats.completion_rate
    );
    let _ = writeln!(line, "  {strip}");
    line
}

fn frequency_label(frequency: HabitFrequency) -> &'static str {
    match frequency {
        HabitFrequency::Daily => "daily",
        HabitFrequency::Weekly => "weekly",
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use habit_core::clock::FixedClock;
    use habit_core::storage::MemoryStorage;
    use std::collections::HashMap;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 22).unwrap()
    }

    fn store() -> HabitStore {
        HabitStore::builder()
            .with_storage(MemoryStorage::new())
            .with_clock(FixedClock::on(today()))
            .build()
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn config_defaults_without_variables() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.history_days, 21);
    }

    #[test]
    fn config_reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HABITS_DATA_DIR", "/tmp/habits"),
            ("HABITS_HISTORY_DAYS", " 14 "),
            ("HABITS_LOG", "habit_core=debug"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir(), Path::new("/tmp/habits"));
        assert_eq!(config.history_days, 14);
        assert_eq!(config.log_filter(), "habit_core=debug");
    }

    #[test]
    fn config_rejects_bad_history_length() {
        assert!(AppConfig::from_lookup(lookup(&[("HABITS_HISTORY_DAYS", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("HABITS_HISTORY_DAYS", "lots")])).is_err());
    }

    #[test]
    fn commands_drive_the_store() {
        let store = store();
        let config = AppConfig::default();
        execute(
            &store,
            &config,
            Command::Add {
                title: "Read".into(),
                frequency: FrequencyArg::Daily,
                description: Some("Ten pages".into()),
                color: None,
            },
        )
        .unwrap();
        let habit = store.habits().remove(0);

        let toggled = execute(
            &store,
            &config,
            Command::Toggle {
                habit: habit.id[..6].to_string(),
                date: None,
            },
        )
        .unwrap();
        assert_eq!(toggled, "Read on 2025-10-22: done\n");

        let dashboard = execute(&store, &config, Command::Show).unwrap();
        assert!(dashboard.contains("Today: 1/1 daily habits done"));
        assert!(dashboard.contains("This week: no weekly habits"));
        assert!(dashboard.contains("streak 1 day (best 1) | 1 done | 100%"));
        assert!(dashboard.contains(&format!("{}X", ".".repeat(20))));

        execute(&store, &config, Command::Delete { habit: habit.id.clone() }).unwrap();
        assert!(store.habits().is_empty());
        assert!(store.logs().is_empty());
    }

    #[test]
    fn edit_and_weekly_history() {
        let store = store();
        let config = AppConfig::default();
        let habit = store.add_habit(HabitDraft::new("Review", HabitFrequency::Daily));
        execute(
            &store,
            &config,
            Command::Edit {
                habit: habit.id.clone(),
                title: Some("Weekly review".into()),
                frequency: Some(FrequencyArg::Weekly),
                description: None,
                color: Some("green".into()),
            },
        )
        .unwrap();
        let updated = store.habit(&habit.id).unwrap();
        assert_eq!(updated.frequency, HabitFrequency::Weekly);
        assert_eq!(updated.color.as_deref(), Some("green"));

        let dashboard = render_dashboard(&store, 21);
        assert!(dashboard.contains("[weekly] Weekly review"));
        assert!(dashboard.contains("\n  ...\n"));
    }

    #[test]
    fn rejects_empty_titles_and_unknown_habits() {
        let store = store();
        let config = AppConfig::default();
        let empty = Command::Add {
            title: "   ".into(),
            frequency: FrequencyArg::Weekly,
            description: None,
            color: None,
        };
        assert!(execute(&store, &config, empty).is_err());
        let missing = Command::Delete {
            habit: "nope".into(),
        };
        assert!(execute(&store, &config, missing).is_err());
    }

    #[test]
    fn run_persists_to_configured_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::default().with_data_dir(temp.path().join("data"));
        run(
            config.clone(),
            Command::Add {
                title: "Stretch".into(),
                frequency: FrequencyArg::Weekly,
                description: None,
                color: None,
            },
        )
        .unwrap();
        assert!(temp.path().join("data").join("habits.json").is_file());
        let reopened = open_store(&config);
        assert_eq!(reopened.habits().len(), 1);
        assert_eq!(reopened.habits()[0].frequency, HabitFrequency::Weekly);
    }

    #[test]
    fn cli_parses_toggle_with_date() {
        let cli = Cli::try_parse_from(["lifeos_habits", "toggle", "ab12", "--date", "2025-10-01"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Toggle {
                habit: "ab12".into(),
                date: NaiveDate::from_ymd_opt(2025, 10, 1),
            })
        );
        let cli = Cli::try_parse_from(["lifeos_habits"]).unwrap();
        assert!(cli.command.is_none());
    }
}
