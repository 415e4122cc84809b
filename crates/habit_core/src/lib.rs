pub mod aggregate;
pub mod cadence;
pub mod clock;
pub mod error;
pub mod habit;
pub mod history;
pub mod service;
pub mod stats;
pub mod storage;
pub mod streak;

pub use crate::service::{HabitStore, HabitStoreBuilder, HabitSummary};
