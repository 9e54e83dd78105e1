//! Non-supplement recurring tasks.
//!
//! Routine tasks are generated independently of item allocation and merged
//! into each day's schedule by the planner.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::clock::{at, parse_clock_time};
use crate::error::ConfigError;
use crate::settings::{weekday_index, RoutineTask};

/// A routine task bound to a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    pub name: String,
    pub time: NaiveDateTime,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Source of routine tasks for a date.
pub trait RoutineSource {
    fn tasks_for(&self, date: NaiveDate) -> Result<Vec<TaskEntry>, ConfigError>;
}

/// Routine tasks declared in settings.
pub struct SettingsRoutines<'a> {
    routines: &'a [RoutineTask],
}

impl<'a> SettingsRoutines<'a> {
    pub fn new(routines: &'a [RoutineTask]) -> Self {
        Self { routines }
    }
}

impl RoutineSource for SettingsRoutines<'_> {
    fn tasks_for(&self, date: NaiveDate) -> Result<Vec<TaskEntry>, ConfigError> {
        let weekday = weekday_index(date);
        self.routines
            .iter()
            .enumerate()
            .filter(|(_, r)| r.days[weekday])
            .map(|(i, r)| {
                let time = parse_clock_time(&format!("routines[{i}].time"), &r.time)?;
                Ok(TaskEntry {
                    name: r.name.clone(),
                    time: at(date, time),
                    notes: r.notes.clone(),
                })
            })
            .collect()
    }
}
