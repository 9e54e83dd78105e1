//! Multi-week schedule generation.
//!
//! Repeats the [`DayAllocator`] over `weeks × 7` consecutive dates, merges
//! each day with its routine tasks and keys the result by ISO date. Days are
//! independent: nothing allocated on one date influences another.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::allocator::DayAllocator;
use crate::catalog::Catalog;
use crate::error::{ConfigError, Result};
use crate::interactions::{Interaction, InteractionChecker};
use crate::placement::{PlacedItem, Warning};
use crate::routine::{RoutineSource, SettingsRoutines, TaskEntry};
use crate::settings::Settings;

/// One line of a day's schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleEntry {
    Item(PlacedItem),
    Task(TaskEntry),
}

impl ScheduleEntry {
    pub fn time(&self) -> NaiveDateTime {
        match self {
            ScheduleEntry::Item(p) => p.time,
            ScheduleEntry::Task(t) => t.time,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ScheduleEntry::Item(p) => &p.item.name,
            ScheduleEntry::Task(t) => &t.name,
        }
    }

    pub fn as_item(&self) -> Option<&PlacedItem> {
        match self {
            ScheduleEntry::Item(p) => Some(p),
            ScheduleEntry::Task(_) => None,
        }
    }
}

/// `YYYY-MM-DD` -> entries, earliest first.
pub type Schedule = BTreeMap<String, Vec<ScheduleEntry>>;

/// Everything produced by one planning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanOutput {
    pub schedule: Schedule,
    pub warnings: Vec<Warning>,
    /// `YYYY-MM-DD` -> interactions reported for that day
    pub interactions: BTreeMap<String, Vec<Interaction>>,
}

/// Drives the day allocator across a date range.
pub struct Planner<'a> {
    catalog: &'a Catalog,
    settings: &'a Settings,
    routines: Option<&'a dyn RoutineSource>,
    checker: Option<&'a dyn InteractionChecker>,
}

impl<'a> Planner<'a> {
    pub fn new(catalog: &'a Catalog, settings: &'a Settings) -> Self {
        Self {
            catalog,
            settings,
            routines: None,
            checker: None,
        }
    }

    /// Use a custom routine source instead of the routines in settings.
    pub fn with_routines(mut self, routines: &'a dyn RoutineSource) -> Self {
        self.routines = Some(routines);
        self
    }

    pub fn with_checker(mut self, checker: &'a dyn InteractionChecker) -> Self {
        self.checker = Some(checker);
        self
    }

    /// Generate `weeks × 7` days starting at `start`.
    ///
    /// Settings are validated up front so a malformed field aborts the run
    /// before any day is produced.
    pub fn generate(&self, start: NaiveDate, weeks: u32) -> Result<PlanOutput> {
        self.settings.validate()?;

        let days = i64::from(weeks) * 7;
        start
            .checked_add_signed(Duration::days(days))
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "weeks".to_string(),
                message: format!("{weeks} weeks from {start} is past the last representable date"),
            })?;

        let settings_routines = SettingsRoutines::new(&self.settings.routines);
        let routines: &dyn RoutineSource = match self.routines {
            Some(custom) => custom,
            None => &settings_routines,
        };

        let mut allocator = DayAllocator::new(self.catalog, self.settings);
        if let Some(checker) = self.checker {
            allocator = allocator.with_checker(checker);
        }

        let mut output = PlanOutput::default();

        for offset in 0..days {
            let date = start + Duration::days(offset);
            let key = date.format("%Y-%m-%d").to_string();

            let mut entries: Vec<ScheduleEntry> = routines
                .tasks_for(date)?
                .into_iter()
                .map(ScheduleEntry::Task)
                .collect();

            if self.settings.supplements_enabled {
                let plan = allocator.allocate(date)?;
                entries.extend(plan.placed.into_iter().map(ScheduleEntry::Item));
                output.warnings.extend(plan.warnings);
                if !plan.interactions.is_empty() {
                    output.interactions.insert(key.clone(), plan.interactions);
                }
            }

            entries.sort_by_key(|e| e.time());
            output.schedule.insert(key, entries);
        }

        info!(
            %start,
            weeks,
            days = output.schedule.len(),
            warnings = output.warnings.len(),
            "plan generated"
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::Anchor;
    use crate::catalog::ItemDefinition;
    use crate::settings::RoutineTask;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn walk() -> RoutineTask {
        RoutineTask {
            name: "Walk".to_string(),
            time: "12:45".to_string(),
            days: [true; 7],
            notes: None,
        }
    }

    #[test]
    fn generates_every_day_in_range() {
        let settings = Settings::default();
        let catalog = Catalog::standard();
        let out = Planner::new(&catalog, &settings).generate(monday(), 2).unwrap();

        assert_eq!(out.schedule.len(), 14);
        assert!(out.schedule.contains_key("2024-03-04"));
        assert!(out.schedule.contains_key("2024-03-17"));
        for entries in out.schedule.values() {
            assert!(entries.windows(2).all(|w| w[0].time() <= w[1].time()));
        }
    }

    #[test]
    fn routines_merge_with_items() {
        let settings = Settings {
            routines: vec![walk()],
            ..Settings::default()
        };
        let catalog = Catalog::new(vec![
            ItemDefinition::new("omega3", "Omega-3", Anchor::Lunch, 0),
            ItemDefinition::new("zinc", "Zinc", Anchor::Dinner, 10),
        ])
        .unwrap();
        let out = Planner::new(&catalog, &settings).generate(monday(), 1).unwrap();

        let day = &out.schedule["2024-03-04"];
        let names: Vec<_> = day.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Omega-3", "Walk", "Zinc"]);
        assert!(day[1].as_item().is_none());
    }

    #[test]
    fn supplements_switch_leaves_routines() {
        let settings = Settings {
            supplements_enabled: false,
            routines: vec![walk()],
            ..Settings::default()
        };
        let catalog = Catalog::standard();
        let out = Planner::new(&catalog, &settings).generate(monday(), 1).unwrap();
        assert!(out
            .schedule
            .values()
            .all(|day| day.len() == 1 && day[0].name() == "Walk"));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn zero_weeks_is_empty() {
        let settings = Settings::default();
        let catalog = Catalog::standard();
        let out = Planner::new(&catalog, &settings).generate(monday(), 0).unwrap();
        assert!(out.schedule.is_empty());
    }

    #[test]
    fn malformed_settings_abort_before_any_day() {
        let settings = Settings {
            bed_time: "late".to_string(),
            ..Settings::default()
        };
        let catalog = Catalog::standard();
        let err = Planner::new(&catalog, &settings).generate(monday(), 1).unwrap_err();
        assert!(err.to_string().contains("bed_time"));
    }

    #[test]
    fn oversized_range_is_a_config_error() {
        let settings = Settings::default();
        let catalog = Catalog::standard();
        let err = Planner::new(&catalog, &settings)
            .generate(monday(), u32::MAX)
            .unwrap_err();
        assert!(err.to_string().contains("weeks"));

        let near_end = NaiveDate::MAX - Duration::days(3);
        assert!(Planner::new(&catalog, &settings).generate(near_end, 1).is_err());
    }

    struct FixedRoutines;

    impl RoutineSource for FixedRoutines {
        fn tasks_for(&self, date: NaiveDate) -> std::result::Result<Vec<TaskEntry>, ConfigError> {
            Ok(vec![TaskEntry {
                name: "Journal".to_string(),
                time: date.and_hms_opt(21, 0, 0).unwrap_or_default(),
                notes: None,
            }])
        }
    }

    #[test]
    fn custom_routine_source() {
        let settings = Settings {
            supplements_enabled: false,
            routines: vec![walk()],
            ..Settings::default()
        };
        let catalog = Catalog::standard();
        let source = FixedRoutines;
        let out = Planner::new(&catalog, &settings)
            .with_routines(&source)
            .generate(monday(), 1)
            .unwrap();
        assert_eq!(out.schedule["2024-03-05"][0].name(), "Journal");
    }
}
