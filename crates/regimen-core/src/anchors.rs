//! Daily anchor resolution.
//!
//! Turns the clock-time strings in [`Settings`] into absolute timestamps for
//! one calendar date. Items are positioned relative to these anchors.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::clock::{at, parse_clock_time};
use crate::error::ConfigError;
use crate::settings::Settings;

/// Breakfast sits this long after waking.
pub const BREAKFAST_AFTER_WAKE_MINUTES: i64 = 60;
/// Lunch sits this long after breakfast.
pub const LUNCH_AFTER_BREAKFAST_MINUTES: i64 = 240;

/// Lunch time used when there is no breakfast.
pub fn lunch_fallback() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// A named point in the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Wake,
    Breakfast,
    Lunch,
    Dinner,
    StudyStart,
    StudyEnd,
    Workout,
    Bed,
}

impl Anchor {
    pub const MEALS: [Anchor; 3] = [Anchor::Breakfast, Anchor::Lunch, Anchor::Dinner];

    pub fn is_meal(self) -> bool {
        Self::MEALS.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::Wake => "wake",
            Anchor::Breakfast => "breakfast",
            Anchor::Lunch => "lunch",
            Anchor::Dinner => "dinner",
            Anchor::StudyStart => "study_start",
            Anchor::StudyEnd => "study_end",
            Anchor::Workout => "workout",
            Anchor::Bed => "bed",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wake" => Ok(Anchor::Wake),
            "breakfast" => Ok(Anchor::Breakfast),
            "lunch" => Ok(Anchor::Lunch),
            "dinner" => Ok(Anchor::Dinner),
            "study_start" => Ok(Anchor::StudyStart),
            "study_end" => Ok(Anchor::StudyEnd),
            "workout" => Ok(Anchor::Workout),
            "bed" => Ok(Anchor::Bed),
            other => Err(ConfigError::InvalidValue {
                key: "anchor".to_string(),
                message: format!("unknown anchor '{other}'"),
            }),
        }
    }
}

/// Absolute timestamps for the anchors present on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorSet {
    pub date: NaiveDate,
    times: BTreeMap<Anchor, NaiveDateTime>,
}

impl AnchorSet {
    /// Resolve anchors for `date`.
    ///
    /// Breakfast is present only when `breakfast` is set and workout only
    /// when `workout_day` is set. A bed time at or before wake rolls over
    /// to the following day.
    pub fn resolve(
        settings: &Settings,
        date: NaiveDate,
        workout_day: bool,
        breakfast: bool,
    ) -> Result<Self, ConfigError> {
        let clock = |key: &str, value: &str| parse_clock_time(key, value).map(|t| at(date, t));

        let wake = clock("wake_time", &settings.wake_time)?;
        let mut bed = clock("bed_time", &settings.bed_time)?;
        if bed <= wake {
            bed += Duration::days(1);
        }

        let mut times = BTreeMap::new();
        times.insert(Anchor::Wake, wake);
        times.insert(Anchor::Bed, bed);
        times.insert(Anchor::Dinner, clock("dinner_time", &settings.dinner_time)?);
        times.insert(Anchor::StudyStart, clock("study_start", &settings.study_start)?);
        times.insert(Anchor::StudyEnd, clock("study_end", &settings.study_end)?);

        // Parse workout even on rest days so a bad value fails every run.
        let workout = clock("workout_time", &settings.workout_time)?;
        if workout_day {
            times.insert(Anchor::Workout, workout);
        }

        let lunch = if breakfast {
            let breakfast_at = wake + Duration::minutes(BREAKFAST_AFTER_WAKE_MINUTES);
            times.insert(Anchor::Breakfast, breakfast_at);
            breakfast_at + Duration::minutes(LUNCH_AFTER_BREAKFAST_MINUTES)
        } else {
            at(date, lunch_fallback())
        };
        times.insert(Anchor::Lunch, lunch);

        Ok(Self { date, times })
    }

    /// Resolve anchors using the per-weekday breakfast and workout settings.
    pub fn for_date(settings: &Settings, date: NaiveDate) -> Result<Self, ConfigError> {
        Self::resolve(
            settings,
            date,
            settings.is_workout_day(date),
            settings.has_breakfast(date),
        )
    }

    pub fn get(&self, anchor: Anchor) -> Option<NaiveDateTime> {
        self.times.get(&anchor).copied()
    }

    pub fn contains(&self, anchor: Anchor) -> bool {
        self.times.contains_key(&anchor)
    }

    /// Wake time. Always present.
    pub fn wake(&self) -> NaiveDateTime {
        self.times[&Anchor::Wake]
    }

    /// Bed time. Always present.
    pub fn bed(&self) -> NaiveDateTime {
        self.times[&Anchor::Bed]
    }

    /// Present meal anchors, earliest first.
    pub fn meals(&self) -> Vec<(Anchor, NaiveDateTime)> {
        let mut meals: Vec<_> = Anchor::MEALS
            .iter()
            .filter_map(|a| self.get(*a).map(|t| (*a, t)))
            .collect();
        meals.sort_by_key(|(_, t)| *t);
        meals
    }

    pub fn iter(&self) -> impl Iterator<Item = (Anchor, NaiveDateTime)> + '_ {
        self.times.iter().map(|(a, t)| (*a, *t))
    }
}
