//! TOML-based user settings.
//!
//! Stores the inputs the allocator needs:
//! - Daily clock times (wake, bed, dinner, study block, workout)
//! - Per-weekday breakfast and workout arrays (index 0 = Monday)
//! - Fasting mode, level and feeding window
//! - Optional-item toggles and routine tasks
//!
//! The core never decides where settings live; callers pass a path to
//! [`Settings::load`] / [`Settings::save`] or parse a string directly.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::clock::parse_clock_time;
use crate::error::{ConfigError, Result};

/// How breakfast applies across the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BreakfastMode {
    /// Breakfast every day
    #[default]
    Always,
    /// Breakfast on the days flagged in `breakfast_days`
    Sometimes,
    /// No breakfast
    Skip,
}

/// Whether fasting mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FastingMode {
    #[default]
    Off,
    On,
}

/// How strictly deferrable items are treated while fasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FastingLevel {
    /// Deferrable items move into the feeding window
    #[default]
    Light,
    /// Deferrable items are skipped
    Strict,
}

/// Daily interval in which eating (and deferred items) is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedingWindow {
    #[serde(default = "default_feeding_start")]
    pub start: String,
    #[serde(default = "default_feeding_end")]
    pub end: String,
}

/// Fasting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FastingSettings {
    #[serde(default)]
    pub mode: FastingMode,
    #[serde(default)]
    pub level: FastingLevel,
    #[serde(default)]
    pub feeding_window: FeedingWindow,
}

impl FastingSettings {
    pub fn is_on(&self) -> bool {
        self.mode == FastingMode::On
    }

    /// Parsed feeding window bounds, validated so that start < end.
    pub fn window_times(&self) -> Result<(NaiveTime, NaiveTime), ConfigError> {
        let start = parse_clock_time("fasting.feeding_window.start", &self.feeding_window.start)?;
        let end = parse_clock_time("fasting.feeding_window.end", &self.feeding_window.end)?;
        if end <= start {
            return Err(ConfigError::InvalidValue {
                key: "fasting.feeding_window".to_string(),
                message: format!(
                    "end ({}) must be later than start ({})",
                    self.feeding_window.end, self.feeding_window.start
                ),
            });
        }
        Ok((start, end))
    }
}

/// A non-supplement task repeated on selected weekdays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineTask {
    pub name: String,
    /// HH:MM
    pub time: String,
    #[serde(default = "default_all_days")]
    pub days: [bool; 7],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// User settings.
///
/// Serialized to/from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_wake_time")]
    pub wake_time: String,
    #[serde(default = "default_bed_time")]
    pub bed_time: String,
    #[serde(default = "default_dinner_time")]
    pub dinner_time: String,
    #[serde(default = "default_study_start")]
    pub study_start: String,
    #[serde(default = "default_study_end")]
    pub study_end: String,
    #[serde(default = "default_workout_time")]
    pub workout_time: String,
    #[serde(default)]
    pub breakfast_mode: BreakfastMode,
    /// Index 0 = Monday
    #[serde(default = "default_all_days")]
    pub breakfast_days: [bool; 7],
    /// Index 0 = Monday
    #[serde(default = "default_workout_days")]
    pub workout_days: [bool; 7],
    #[serde(default)]
    pub fasting: FastingSettings,
    /// Optional item key -> enabled
    #[serde(default)]
    pub optional_items: BTreeMap<String, bool>,
    #[serde(default = "default_true")]
    pub supplements_enabled: bool,
    #[serde(default)]
    pub routines: Vec<RoutineTask>,
}

// Default functions
fn default_wake_time() -> String {
    "07:00".into()
}
fn default_bed_time() -> String {
    "23:00".into()
}
fn default_dinner_time() -> String {
    "18:30".into()
}
fn default_study_start() -> String {
    "09:00".into()
}
fn default_study_end() -> String {
    "17:00".into()
}
fn default_workout_time() -> String {
    "17:30".into()
}
fn default_feeding_start() -> String {
    "12:00".into()
}
fn default_feeding_end() -> String {
    "20:00".into()
}
fn default_true() -> bool {
    true
}
fn default_all_days() -> [bool; 7] {
    [true; 7]
}
fn default_workout_days() -> [bool; 7] {
    [true, false, true, false, true, false, false]
}

impl Default for FeedingWindow {
    fn default() -> Self {
        Self {
            start: default_feeding_start(),
            end: default_feeding_end(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wake_time: default_wake_time(),
            bed_time: default_bed_time(),
            dinner_time: default_dinner_time(),
            study_start: default_study_start(),
            study_end: default_study_end(),
            workout_time: default_workout_time(),
            breakfast_mode: BreakfastMode::default(),
            breakfast_days: default_all_days(),
            workout_days: default_workout_days(),
            fasting: FastingSettings::default(),
            optional_items: BTreeMap::new(),
            supplements_enabled: true,
            routines: Vec::new(),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(input)?;
        Ok(settings)
    }

    /// Serialize settings to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()).into())
    }

    /// Load settings from `path`, validating every clock-time field.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings: Settings = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`, or return defaults if the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write settings to `path` as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let save_err = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_err(e.to_string()))?;
        }
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| save_err(e.to_string()))?;
        Ok(())
    }

    /// Check every clock-time field, reporting the first malformed one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in self.clock_fields() {
            parse_clock_time(key, value)?;
        }
        self.fasting.window_times()?;
        for (i, routine) in self.routines.iter().enumerate() {
            parse_clock_time(&format!("routines[{i}].time"), &routine.time)?;
        }
        Ok(())
    }

    fn clock_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("wake_time", self.wake_time.as_str()),
            ("bed_time", self.bed_time.as_str()),
            ("dinner_time", self.dinner_time.as_str()),
            ("study_start", self.study_start.as_str()),
            ("study_end", self.study_end.as_str()),
            ("workout_time", self.workout_time.as_str()),
        ]
    }

    /// Whether breakfast is eaten on `date`.
    pub fn has_breakfast(&self, date: NaiveDate) -> bool {
        match self.breakfast_mode {
            BreakfastMode::Always => true,
            BreakfastMode::Skip => false,
            BreakfastMode::Sometimes => self.breakfast_days[weekday_index(date)],
        }
    }

    /// Whether `date` is a workout day.
    pub fn is_workout_day(&self, date: NaiveDate) -> bool {
        self.workout_days[weekday_index(date)]
    }

    /// Toggle state of an optional item; unknown keys default to enabled.
    pub fn optional_enabled(&self, key: &str) -> bool {
        self.optional_items.get(key).copied().unwrap_or(true)
    }
}

/// Weekday index with Monday = 0.
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn defaults_fill_missing_fields() {
        let settings = Settings::from_toml_str("wake_time = \"06:15\"").unwrap();
        assert_eq!(settings.wake_time, "06:15");
        assert_eq!(settings.dinner_time, "18:30");
        assert_eq!(settings.fasting.mode, FastingMode::Off);
        assert!(settings.supplements_enabled);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn parses_full_document() {
        let input = indoc! {r#"
            wake_time = "7:30 AM"
            bed_time = "23:30"
            breakfast_mode = "sometimes"
            breakfast_days = [true, true, true, true, true, false, false]
            workout_days = [false, true, false, true, false, true, false]

            [fasting]
            mode = "on"
            level = "strict"
            feeding_window = { start = "11:00", end = "19:00" }

            [optional_items]
            magnesium = false

            [[routines]]
            name = "Walk"
            time = "12:45"
        "#};
        let settings = Settings::from_toml_str(input).unwrap();
        assert_eq!(settings.breakfast_mode, BreakfastMode::Sometimes);
        assert!(settings.fasting.is_on());
        assert_eq!(settings.fasting.level, FastingLevel::Strict);
        assert!(!settings.optional_enabled("magnesium"));
        assert!(settings.optional_enabled("unknown"));
        assert_eq!(settings.routines[0].days, [true; 7]);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn weekday_arrays_must_have_seven_entries() {
        let err = Settings::from_toml_str("workout_days = [true, false]");
        assert!(err.is_err());
    }

    #[test]
    fn validate_names_bad_field() {
        let settings = Settings {
            study_end: "5pm".to_string(),
            ..Settings::default()
        };
        match settings.validate().unwrap_err() {
            ConfigError::InvalidTime { key, .. } => assert_eq!(key, "study_end"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn feeding_window_must_be_ordered() {
        let mut settings = Settings::default();
        settings.fasting.feeding_window = FeedingWindow {
            start: "20:00".to_string(),
            end: "12:00".to_string(),
        };
        assert!(matches!(
            settings.validate().unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
    }

    #[test]
    fn breakfast_mode_per_weekday() {
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let mut settings = Settings {
            breakfast_mode: BreakfastMode::Sometimes,
            breakfast_days: [true, true, true, true, true, false, false],
            ..Settings::default()
        };
        assert!(settings.has_breakfast(monday));
        assert!(!settings.has_breakfast(saturday));

        settings.breakfast_mode = BreakfastMode::Skip;
        assert!(!settings.has_breakfast(monday));
        settings.breakfast_mode = BreakfastMode::Always;
        assert!(settings.has_breakfast(saturday));
    }

    #[test]
    fn save_and_load_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let mut settings = Settings::default();
        settings.optional_items.insert("probiotic".to_string(), false);
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn load_reports_path_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "wake_time = [").unwrap();
        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("settings.toml"));
    }
}
